pub mod providers;

pub use providers::{ProviderError, ProviderResponse, TextProvider};
