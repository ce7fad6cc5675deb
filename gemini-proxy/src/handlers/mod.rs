//! HTTP handlers for the Gemini proxy.

pub mod generate;
pub mod health;
pub mod index;

pub use generate::generate;
pub use health::health_check;
pub use index::index;
