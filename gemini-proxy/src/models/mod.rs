pub mod generate;

pub use generate::{ErrorBody, GenerateRequest, GenerateResponse};
