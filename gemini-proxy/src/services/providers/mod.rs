//! Upstream text-generation providers.
//!
//! The handler only talks to [`TextProvider`]; the Gemini client and the
//! scripted mock are interchangeable behind it.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// `Display` renders the raw upstream message so it can be relayed for
/// diagnostics without re-wrapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The upstream rejected or did not receive a usable API key.
    #[error("{0}")]
    InvalidCredential(String),

    /// Quota or rate limit exhausted.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    NetworkError(String),

    /// The prompt or the candidate was blocked by a safety filter.
    #[error("{0}")]
    ContentFiltered(String),

    #[error("Response contained no text")]
    EmptyResponse,
}

/// Result of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a text response for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;

    /// Model identifier requests are issued against.
    fn model(&self) -> &str;
}
