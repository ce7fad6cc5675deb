//! Mock provider implementation for testing.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock text provider with a scripted outcome and a call counter.
pub struct MockTextProvider {
    outcome: Result<String, ProviderError>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    /// Succeed every call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let text = self.outcome.clone()?;
        Ok(ProviderResponse {
            text,
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
        })
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
