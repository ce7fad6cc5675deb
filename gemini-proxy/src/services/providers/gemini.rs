//! Gemini AI provider implementation.
//!
//! Issues one `generateContent` call per prompt and maps upstream failures onto
//! [`ProviderError`] from the HTTP status and the structured error details
//! Google returns.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key. Kept out of the URL so transport errors never
/// echo the credential.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons that mean the candidate was withheld.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }

    /// Build the API URL for the given method on the configured model.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &error_text));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError(format!("Failed to parse response: {}", e.without_url()))
        })?;

        let usage = api_response.usage_metadata.unwrap_or_default();
        let text = extract_text(api_response.prompt_feedback, api_response.candidates)?;

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map a non-2xx Gemini response onto a provider error.
///
/// The message keeps the HTTP status line in front of the upstream message,
/// e.g. `[429 Too Many Requests] Resource has been exhausted`.
fn error_from_status(status: StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    let api_message = parsed
        .as_ref()
        .map(|e| e.message.trim())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim())
        .to_string();
    let message = format!("[{}] {}", status, api_message);

    let reason = parsed
        .as_ref()
        .and_then(|e| e.details.iter().find_map(|d| d.reason.as_deref()));
    let api_status = parsed.as_ref().and_then(|e| e.status.as_deref());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || reason == Some("API_KEY_INVALID")
        || api_message.contains("API key")
    {
        return ProviderError::InvalidCredential(message);
    }

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == Some("RESOURCE_EXHAUSTED") {
        let retry_after_secs = parsed.as_ref().and_then(|e| {
            e.details
                .iter()
                .find_map(|d| d.retry_delay.as_deref())
                .and_then(parse_retry_delay)
        });
        return ProviderError::RateLimited {
            message,
            retry_after_secs,
        };
    }

    ProviderError::ApiError(message)
}

/// Parse a protobuf duration such as `"34s"` or `"1.5s"` into whole seconds,
/// rounding up.
fn parse_retry_delay(delay: &str) -> Option<u64> {
    let secs: f64 = delay.strip_suffix('s')?.parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs.ceil() as u64)
    } else {
        None
    }
}

fn extract_text(
    feedback: Option<PromptFeedback>,
    candidates: Vec<Candidate>,
) -> Result<String, ProviderError> {
    if let Some(reason) = feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::ContentFiltered(format!(
            "Text not available. Prompt was blocked due to {}",
            reason
        )));
    }

    let Some(candidate) = candidates.into_iter().next() else {
        return Err(ProviderError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match candidate.finish_reason.as_deref() {
        Some(reason) if BLOCKED_FINISH_REASONS.contains(&reason) => Err(
            ProviderError::ContentFiltered(format!(
                "Text not available. Response was blocked due to {}",
                reason
            )),
        ),
        _ => Err(ProviderError::EmptyResponse),
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

/// One entry of `error.details`; only `ErrorInfo.reason` and
/// `RetryInfo.retryDelay` are read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    retry_delay: Option<String>,
}
