//! Outcome classification for the generation endpoint.

use crate::models::ErrorBody;
use crate::services::ProviderError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Message marker meaning the upstream rejected the credential.
const CREDENTIAL_MARKER: &str = "API key";

/// Message markers meaning quota or rate limit exhaustion.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];

pub const MISSING_PROMPT_ERROR: &str = "Missing prompt parameter";
pub const MISSING_PROMPT_USAGE: &str = "Send a POST request with a \"prompt\" field in the body";
pub const CREDENTIAL_ERROR: &str =
    "API key configuration error. Make sure GEMINI_API_KEY is set properly.";
pub const RATE_LIMIT_ERROR: &str = "Rate limit exceeded. Please try again later.";
pub const GENERIC_ERROR: &str = "Failed to process request";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Missing prompt parameter")]
    MissingPrompt,

    /// The raw upstream message is kept for logging only.
    #[error("Credential rejected: {0}")]
    Credential(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<ProviderError> for GenerateError {
    /// Structured variants decide first; otherwise the message is checked
    /// against the credential marker, then the rate-limit markers.
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();

        if matches!(err, ProviderError::InvalidCredential(_)) || message.contains(CREDENTIAL_MARKER)
        {
            return GenerateError::Credential(message);
        }

        if let ProviderError::RateLimited {
            retry_after_secs, ..
        } = err
        {
            return GenerateError::RateLimited {
                message,
                retry_after_secs,
            };
        }

        if RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m)) {
            return GenerateError::RateLimited {
                message,
                retry_after_secs: None,
            };
        }

        GenerateError::Upstream(message)
    }
}

impl GenerateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerateError::MissingPrompt => StatusCode::BAD_REQUEST,
            GenerateError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GenerateError::Credential(_) | GenerateError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (body, retry_after) = match self {
            GenerateError::MissingPrompt => (
                ErrorBody {
                    error: MISSING_PROMPT_ERROR.to_string(),
                    usage: Some(MISSING_PROMPT_USAGE.to_string()),
                    ..Default::default()
                },
                None,
            ),
            GenerateError::Credential(_) => (
                ErrorBody {
                    error: CREDENTIAL_ERROR.to_string(),
                    ..Default::default()
                },
                None,
            ),
            GenerateError::RateLimited {
                message,
                retry_after_secs,
            } => (
                ErrorBody {
                    error: RATE_LIMIT_ERROR.to_string(),
                    details: Some(message),
                    ..Default::default()
                },
                retry_after_secs,
            ),
            GenerateError::Upstream(message) => (
                ErrorBody {
                    error: GENERIC_ERROR.to_string(),
                    message: Some(message),
                    ..Default::default()
                },
                None,
            ),
        };

        let mut res = (status, Json(body)).into_response();

        if let Some(retry) = retry_after {
            res.headers_mut().insert(header::RETRY_AFTER, retry.into());
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_marker_wins_over_rate_limit() {
        let err = GenerateError::from(ProviderError::ApiError(
            "[429 Too Many Requests] API key quota exceeded".to_string(),
        ));
        assert!(matches!(err, GenerateError::Credential(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_structured_credential_error() {
        let err = GenerateError::from(ProviderError::InvalidCredential(
            "[403 Forbidden] Permission denied".to_string(),
        ));
        assert!(matches!(err, GenerateError::Credential(_)));
    }

    #[test]
    fn test_rate_limit_substring_fallback() {
        let err = GenerateError::from(ProviderError::NetworkError(
            "429 Too Many Requests".to_string(),
        ));
        match err {
            GenerateError::RateLimited {
                message,
                retry_after_secs,
            } => {
                assert_eq!(message, "429 Too Many Requests");
                assert_eq!(retry_after_secs, None);
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_structured_rate_limit_keeps_retry_delay() {
        let err = GenerateError::from(ProviderError::RateLimited {
            message: "quota".to_string(),
            retry_after_secs: Some(12),
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get(header::RETRY_AFTER).unwrap(), "12");
    }

    #[test]
    fn test_everything_else_is_generic() {
        let err = GenerateError::from(ProviderError::EmptyResponse);
        match err {
            GenerateError::Upstream(message) => {
                assert_eq!(message, "Response contained no text")
            }
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }
}
