use crate::error::GenerateError;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::startup::AppState;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use service_core::error::AppError;
use std::sync::Arc;

/// Request body accepted as JSON or as a urlencoded form.
///
/// An empty body, or one sent with any other content type, decodes to an
/// empty request so it is answered as a missing prompt rather than a decoding
/// failure.
pub struct PromptPayload(pub GenerateRequest);

/// How a body is decoded, chosen from the media type essence of
/// `Content-Type`. Parameters such as `charset` are ignored and matching is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
    Ignored,
}

impl BodyFormat {
    fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(essence) = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
        else {
            return BodyFormat::Ignored;
        };

        match essence.as_str() {
            "application/x-www-form-urlencoded" => BodyFormat::Form,
            "application/json" => BodyFormat::Json,
            m if m.starts_with("application/") && m.ends_with("+json") => BodyFormat::Json,
            _ => BodyFormat::Ignored,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for PromptPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let format = BodyFormat::from_content_type(
            req.headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        if format == BodyFormat::Ignored {
            tracing::debug!("Ignoring request body without a JSON or form content type");
            return Ok(Self(GenerateRequest::default()));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!(error = %e, status = %e.status(), "Failed to read request body");
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(anyhow::anyhow!(e.body_text()))
            } else {
                AppError::BadRequest(anyhow::anyhow!(e.body_text()))
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(GenerateRequest::default()));
        }

        let decoded = match format {
            BodyFormat::Form => serde_urlencoded::from_bytes::<GenerateRequest>(&bytes)
                .map(Some)
                .map_err(anyhow::Error::from),
            // A literal `null` body is treated like `{}`.
            _ => serde_json::from_slice::<Option<GenerateRequest>>(&bytes)
                .map_err(anyhow::Error::from),
        };

        match decoded {
            Ok(request) => Ok(Self(request.unwrap_or_default())),
            Err(e) => {
                tracing::warn!(error = %e, format = ?format, "Failed to decode request body");
                Err(AppError::BadRequest(e))
            }
        }
    }
}

/// `POST /api/generate`: forward the prompt upstream and relay the text.
pub async fn generate(
    State(state): State<AppState>,
    PromptPayload(request): PromptPayload,
) -> Result<Json<GenerateResponse>, GenerateError> {
    let Some(prompt) = request.prompt().map(str::to_string) else {
        tracing::warn!("Rejected generate request without a prompt");
        return Err(GenerateError::MissingPrompt);
    };

    // Spawned so the upstream call runs to completion even if the caller
    // disconnects and this handler future is dropped.
    let provider = Arc::clone(&state.text_provider);
    let upstream_prompt = prompt.clone();
    let outcome = tokio::spawn(async move { provider.generate(&upstream_prompt).await }).await;

    let result = match outcome {
        Ok(result) => result.map_err(GenerateError::from),
        Err(e) => Err(GenerateError::Upstream(e.to_string())),
    };

    match result {
        Ok(response) => {
            tracing::info!(
                model = %state.text_provider.model(),
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                "Generated response"
            );
            Ok(Json(GenerateResponse {
                prompt,
                response: response.text,
            }))
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                status = %e.status(),
                model = %state.text_provider.model(),
                "Error processing request"
            );
            Err(e)
        }
    }
}
