use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`, decoded from JSON or a urlencoded form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    /// The prompt, if present and non-empty.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub prompt: String,
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_empty_prompts_are_missing() {
        for body in [r#"{}"#, r#"{"prompt":null}"#, r#"{"prompt":""}"#] {
            let req: GenerateRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.prompt(), None, "body: {}", body);
        }
    }

    #[test]
    fn test_whitespace_prompt_is_kept() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt":"  "}"#).unwrap();
        assert_eq!(req.prompt(), Some("  "));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"hi","temperature":0.3}"#).unwrap();
        assert_eq!(req.prompt(), Some("hi"));
    }

    #[test]
    fn test_error_body_omits_absent_fields() {
        let body = ErrorBody {
            error: "Failed to process request".to_string(),
            message: Some("boom".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"error": "Failed to process request", "message": "boom"})
        );
    }
}
