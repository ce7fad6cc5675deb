use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_MODEL: &str = "gemini-1.5-pro";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub common: core_config::Config,
    pub mode: RunMode,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    /// Model for text generation (e.g., gemini-1.5-pro)
    pub model: String,
    pub api_base: String,
}

/// Process mode, read from `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Local,
    Production,
}

impl RunMode {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("prod") || v.eq_ignore_ascii_case("production") => {
                RunMode::Production
            }
            _ => RunMode::Local,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

impl ProxyConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let mode = RunMode::from_env_value(env::var("ENVIRONMENT").ok().as_deref());

        Ok(ProxyConfig {
            common: common_config,
            mode,
            gemini: GeminiSettings {
                api_key: resolve_api_key(env::var("GEMINI_API_KEY").ok(), mode)?,
                model: get_env_or("GEMINI_MODEL", DEFAULT_MODEL),
                api_base: get_env_or("GEMINI_API_BASE", GEMINI_API_BASE),
            },
        })
    }
}

/// A missing key halts startup in production; locally it is only logged and
/// every upstream call will then fail with a credential error.
pub fn resolve_api_key(value: Option<String>, mode: RunMode) -> Result<Secret<String>, AppError> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(key) => Ok(Secret::new(key)),
        None if mode.is_production() => Err(AppError::ConfigError(anyhow::anyhow!(
            "GEMINI_API_KEY is required in production but not set"
        ))),
        None => {
            tracing::warn!("GEMINI_API_KEY is not set; generation requests will fail");
            Ok(Secret::new(String::new()))
        }
    }
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!(RunMode::from_env_value(Some("prod")), RunMode::Production);
        assert_eq!(
            RunMode::from_env_value(Some("Production")),
            RunMode::Production
        );
        assert_eq!(RunMode::from_env_value(Some("dev")), RunMode::Local);
        assert_eq!(RunMode::from_env_value(None), RunMode::Local);
    }

    #[test]
    fn test_missing_key_is_fatal_in_production() {
        let result = resolve_api_key(None, RunMode::Production);
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        let result = resolve_api_key(Some("  ".to_string()), RunMode::Production);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_missing_key_is_tolerated_locally() {
        let key = resolve_api_key(None, RunMode::Local).unwrap();
        assert!(key.expose_secret().is_empty());
    }

    #[test]
    fn test_present_key_is_kept() {
        let key = resolve_api_key(Some("abc".to_string()), RunMode::Production).unwrap();
        assert_eq!(key.expose_secret(), "abc");
    }
}
