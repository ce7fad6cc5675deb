use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Self::load_with_port(std::env::var("PORT").ok())
    }

    /// Build from the `configuration` file and `APP__*` variables, with `port`
    /// (the bare `PORT` variable hosting platforms set) taking precedence when
    /// it is non-empty.
    fn load_with_port(port: Option<String>) -> Result<Self, AppError> {
        let port = port.filter(|p| !p.trim().is_empty());

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", port)?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_when_unset() {
        let config: Config = Cfg::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_port_override_is_parsed() {
        let config = Config::load_with_port(Some("8123".to_string())).unwrap();
        assert_eq!(config.port, 8123);
    }

    #[test]
    fn test_empty_port_override_is_ignored() {
        let without = Config::load_with_port(None).unwrap();
        let empty = Config::load_with_port(Some(String::new())).unwrap();
        let blank = Config::load_with_port(Some("  ".to_string())).unwrap();
        assert_eq!(empty.port, without.port);
        assert_eq!(blank.port, without.port);
    }

    #[test]
    fn test_invalid_port_override_is_config_error() {
        let result = Config::load_with_port(Some("not-a-port".to_string()));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
