//! services/verifier/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::session::MalformedDetectionPolicy;
use tracing::Level;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which wire protocol the model gateway speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// Gemini's native `generateContent` REST API.
    Gemini,
    /// Any OpenAI-compatible chat completions endpoint.
    OpenAiCompat,
}

impl ModelProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(ModelProvider::Gemini),
            "openai-compat" | "openai_compat" | "openai" => Some(ModelProvider::OpenAiCompat),
            _ => None,
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub provider: ModelProvider,
    /// Overrides the provider's default base URL when set.
    pub api_base: Option<String>,
    pub text_model: String,
    pub vision_model: String,
    pub log_level: Level,
    pub malformed_detection: MalformedDetectionPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Credentials ---
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        // --- Gateway Settings ---
        let provider_str = var_or("MODEL_PROVIDER", "gemini");
        let provider = ModelProvider::parse(&provider_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "MODEL_PROVIDER".to_string(),
                format!("'{}' is not one of gemini, openai-compat", provider_str),
            )
        })?;
        let api_base = lookup("MODEL_API_BASE").filter(|base| !base.trim().is_empty());
        let text_model = var_or("TEXT_MODEL", DEFAULT_TEXT_MODEL);
        let vision_model = var_or("VISION_MODEL", DEFAULT_VISION_MODEL);

        // --- Logging ---
        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Session Behaviour ---
        let surface_str = var_or("SURFACE_MALFORMED_DETECTION", "true");
        let malformed_detection = match surface_str.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => MalformedDetectionPolicy::Surface,
            "false" | "0" | "no" => MalformedDetectionPolicy::Silent,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "SURFACE_MALFORMED_DETECTION".to_string(),
                    format!("'{}' is not a boolean", surface_str),
                ))
            }
        };

        Ok(Self {
            api_key,
            provider,
            api_base,
            text_model,
            vision_model,
            log_level,
            malformed_detection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.provider, ModelProvider::Gemini);
        assert_eq!(config.api_base, None);
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.vision_model, DEFAULT_VISION_MODEL);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.malformed_detection, MalformedDetectionPolicy::Surface);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "GEMINI_API_KEY"));

        let blank = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(blank, ConfigError::MissingVar(_)));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("MODEL_PROVIDER", "openai-compat"),
            ("MODEL_API_BASE", "http://localhost:8080/v1"),
            ("TEXT_MODEL", "small-text"),
            ("VISION_MODEL", "small-vision"),
            ("RUST_LOG", "debug"),
            ("SURFACE_MALFORMED_DETECTION", "false"),
        ]))
        .unwrap();

        assert_eq!(config.provider, ModelProvider::OpenAiCompat);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.text_model, "small-text");
        assert_eq!(config.vision_model, "small-vision");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.malformed_detection, MalformedDetectionPolicy::Silent);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("MODEL_PROVIDER", "carrier-pigeon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "MODEL_PROVIDER"));

        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("SURFACE_MALFORMED_DETECTION", "sometimes"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue(var, _) if var == "SURFACE_MALFORMED_DETECTION")
        );
    }
}
