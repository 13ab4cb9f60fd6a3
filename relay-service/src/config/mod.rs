use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Server-held credential. `None` keeps the process up but every relay
    /// request answers 500.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    /// Base URL up to and including the API version segment.
    pub api_base: String,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RelayConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: credential_from(env::var("GEMINI_API_KEY").ok()),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
            },
        })
    }
}

/// Only an empty key counts as missing. Any other value, whitespace
/// included, is forwarded upstream as is.
fn credential_from(value: Option<String>) -> Option<Secret<String>> {
    value.filter(|v| !v.is_empty()).map(Secret::new)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
