use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings shared by every service: listener, log level and trace export.
///
/// Read from an optional `configuration` file, then `APP__*` environment
/// variables (e.g. `APP__PORT=9000`, `APP__LOG_LEVEL=debug`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Trace export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut loaded: Config = config.try_deserialize()?;

        // The conventional unprefixed variable wins over the config file.
        if let Ok(endpoint) = std::env::var("OTLP_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                loaded.otlp_endpoint = Some(endpoint);
            }
        }

        Ok(loaded)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
