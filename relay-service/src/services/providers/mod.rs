//! Upstream text generation providers.
//!
//! The relay handler only sees the [`TextProvider`] trait, so the Gemini
//! client can be swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use service_core::error::AppError;
use std::error::Error as StdError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The upstream answered with a non-success status. `body` is the decoded
    /// JSON error body, or the raw text when it was not JSON.
    #[error("Upstream API returned {status}")]
    Upstream { status: StatusCode, body: Value },

    #[error("{0}")]
    Network(String),

    #[error("Failed to parse upstream response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Upstream { .. } => "upstream_error",
            ProviderError::Network(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Build a network error without the request URL, which carries the
    /// API key in its query string.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ProviderError::Network(error_chain(&err.without_url()))
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream { status, body } => AppError::Upstream {
                status,
                detail: body,
            },
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

/// Join an error and its sources into one line.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Validated prompt pair handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Issue exactly one generation call. `Ok(None)` means the upstream
    /// succeeded but returned no text.
    async fn generate(&self, prompt: &Prompt) -> Result<Option<String>, ProviderError>;
}
