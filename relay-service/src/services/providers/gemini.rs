//! Gemini AI provider implementation.
//!
//! Calls `models/{model}:generateContent` with the API key as the `key`
//! query parameter and returns the first candidate's first text part.

use super::{Prompt, ProviderError, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;

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
    /// No request timeout is set; a call lasts as long as the upstream takes.
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("relay-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the API URL for the given method. The key is added separately
    /// as a query parameter.
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
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<Option<String>, ProviderError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.user.len(),
            has_system_prompt = request.system_instruction.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.map_err(ProviderError::from_reqwest)?;
            let body = decode_error_body(error_text);

            tracing::warn!(
                model = %self.config.model,
                status = status.as_u16(),
                "Gemini API returned an error"
            );

            return Err(ProviderError::Upstream { status, body });
        }

        let raw = response.text().await.map_err(ProviderError::from_reqwest)?;
        let api_response: Value = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let text = first_text(&api_response);

        tracing::debug!(
            model = %self.config.model,
            has_text = text.is_some(),
            "Received Gemini API response"
        );

        Ok(text)
    }
}

/// Best-effort decode of an upstream error body: JSON when possible, the raw
/// text otherwise.
fn decode_error_body(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        Self {
            contents: vec![Content::text(&prompt.user)],
            system_instruction: prompt
                .system
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Content::text),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Text of the first part of the first candidate. Only that one path is
/// inspected; anything missing or of the wrong type on it yields `None`, and
/// the rest of the body is never looked at.
fn first_text(response: &Value) -> Option<String> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
}
