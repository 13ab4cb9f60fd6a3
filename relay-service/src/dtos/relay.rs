use crate::services::providers::Prompt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

pub const NO_REQUEST_CONTENT: &str = "no request content";
pub const INVALID_REQUEST_BODY: &str = "invalid request body";

/// Inbound relay body. Unknown fields are ignored; `null` reads as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

impl RelayRequest {
    /// Parse a raw body. An empty body is read as `{}` so it fails on the
    /// missing prompt rather than on JSON syntax.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|e| {
            AppError::BadRequest(
                INVALID_REQUEST_BODY.to_string(),
                Some(Value::String(e.to_string())),
            )
        })
    }

    pub fn into_prompt(self) -> Result<Prompt, AppError> {
        match self.user_prompt {
            Some(user) if !user.is_empty() => Ok(Prompt {
                system: self.system_prompt,
                user,
            }),
            _ => Err(AppError::BadRequest(NO_REQUEST_CONTENT.to_string(), None)),
        }
    }
}

/// Successful relay answer. `result` is omitted when the upstream returned
/// no text.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}
