use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String, Option<Value>),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Non-success answer from an upstream API, relayed with its own status.
    #[error("Upstream error: {status}")]
    Upstream { status: StatusCode, detail: Value },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(..) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream { status, .. } => *status,
            AppError::NotConfigured(_) | AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body sent to the caller. Every variant carries an `error` field.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (error, detail) = match self {
            AppError::BadRequest(msg, detail) => (msg.clone(), detail.clone()),
            AppError::MethodNotAllowed => ("method not allowed".to_string(), None),
            AppError::PayloadTooLarge(msg) => (
                "request body too large".to_string(),
                Some(Value::String(msg.clone())),
            ),
            AppError::NotConfigured(msg) => (msg.clone(), None),
            AppError::Upstream { detail, .. } => {
                ("upstream API error".to_string(), Some(detail.clone()))
            }
            AppError::InternalError(err) => (
                "server error occurred".to_string(),
                Some(Value::String(err.to_string())),
            ),
            AppError::ConfigError(err) => (
                "configuration error".to_string(),
                Some(Value::String(err.to_string())),
            ),
        };

        ErrorResponse { error, detail }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upstream_error_keeps_status_and_detail() {
        let err = AppError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            detail: json!({ "error": "rate limited" }),
        };

        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = serde_json::to_value(err.to_error_response()).unwrap();
        assert_eq!(
            body,
            json!({ "error": "upstream API error", "detail": { "error": "rate limited" } })
        );
    }

    #[test]
    fn internal_error_uses_message_as_detail() {
        let err = AppError::InternalError(anyhow::anyhow!("connection refused"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::to_value(err.to_error_response()).unwrap();
        assert_eq!(body["error"], "server error occurred");
        assert_eq!(body["detail"], "connection refused");
    }

    #[test]
    fn method_not_allowed_has_no_detail() {
        let body = serde_json::to_value(AppError::MethodNotAllowed.to_error_response()).unwrap();
        assert_eq!(body, json!({ "error": "method not allowed" }));
    }

    #[test]
    fn payload_too_large_maps_to_413() {
        let err = AppError::PayloadTooLarge("length limit exceeded".to_string());

        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = serde_json::to_value(err.to_error_response()).unwrap();
        assert_eq!(
            body,
            json!({ "error": "request body too large", "detail": "length limit exceeded" })
        );
    }
}
