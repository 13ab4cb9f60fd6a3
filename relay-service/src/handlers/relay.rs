use crate::dtos::relay::INVALID_REQUEST_BODY;
use crate::dtos::{RelayRequest, RelayResponse};
use crate::services::record_upstream_request;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

pub const API_KEY_NOT_CONFIGURED: &str = "API key not configured on server";

/// `POST` relay: check the key, validate the body, make one upstream call.
///
/// The body is taken raw so that a missing key is reported before any
/// payload problem.
pub async fn relay(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    let provider = state
        .provider
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured(API_KEY_NOT_CONFIGURED.to_string()))?;

    let body = body.map_err(reject_body)?;

    let prompt = RelayRequest::from_body(&body)?.into_prompt()?;

    tracing::info!(
        provider = provider.name(),
        prompt_len = prompt.user.len(),
        has_system_prompt = prompt.system.is_some(),
        "Relaying prompt upstream"
    );

    match provider.generate(&prompt).await {
        Ok(result) => {
            record_upstream_request(provider.name(), "success");
            Ok(Json(RelayResponse { result }))
        }
        Err(e) => {
            record_upstream_request(provider.name(), e.kind());
            Err(e.into())
        }
    }
}

/// Bodies over axum's default limit (2 MB) get `413`; any other read
/// failure is an invalid body.
fn reject_body(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::BadRequest(
            INVALID_REQUEST_BODY.to_string(),
            Some(Value::String(rejection.body_text())),
        )
    }
}

/// Cross-origin preflight: empty `200`; the CORS headers come from the
/// middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
