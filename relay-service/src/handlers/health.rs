use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. The process is healthy even without an API key, so the
/// key's presence is reported rather than failing the check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "relay-service",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream_configured": state.provider.is_some()
    }))
}
