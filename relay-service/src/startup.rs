//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::handlers::{
    health::health_check,
    metrics::metrics_endpoint,
    relay::{method_not_allowed, preflight, relay},
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors_headers_middleware, metrics_middleware, request_id_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// `provider` is `None` when no API key was configured; the relay then
/// answers every `POST` with 500 while the rest of the service stays up.
#[derive(Clone)]
pub struct AppState {
    pub provider: Option<Arc<dyn TextProvider>>,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self { provider }
    }

    /// Build the Gemini provider from configuration. The key is read here,
    /// once, and never again per request.
    pub fn from_config(config: &RelayConfig) -> Result<Self, AppError> {
        let Some(api_key) = config.gemini.api_key.clone() else {
            tracing::warn!("GEMINI_API_KEY is not set; relay requests will fail with 500");
            return Ok(Self::new(None));
        };

        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key,
            model: config.gemini.model.clone(),
            api_base: config.gemini.api_base.clone(),
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            model = %provider.model(),
            "Initialized Gemini text provider"
        );

        Ok(Self::new(Some(Arc::new(provider))))
    }
}

pub fn build_router(state: AppState) -> Router {
    let relay_routes = post(relay)
        .options(preflight)
        .fallback(method_not_allowed);

    Router::new()
        .route("/", relay_routes.clone())
        .route("/api/generate", relay_routes)
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(from_fn(cors_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config)?;
        Self::build_with_state(&config, state).await
    }

    /// Bind the listener for an already assembled state (port 0 = random
    /// port for testing).
    pub async fn build_with_state(config: &RelayConfig, state: AppState) -> Result<Self, AppError> {
        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let local_addr: SocketAddr = listener.local_addr()?;

        tracing::info!("Relay service listening on {}", local_addr);

        Ok(Self {
            port: local_addr.port(),
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}
