use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Stamp the permissive cross-origin headers on every response, error
/// responses and preflight answers included.
///
/// `tower_http::cors::CorsLayer` only decorates requests that carry an
/// `Origin` header and answers preflights itself, so the headers are set
/// unconditionally here instead.
pub async fn cors_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header::HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static(ALLOWED_HEADERS),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        routing::get,
    };
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn headers_are_added_to_success_and_not_found() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(cors_headers_middleware));

        for uri in ["/", "/missing"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            let headers = response.headers();
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");

            if uri == "/missing" {
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
        }
    }
}
