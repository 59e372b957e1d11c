//! Security Headers Middleware
//!
//! Every response gets the baseline browser hardening headers. API responses
//! additionally get a deny-all CSP and are never cached; storefront and
//! merchant pages keep their own CSP and caching.

use axum::{
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::Next,
};

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'";

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    // Classified by the client-visible path, before any tenant rewrite
    let is_api = request.uri().path().starts_with("/api");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // Storefronts may embed their own pages, never third-party frames
    headers.insert("X-Frame-Options", HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );

    if is_api {
        headers.insert("Content-Security-Policy", HeaderValue::from_static(API_CSP));
        if !headers.contains_key("Cache-Control") {
            headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(test_handler))
            .route("/api/health", get(test_handler))
            .layer(axum::middleware::from_fn(security_headers_middleware))
    }

    #[tokio::test]
    async fn test_baseline_headers_on_pages() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("X-Frame-Options").unwrap(),
            "SAMEORIGIN"
        );
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        assert!(response.headers().get("Strict-Transport-Security").is_some());
        assert!(response.headers().get("Content-Security-Policy").is_none());
        assert!(response.headers().get("Cache-Control").is_none());
    }

    #[tokio::test]
    async fn test_api_responses_are_locked_down() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("Content-Security-Policy").unwrap(),
            API_CSP
        );
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    }
}
