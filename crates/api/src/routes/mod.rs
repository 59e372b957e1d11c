//! HTTP routes

pub mod health;
pub mod storefront;
pub mod webhook;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::ApiError, routing::tenant_routing_middleware, security::security_headers_middleware,
    state::AppState,
};

/// Create the application routes, addressed by their post-rewrite paths
pub fn create_router(state: AppState) -> Router {
    // Health check routes (API prefix so tenant hosts can be probed too)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    // Gateway webhooks (public, signature verified in handler)
    let webhook_routes = Router::new()
        .route("/webhook/paystack", post(webhook::paystack))
        .layer(DefaultBodyLimit::max(1024 * 1024));

    Router::new()
        .nest("/api", health_routes.merge(webhook_routes))
        // Storefront tree; tenant hosts are rewritten into it
        .route("/store/*rest", get(storefront::storefront))
        .fallback(not_found)
        .with_state(state)
}

/// Build the full application: tenant routing in front of the route table.
///
/// Tenant routing wraps the inner router as a fallback service, so the
/// rewritten URI is what route matching sees.
pub fn build_app(state: AppState) -> Router {
    let tenant_router = state.tenant_router.clone();

    Router::new()
        .fallback_service(create_router(state))
        .layer(middleware::from_fn_with_state(
            tenant_router,
            tenant_routing_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
