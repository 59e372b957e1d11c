//! Tenant routing middleware
//!
//! Applies a [`RoutingDecision`] to the live request. Must wrap the whole
//! application router so a rewritten URI is what route matching sees.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{uri::PathAndQuery, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::tenant_router::{host_header, RequestFacts, RoutingDecision, TenantRouter};

/// Tenant resolved for a rewritten request, available to handlers as an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant: String,
    /// Host header the tenant was derived from
    pub host: String,
    /// Path the client requested, before the rewrite
    pub original_path: String,
}

pub async fn tenant_routing_middleware(
    State(router): State<Arc<TenantRouter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = {
        let facts = RequestFacts::from_request(&request, router.table());
        let decision = router.decide_fail_open(&facts);
        tracing::debug!(
            host = facts.host,
            path = facts.path,
            session = facts.session_present,
            ?decision,
            "Tenant routing decision"
        );
        decision
    };

    match decision {
        RoutingDecision::PassThrough => next.run(request).await,
        RoutingDecision::Rewrite { tenant, path } => {
            match rewrite_uri(request.uri(), &path) {
                Some(uri) => {
                    let context = TenantContext {
                        tenant,
                        host: host_header(request.headers()).to_string(),
                        original_path: request.uri().path().to_string(),
                    };
                    *request.uri_mut() = uri;
                    request.extensions_mut().insert(context);
                }
                None => {
                    // Host produced a path the URI grammar rejects; fail open
                    tracing::warn!(
                        tenant = %tenant,
                        rewritten = %path,
                        "Could not build rewritten URI, passing request through"
                    );
                }
            }
            next.run(request).await
        }
        RoutingDecision::Redirect { location } => Redirect::temporary(&location).into_response(),
    }
}

/// Replace the path of `uri`, keeping its query string
pub fn rewrite_uri(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
