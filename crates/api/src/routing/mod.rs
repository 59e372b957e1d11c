//! Host-based tenant routing
//!
//! Every inbound request is classified by its Host header:
//! - Tenant subdomains: acme.zynkart.store/cart is served from /store/acme/cart
//! - Main domains: zynkart.store, www.zynkart.store, localhost:3000 serve the
//!   merchant surface, gated on session presence
//! - API paths are never rewritten or redirected

mod middleware;
mod tenant_router;

pub use middleware::{rewrite_uri, tenant_routing_middleware, TenantContext};
pub use tenant_router::{
    fail_open, has_session_cookie, host_header, is_main_domain, tenant_label, RequestFacts,
    RouteClass, RoutingDecision, TenantRouter,
};
