//! Zynkart API Library
//!
//! HTTP server components for the Zynkart platform: host-based tenant
//! routing, the storefront mount point, and payment webhooks.

pub mod config;
pub mod error;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;

pub use config::{Config, RouteTable};
pub use error::{ApiError, ApiResult};
pub use routes::{build_app, create_router};
pub use routing::{RoutingDecision, TenantContext, TenantRouter};
pub use state::AppState;
