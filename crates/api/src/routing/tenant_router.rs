//! Host-to-Tenant Routing Decision
//!
//! Decides, for every inbound request, whether it belongs to a storefront
//! (tenant subdomain) or to the platform's main domain:
//! - API paths: always forwarded untouched
//! - Tenant hosts: acme.zynkart.store/cart -> internal rewrite to /store/acme/cart
//! - Main domain: auth pages, public pages and protected pages gated on session presence
//!
//! Everything here is a pure function of the host, the path and the cookie header.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use axum::http::{header, request::Parts, HeaderMap, Request};

use crate::config::RouteTable;

const API_PREFIX: &str = "/api";
const STORE_PREFIX: &str = "/store";

/// Route class of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// `/api*`, handled by API routes which authorize internally
    Api,
    /// `/store*` on the main domain
    Store,
    /// Sign-in, sign-up and similar pages
    Auth,
    /// Pages open to everyone
    Public,
    /// Everything else on the main domain
    Protected,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Api => "api",
            RouteClass::Store => "store",
            RouteClass::Auth => "auth",
            RouteClass::Public => "public",
            RouteClass::Protected => "protected",
        }
    }
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the router wants done with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Forward the request unchanged
    PassThrough,
    /// Dispatch internally to `path`; the client-visible URL does not change
    Rewrite { tenant: String, path: String },
    /// Send the client a redirect to `location`
    Redirect { location: String },
}

/// The request metadata a routing decision depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFacts<'a> {
    /// `Host` header value; empty when missing or not valid UTF-8
    pub host: &'a str,
    pub path: &'a str,
    /// A session cookie exists. Its validity is checked downstream.
    pub session_present: bool,
}

impl<'a> RequestFacts<'a> {
    pub fn new(host: &'a str, path: &'a str, session_present: bool) -> Self {
        Self {
            host,
            path,
            session_present,
        }
    }

    pub fn from_parts(parts: &'a Parts, table: &RouteTable) -> Self {
        Self::from_components(&parts.headers, parts.uri.path(), table)
    }

    pub fn from_request<B>(request: &'a Request<B>, table: &RouteTable) -> Self {
        Self::from_components(request.headers(), request.uri().path(), table)
    }

    fn from_components(headers: &'a HeaderMap, path: &'a str, table: &RouteTable) -> Self {
        Self {
            host: host_header(headers),
            path,
            session_present: has_session_cookie(headers, &table.session_cookie_names),
        }
    }
}

/// Tenant router built from immutable route configuration
#[derive(Debug, Clone)]
pub struct TenantRouter {
    table: RouteTable,
}

impl TenantRouter {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Classify a path against the static route lists.
    ///
    /// Only `Api` is meaningful for tenant hosts; the other classes apply to the main domain.
    pub fn classify(&self, path: &str) -> RouteClass {
        if path.starts_with(API_PREFIX) {
            RouteClass::Api
        } else if path.starts_with(STORE_PREFIX) {
            RouteClass::Store
        } else if self.table.auth_routes.contains(path) {
            RouteClass::Auth
        } else if self.table.public_routes.contains(path) {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }

    /// Decide the outcome for one request. First matching rule wins.
    pub fn decide(&self, facts: &RequestFacts<'_>) -> RoutingDecision {
        if facts.path.starts_with(API_PREFIX) {
            return RoutingDecision::PassThrough;
        }

        // Tenant storefronts get no main-domain auth gate
        if !is_main_domain(facts.host, &self.table.main_domains) {
            let tenant = tenant_label(facts.host);
            return RoutingDecision::Rewrite {
                tenant: tenant.to_string(),
                path: format!("{}/{}{}", STORE_PREFIX, tenant, facts.path),
            };
        }

        match self.classify(facts.path) {
            RouteClass::Api | RouteClass::Store | RouteClass::Public => RoutingDecision::PassThrough,
            RouteClass::Auth if facts.session_present => RoutingDecision::Redirect {
                location: self.table.default_login_redirect.clone(),
            },
            RouteClass::Auth => RoutingDecision::PassThrough,
            RouteClass::Protected if facts.session_present => RoutingDecision::PassThrough,
            RouteClass::Protected => RoutingDecision::Redirect {
                location: self.table.sign_in_path.clone(),
            },
        }
    }

    /// [`decide`](Self::decide), resolving any internal fault to pass-through
    pub fn decide_fail_open(&self, facts: &RequestFacts<'_>) -> RoutingDecision {
        fail_open(facts, || self.decide(facts))
    }
}

/// Run `decide`, turning a panic into [`RoutingDecision::PassThrough`].
///
/// The router sits in front of every request, so a fault must not block traffic.
pub fn fail_open<F>(facts: &RequestFacts<'_>, decide: F) -> RoutingDecision
where
    F: FnOnce() -> RoutingDecision,
{
    match catch_unwind(AssertUnwindSafe(decide)) {
        Ok(decision) => decision,
        Err(_) => {
            tracing::error!(
                host = facts.host,
                path = facts.path,
                "Tenant routing faulted, passing request through"
            );
            RoutingDecision::PassThrough
        }
    }
}

/// Exact membership in the main-domain allow-list
pub fn is_main_domain(host: &str, main_domains: &HashSet<String>) -> bool {
    main_domains.contains(host)
}

/// First dot-separated label of `host`, or the whole host when it has no dot
pub fn tenant_label(host: &str) -> &str {
    host.split_once('.').map_or(host, |(label, _)| label)
}

/// `Host` header as a string, empty when missing or unreadable
pub fn host_header(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
}

/// True if any `Cookie` header carries one of `names` with a non-empty value
pub fn has_session_cookie(headers: &HeaderMap, names: &[String]) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| !value.trim().is_empty() && names.iter().any(|n| n == name.trim()))
}
