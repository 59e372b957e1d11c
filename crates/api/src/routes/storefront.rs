//! Storefront mount point
//!
//! Tenant requests arrive here after the router rewrote them to
//! `/store/{tenant}/...`. Page rendering attaches below this prefix.

use axum::{extract::Path, Extension, Json};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    routing::TenantContext,
};

#[derive(Debug, Serialize)]
pub struct StorefrontResponse {
    pub tenant: String,
    /// Path inside the storefront, always starting with `/`
    pub path: String,
    /// Host the tenant was resolved from; absent for direct `/store/...` requests
    pub host: Option<String>,
}

/// `GET /store/*rest`, where `rest` is `{tenant}` or `{tenant}/{page...}`
pub async fn storefront(
    Path(rest): Path<String>,
    context: Option<Extension<TenantContext>>,
) -> ApiResult<Json<StorefrontResponse>> {
    let (tenant, page) = rest.split_once('/').unwrap_or((rest.as_str(), ""));

    // Empty Host headers rewrite to /store//...; there is no such storefront
    if tenant.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(StorefrontResponse {
        tenant: tenant.to_string(),
        path: format!("/{}", page),
        host: context.map(|Extension(ctx)| ctx.host),
    }))
}
