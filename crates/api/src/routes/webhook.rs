//! Payment gateway webhooks

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};
use zynkart_payments::SIGNATURE_HEADER;

use crate::{error::ApiResult, state::AppState};

/// Paystack notification endpoint.
///
/// Verified notifications answer 200 even when ignored or unmatched so the
/// gateway stops redelivering them.
pub async fn paystack(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    tracing::info!(body_len = body.len(), "Paystack webhook received");

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = state
        .paystack
        .process(state.orders.as_ref(), &body, signature)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Paystack webhook rejected"))?;

    tracing::info!(?outcome, "Paystack webhook processed");

    Ok(StatusCode::OK)
}
