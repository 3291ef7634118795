//! Stripe webhook receiver.
//!
//! Stripe retries until it sees a 2xx, so the handler only rejects
//! requests it could never process: bad signatures and events without an
//! order reference. A settlement that partially fails is still acked;
//! the deterministic transfer idempotency keys make the retry safe.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stripe::verify_signature;

const SIGNATURE_HEADER: &str = "Stripe-Signature";
const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// `POST /webhooks/stripe`
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Validation("missing Stripe-Signature header".to_string()))?;

    let secret = state.config().stripe.webhook_secret.expose_secret();
    let event = verify_signature(&body, signature, secret, chrono::Utc::now())
        .map_err(|_| AppError::Validation("webhook signature verification failed".to_string()))?;

    if event.event_type != PAYMENT_SUCCEEDED {
        info!(event = %event.event_type, "ignoring webhook event");
        return Ok(Json(json!({ "received": true })));
    }

    let order_id: u64 = event
        .metadata("order_id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| {
            AppError::Validation("payment intent carries no order_id metadata".to_string())
        })?;

    match state.settlement().settle(order_id).await {
        Ok(report) => {
            info!(
                order_id,
                transfers = report.transfers.len(),
                failures = report.failures.len(),
                "settlement finished"
            );
        }
        // Ack anyway: Stripe's retry reruns the whole settlement and the
        // idempotency keys dedupe any transfer that already went out.
        Err(err) => {
            warn!(order_id, error = %err, "settlement failed");
        }
    }

    Ok(Json(json!({ "received": true })))
}
