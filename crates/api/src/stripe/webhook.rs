//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header carries `t=<unix seconds>` and one or
//! more `v1=<hex hmac>` entries. The signed message is
//! `{t}.{raw payload}`; verification is constant-time via
//! `Mac::verify_slice` and bounded by [`SIGNATURE_TOLERANCE`] of clock
//! skew to blunt replay.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::StripeError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed payload.
pub const SIGNATURE_TOLERANCE: chrono::Duration = chrono::Duration::seconds(300);

/// A verified webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

/// The `data` envelope of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// A metadata value from the event's object, if present.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.data.object.get("metadata")?.get(key)?.as_str()
    }
}

/// Verify a webhook payload against its `Stripe-Signature` header and
/// parse the event.
///
/// # Errors
///
/// `InvalidSignature` when the header is malformed, the timestamp is
/// outside the tolerance window, or no `v1` entry verifies; `Parse` when
/// the payload is not a well-formed event.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<WebhookEvent, StripeError> {
    let (timestamp, candidates) = parse_header(signature_header)?;

    let skew = now.timestamp() - timestamp;
    if skew.abs() > SIGNATURE_TOLERANCE.num_seconds() {
        return Err(StripeError::InvalidSignature);
    }

    let verified = candidates.iter().any(|candidate| {
        let Ok(decoded) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&decoded).is_ok()
    });

    if !verified {
        return Err(StripeError::InvalidSignature);
    }

    Ok(serde_json::from_slice(payload)?)
}

/// Split the header into the timestamp and the `v1` signature candidates.
fn parse_header(header: &str) -> Result<(i64, Vec<&str>), StripeError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    match (timestamp, candidates.is_empty()) {
        (Some(timestamp), false) => Ok((timestamp, candidates)),
        _ => Err(StripeError::InvalidSignature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "whsec_test_4fd8cc39";

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn event_payload() -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_1",
                    "metadata": { "order_id": "881" }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.timestamp_opt(1_760_000_000, 0).single().expect("timestamp")
    }

    #[test]
    fn valid_signature_verifies_and_parses() {
        let payload = event_payload();
        let ts = now().timestamp();
        let header = format!("t={ts},v1={}", sign(&payload, ts, SECRET));

        let event = verify_signature(&payload, &header, SECRET, now()).expect("verify");
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.metadata("order_id"), Some("881"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = event_payload();
        let ts = now().timestamp();
        let header = format!("t={ts},v1={}", sign(&payload, ts, "whsec_other"));

        let err = verify_signature(&payload, &header, SECRET, now()).expect_err("reject");
        assert!(matches!(err, StripeError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = event_payload();
        let ts = now().timestamp();
        let header = format!("t={ts},v1={}", sign(&payload, ts, SECRET));

        let mut tampered = payload.clone();
        tampered[10] ^= 1;
        let err = verify_signature(&tampered, &header, SECRET, now()).expect_err("reject");
        assert!(matches!(err, StripeError::InvalidSignature));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = event_payload();
        let ts = now().timestamp() - SIGNATURE_TOLERANCE.num_seconds() - 10;
        let header = format!("t={ts},v1={}", sign(&payload, ts, SECRET));

        let err = verify_signature(&payload, &header, SECRET, now()).expect_err("reject");
        assert!(matches!(err, StripeError::InvalidSignature));
    }

    #[test]
    fn second_v1_candidate_is_accepted() {
        // Stripe sends multiple v1 entries during secret rotation
        let payload = event_payload();
        let ts = now().timestamp();
        let header = format!(
            "t={ts},v1={},v1={}",
            sign(&payload, ts, "whsec_retired"),
            sign(&payload, ts, SECRET)
        );

        assert!(verify_signature(&payload, &header, SECRET, now()).is_ok());
    }

    #[test]
    fn malformed_header_is_rejected() {
        let payload = event_payload();
        for header in ["", "t=abc", "v1=deadbeef", "t=,v1="] {
            assert!(verify_signature(&payload, header, SECRET, now()).is_err());
        }
    }
}
