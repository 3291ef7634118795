//! Stripe payments gateway.
//!
//! Payment intents fund orders; transfers fan revenue out to connected
//! author accounts. Webhook payloads are authenticated with the
//! `Stripe-Signature` scheme (HMAC-SHA256 over `{timestamp}.{payload}`,
//! constant-time comparison, bounded clock skew).

#[cfg(test)]
pub mod testing;
mod webhook;

pub use webhook::verify_signature;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::StripeConfig;

const API_BASE: &str = "https://api.stripe.com/v1";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors from the Stripe gateway.
#[derive(Debug, Error)]
pub enum StripeError {
    /// Network failure or timeout reaching Stripe.
    #[error("Stripe unavailable: {0}")]
    Unavailable(String),

    /// Stripe rejected the request (4xx).
    #[error("Stripe rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Webhook signature did not verify.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Response body did not parse.
    #[error("Stripe parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A created payment intent: the id plus the client-confirmable secret.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// A completed transfer to a connected account.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct Transfer {
    pub id: String,
    pub amount: i64,
    pub destination: String,
}

/// A single-use Express dashboard login link for a connected account.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct LoginLink {
    pub url: String,
}

/// Request to move funds to a connected account.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    /// Connected account id (`acct_...`).
    pub destination: String,
    /// Order this transfer settles, recorded in metadata.
    pub order_id: u64,
    /// Deterministic key so webhook re-delivery cannot double-pay.
    pub idempotency_key: String,
}

/// Payment operations consumed by the services layer.
pub trait PaymentsApi: Send + Sync {
    /// Create a payment intent for frontend confirmation. `metadata`
    /// key/value pairs are attached verbatim.
    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(String, String)],
    ) -> impl Future<Output = Result<PaymentIntent, StripeError>> + Send;

    fn create_transfer(
        &self,
        request: &TransferRequest,
    ) -> impl Future<Output = Result<Transfer, StripeError>> + Send;

    /// Mint a one-time Express dashboard login link for a connected
    /// account.
    fn create_login_link(
        &self,
        account: &str,
    ) -> impl Future<Output = Result<LoginLink, StripeError>> + Send;
}

/// Stripe REST client (form-encoded API).
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            secret_key: config.secret_key.expose_secret().to_string(),
        }
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, StripeError> {
        let mut request = self
            .client
            .post(format!("{API_BASE}/{path}"))
            .bearer_auth(&self.secret_key)
            .form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StripeError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "request failed".to_string());
            if status.is_client_error() {
                return Err(StripeError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(StripeError::Unavailable(format!("HTTP {status}: {message}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StripeError::Unavailable(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl PaymentsApi for StripeClient {
    #[instrument(skip(self, metadata))]
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(String, String)],
    ) -> Result<PaymentIntent, StripeError> {
        let mut form = vec![
            ("amount".to_string(), amount.to_string()),
            ("currency".to_string(), currency.to_string()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        self.post_form("payment_intents", &form, None).await
    }

    #[instrument(skip(self, request), fields(destination = %request.destination, amount = request.amount))]
    async fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, StripeError> {
        let form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            ("destination".to_string(), request.destination.clone()),
            (
                "metadata[order_id]".to_string(),
                request.order_id.to_string(),
            ),
            (
                "description".to_string(),
                format!("Author payout for order {}", request.order_id),
            ),
        ];

        self.post_form("transfers", &form, Some(&request.idempotency_key))
            .await
    }

    #[instrument(skip(self))]
    async fn create_login_link(&self, account: &str) -> Result<LoginLink, StripeError> {
        self.post_form(&format!("accounts/{account}/login_links"), &[], None)
            .await
    }
}
