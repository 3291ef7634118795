//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Gateway errors map onto the taxonomy as follows: transport failures
//! become `RemoteUnavailable` (503), remote 4xx responses become
//! `RemoteRejected` and keep the remote's status and message, remote 5xx
//! responses become `RemoteUnavailable`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::stripe::StripeError;
use crate::woo::WooError;
use crate::wordpress::WordPressError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A remote gateway could not be reached (network error or timeout).
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A remote gateway rejected the request (4xx).
    #[error("Remote service rejected request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed input to a create/update operation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WooError> for AppError {
    fn from(err: WooError) -> Self {
        match err {
            WooError::Unavailable(msg) => Self::RemoteUnavailable(msg),
            WooError::Rejected { status, message } => Self::RemoteRejected { status, message },
            WooError::NotFound(what) => Self::NotFound(what),
            WooError::Parse(e) => Self::Internal(format!("catalog response parse error: {e}")),
        }
    }
}

impl From<WordPressError> for AppError {
    fn from(err: WordPressError) -> Self {
        match err {
            WordPressError::Unavailable(msg) => Self::RemoteUnavailable(msg),
            WordPressError::Unauthorized(msg) => Self::Unauthorized(msg),
            WordPressError::Rejected { status, message } => Self::RemoteRejected { status, message },
            WordPressError::Parse(e) => {
                Self::Internal(format!("identity response parse error: {e}"))
            }
        }
    }
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Unavailable(msg) => Self::RemoteUnavailable(msg),
            StripeError::Rejected { status, message } => Self::RemoteRejected { status, message },
            StripeError::InvalidSignature => Self::Unauthorized("invalid signature".to_string()),
            StripeError::Parse(e) => Self::Internal(format!("payment response parse error: {e}")),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization error: {err}"))
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::RemoteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RemoteRejected { status, .. } => match StatusCode::from_u16(*status) {
                Ok(code) => code,
                Err(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(self, Self::Internal(_) | Self::RemoteUnavailable(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let detail = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::RemoteUnavailable(_) => "Upstream service unavailable".to_string(),
            Self::RemoteRejected { message, .. } => message.clone(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
