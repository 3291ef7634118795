//! Authentication handlers backed by the WordPress identity gateway.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use inkwell_core::User;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::wordpress::{ALLOWED_REGISTRATION_ROLES, AuthSession, IdentityApi, NewUser};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub key: String,
    pub login: String,
    pub password: String,
}

/// `POST /api/v1/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthSession>> {
    let session = state
        .identity()
        .authenticate(&payload.username, &payload.password)
        .await?;
    info!(user_id = session.user.id, "login succeeded");
    Ok(Json(session))
}

/// `GET /api/v1/auth/me`
pub async fn me(RequireUser(current): RequireUser) -> Json<User> {
    Json(current.user)
}

/// `POST /api/v1/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<Json<User>> {
    let role = payload.role.as_deref().unwrap_or("customer").to_lowercase();
    if !ALLOWED_REGISTRATION_ROLES.contains(&role.as_str()) {
        return Err(AppError::Validation(format!(
            "role '{role}' is not available for registration"
        )));
    }

    let user = state.identity().register(&payload).await?;
    info!(user_id = user.id, "user registered");
    Ok(Json(user))
}

/// `POST /api/v1/auth/forgot-password`
///
/// Always answers with the same message so the endpoint cannot be used
/// to probe which emails exist.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<Value>> {
    match state.identity().request_password_reset(&payload.email).await {
        Ok(()) => {}
        Err(crate::wordpress::WordPressError::Rejected { .. }) => {}
        Err(err) => return Err(err.into()),
    }
    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent."
    })))
}

/// `POST /api/v1/auth/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<Value>> {
    state
        .identity()
        .confirm_password_reset(&payload.key, &payload.login, &payload.password)
        .await?;
    Ok(Json(json!({ "message": "Password has been reset." })))
}
