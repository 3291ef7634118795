//! Profile and password management handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use inkwell_core::User;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::wordpress::{IdentityApi, ProfileUpdate};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PasswordChangePayload {
    pub current_password: String,
    pub new_password: String,
}

/// `PUT /api/v1/users/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let fields = payload.to_payload();
    if fields.is_empty() {
        return Err(AppError::Validation(
            "no profile fields to update".to_string(),
        ));
    }

    let user = state
        .identity()
        .update_user(current.id(), &Value::Object(fields), &current.token)
        .await?;
    Ok(Json(user))
}

/// `PUT /api/v1/users/password`
///
/// The current password is verified by re-authenticating against
/// WordPress before the new one is written; holding a stolen token is
/// not enough to rotate the password.
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<PasswordChangePayload>,
) -> Result<Json<Value>> {
    if payload.new_password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    let login = current
        .user
        .login_name()
        .ok_or_else(|| AppError::Internal("user record has no login name".to_string()))?;
    state
        .identity()
        .authenticate(login, &payload.current_password)
        .await
        .map_err(|_| AppError::Unauthorized("current password is incorrect".to_string()))?;

    state
        .identity()
        .update_user(
            current.id(),
            &json!({ "password": payload.new_password }),
            &current.token,
        )
        .await?;

    info!(user_id = current.id(), "password changed");
    Ok(Json(json!({ "message": "Password updated." })))
}
