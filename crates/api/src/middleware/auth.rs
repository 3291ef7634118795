//! Bearer-token authentication extractors.
//!
//! Tokens are opaque to this service: every extraction resolves the
//! token against WordPress, which remains the single source of truth
//! for identity. Nothing here is verified locally.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use inkwell_core::User;

use crate::error::AppError;
use crate::state::AppState;
use crate::wordpress::IdentityApi;

/// The resolved user plus the raw token, for calls made on their behalf.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.user.id
    }
}

/// Extract the bearer token from an `Authorization` header, if present.
#[must_use]
pub fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 when the header is missing or WordPress does not
/// recognize the token.
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
        let user = state.identity().get_current_user(&token).await?;
        Ok(Self(CurrentUser { user, token }))
    }
}

/// Extractor that resolves a bearer token when one is present.
///
/// A missing header yields `None`; a present but invalid token is still
/// a 401, so a client cannot fall back to the anonymous view of gated
/// content by sending garbage.
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        let user = state.identity().get_current_user(&token).await?;
        Ok(Self(Some(CurrentUser { user, token })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/products");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[test]
    fn bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header_is_none() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
    }

    #[test]
    fn non_bearer_scheme_is_none() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn empty_bearer_is_none() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
