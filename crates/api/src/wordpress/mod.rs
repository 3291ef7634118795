//! WordPress identity gateway.
//!
//! Treats WordPress as an opaque identity provider: JWT login, user
//! lookup, registration, password reset, profile updates, and the
//! favorites plugin endpoints. Privileged calls (registration, password
//! reset) carry the configured application credentials; everything else
//! carries the end user's bearer token.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use inkwell_core::User;

use crate::config::WordPressConfig;

#[cfg(test)]
pub mod testing;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Roles a self-service registration may request.
pub const ALLOWED_REGISTRATION_ROLES: &[&str] = &[
    "vendor",
    "shop_manager",
    "customer",
    "subscriber",
    "contributor",
    "author",
    "editor",
];

/// Errors from the WordPress gateway.
#[derive(Debug, Error)]
pub enum WordPressError {
    /// Network failure or timeout reaching the site.
    #[error("WordPress unavailable: {0}")]
    Unavailable(String),

    /// Credentials or token rejected.
    #[error("WordPress unauthorized: {0}")]
    Unauthorized(String),

    /// The site rejected the request (other 4xx).
    #[error("WordPress rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not parse.
    #[error("WordPress parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Successful login: the JWT plus the resolved user record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Registration payload accepted from clients.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Profile fields a user may update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// WordPress update payload; `name` is derived when both name parts
    /// are present. Empty when nothing was provided.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut payload = serde_json::Map::new();
        if let Some(first) = &self.first_name {
            payload.insert("first_name".to_string(), first.clone().into());
        }
        if let Some(last) = &self.last_name {
            payload.insert("last_name".to_string(), last.clone().into());
        }
        if let (Some(first), Some(last)) = (&self.first_name, &self.last_name) {
            payload.insert("name".to_string(), format!("{first} {last}").into());
        }
        if let Some(email) = &self.email {
            payload.insert("email".to_string(), email.clone().into());
        }
        payload
    }
}

/// Identity operations consumed by the services and middleware.
pub trait IdentityApi: Send + Sync {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, WordPressError>> + Send;

    fn get_current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<User, WordPressError>> + Send;

    fn register(&self, user: &NewUser)
    -> impl Future<Output = Result<User, WordPressError>> + Send;

    fn request_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), WordPressError>> + Send;

    fn confirm_password_reset(
        &self,
        key: &str,
        login: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<(), WordPressError>> + Send;

    fn update_user(
        &self,
        user_id: u64,
        payload: &serde_json::Value,
        token: &str,
    ) -> impl Future<Output = Result<User, WordPressError>> + Send;

    /// Product ids the token's user has favorited.
    fn get_favorites(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<u64>, WordPressError>> + Send;

    fn add_favorite(
        &self,
        token: &str,
        product_id: u64,
    ) -> impl Future<Output = Result<Vec<u64>, WordPressError>> + Send;

    fn remove_favorite(
        &self,
        token: &str,
        product_id: u64,
    ) -> impl Future<Output = Result<Vec<u64>, WordPressError>> + Send;
}

/// WordPress REST client.
#[derive(Clone)]
pub struct WordPressClient {
    client: reqwest::Client,
    base_url: String,
    admin_user: String,
    admin_pass: String,
}

#[derive(Debug, Deserialize)]
struct JwtResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl WordPressClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &WordPressConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.clone(),
            admin_user: config.admin_user.clone(),
            admin_pass: config.admin_pass.expose_secret().to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/wp-json/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Extract the remote's error message from an unsuccessful response.
    async fn remote_message(response: reqwest::Response) -> String {
        let fallback = "request failed".to_string();
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(fallback)
    }

    async fn check<T: DeserializeOwned>(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, WordPressError> {
        let response = response.map_err(|e| WordPressError::Unavailable(e.to_string()))?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(WordPressError::Unauthorized(
                Self::remote_message(response).await,
            ));
        }
        if status.is_client_error() {
            return Err(WordPressError::Rejected {
                status: status.as_u16(),
                message: Self::remote_message(response).await,
            });
        }
        if !status.is_success() {
            return Err(WordPressError::Unavailable(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WordPressError::Unavailable(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl IdentityApi for WordPressClient {
    #[instrument(skip(self, password), fields(username = %username))]
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, WordPressError> {
        let jwt: JwtResponse = Self::check(
            self.client
                .post(self.endpoint("jwt-auth/v1/token"))
                .form(&[("username", username), ("password", password)])
                .send()
                .await,
        )
        .await
        .map_err(|err| match err {
            // The JWT plugin reports bad credentials as a 403
            WordPressError::Rejected { message, .. } => WordPressError::Unauthorized(message),
            other => other,
        })?;

        let user = self.get_current_user(&jwt.token).await?;

        Ok(AuthSession {
            access_token: jwt.token,
            token_type: "bearer".to_string(),
            user,
        })
    }

    #[instrument(skip(self, token))]
    async fn get_current_user(&self, token: &str) -> Result<User, WordPressError> {
        Self::check(
            self.client
                .get(self.endpoint("wp/v2/users/me"))
                .query(&[("context", "edit")])
                .bearer_auth(token)
                .send()
                .await,
        )
        .await
        .map_err(|err| match err {
            WordPressError::Rejected { message, .. } => WordPressError::Unauthorized(message),
            other => other,
        })
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn register(&self, user: &NewUser) -> Result<User, WordPressError> {
        let role = user.role.as_deref().unwrap_or("customer").to_lowercase();
        let mut payload = serde_json::Map::new();
        payload.insert("username".to_string(), user.username.clone().into());
        payload.insert("email".to_string(), user.email.clone().into());
        payload.insert("password".to_string(), user.password.clone().into());
        // WordPress expects the role as a list
        payload.insert("roles".to_string(), serde_json::json!([role]));
        if let Some(first) = &user.first_name {
            payload.insert("first_name".to_string(), first.clone().into());
        }
        if let Some(last) = &user.last_name {
            payload.insert("last_name".to_string(), last.clone().into());
        }
        if let Some(website) = &user.website {
            payload.insert("url".to_string(), website.clone().into());
        }

        Self::check(
            self.client
                .post(self.endpoint("wp/v2/users"))
                .basic_auth(&self.admin_user, Some(&self.admin_pass))
                .json(&payload)
                .send()
                .await,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn request_password_reset(&self, email: &str) -> Result<(), WordPressError> {
        let _: serde_json::Value = Self::check(
            self.client
                .post(self.endpoint("custom/v1/forgot-password"))
                .basic_auth(&self.admin_user, Some(&self.admin_pass))
                .json(&serde_json::json!({ "email": email }))
                .send()
                .await,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, key, new_password))]
    async fn confirm_password_reset(
        &self,
        key: &str,
        login: &str,
        new_password: &str,
    ) -> Result<(), WordPressError> {
        let _: serde_json::Value = Self::check(
            self.client
                .post(self.endpoint("custom/v1/reset-password"))
                .basic_auth(&self.admin_user, Some(&self.admin_pass))
                .json(&serde_json::json!({
                    "key": key,
                    "login": login,
                    "password": new_password,
                }))
                .send()
                .await,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, payload, token))]
    async fn update_user(
        &self,
        user_id: u64,
        payload: &serde_json::Value,
        token: &str,
    ) -> Result<User, WordPressError> {
        Self::check(
            self.client
                .post(self.endpoint(&format!("wp/v2/users/{user_id}")))
                .bearer_auth(token)
                .json(payload)
                .send()
                .await,
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn get_favorites(&self, token: &str) -> Result<Vec<u64>, WordPressError> {
        Self::check(
            self.client
                .get(self.endpoint("custom/v1/favorites"))
                .bearer_auth(token)
                .send()
                .await,
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn add_favorite(&self, token: &str, product_id: u64) -> Result<Vec<u64>, WordPressError> {
        Self::check(
            self.client
                .post(self.endpoint("custom/v1/favorites/add"))
                .bearer_auth(token)
                .json(&serde_json::json!({ "product_id": product_id }))
                .send()
                .await,
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn remove_favorite(
        &self,
        token: &str,
        product_id: u64,
    ) -> Result<Vec<u64>, WordPressError> {
        Self::check(
            self.client
                .post(self.endpoint("custom/v1/favorites/remove"))
                .bearer_auth(token)
                .json(&serde_json::json!({ "product_id": product_id }))
                .send()
                .await,
        )
        .await
    }
}
