//! In-memory [`IdentityApi`] fake for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use inkwell_core::User;

use super::{AuthSession, IdentityApi, NewUser, WordPressError};

#[derive(Default)]
struct State {
    outage: bool,
    favorites: Vec<u64>,
    users_by_token: HashMap<String, User>,
    registered: Vec<String>,
    reset_requests: Vec<String>,
}

/// Configurable identity fake. Clones share state.
#[derive(Clone, Default)]
pub struct FakeIdentity {
    state: Arc<Mutex<State>>,
}

impl FakeIdentity {
    #[must_use]
    pub fn with_favorites(self, ids: Vec<u64>) -> Self {
        self.state.lock().unwrap().favorites = ids;
        self
    }

    /// Map a bearer token to a user record.
    #[must_use]
    pub fn with_token(self, token: &str, user_id: u64) -> Self {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": user_id,
            "username": format!("user{user_id}"),
            "roles": ["customer"],
        }))
        .expect("user fixture");
        self.state
            .lock()
            .unwrap()
            .users_by_token
            .insert(token.to_string(), user);
        self
    }

    /// Every call answers `Unavailable`.
    #[must_use]
    pub fn with_outage(self) -> Self {
        self.state.lock().unwrap().outage = true;
        self
    }

    /// Usernames registered through this fake, in order.
    #[must_use]
    pub fn registered(&self) -> Vec<String> {
        self.state.lock().unwrap().registered.clone()
    }

    /// Emails that requested a password reset.
    #[must_use]
    pub fn reset_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().reset_requests.clone()
    }

    fn check_outage(&self) -> Result<(), WordPressError> {
        if self.state.lock().unwrap().outage {
            return Err(WordPressError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(())
    }
}

impl IdentityApi for FakeIdentity {
    async fn authenticate(
        &self,
        username: &str,
        _password: &str,
    ) -> Result<AuthSession, WordPressError> {
        self.check_outage()?;
        let state = self.state.lock().unwrap();
        state
            .users_by_token
            .values()
            .find(|user| user.login_name() == Some(username))
            .cloned()
            .map(|user| AuthSession {
                access_token: format!("token-{}", user.id),
                token_type: "bearer".to_string(),
                user,
            })
            .ok_or_else(|| WordPressError::Unauthorized("bad credentials".to_string()))
    }

    async fn get_current_user(&self, token: &str) -> Result<User, WordPressError> {
        self.check_outage()?;
        let state = self.state.lock().unwrap();
        state
            .users_by_token
            .get(token)
            .cloned()
            .ok_or_else(|| WordPressError::Unauthorized("unknown token".to_string()))
    }

    async fn register(&self, user: &NewUser) -> Result<User, WordPressError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        state.registered.push(user.username.clone());
        let id = 100 + state.registered.len() as u64;
        Ok(serde_json::from_value(serde_json::json!({
            "id": id,
            "username": user.username,
            "email": user.email,
            "roles": [user.role.as_deref().unwrap_or("customer")],
        }))?)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), WordPressError> {
        self.check_outage()?;
        self.state
            .lock()
            .unwrap()
            .reset_requests
            .push(email.to_string());
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        _key: &str,
        _login: &str,
        _new_password: &str,
    ) -> Result<(), WordPressError> {
        self.check_outage()?;
        Ok(())
    }

    async fn update_user(
        &self,
        _user_id: u64,
        _payload: &serde_json::Value,
        token: &str,
    ) -> Result<User, WordPressError> {
        self.get_current_user(token).await
    }

    async fn get_favorites(&self, _token: &str) -> Result<Vec<u64>, WordPressError> {
        self.check_outage()?;
        Ok(self.state.lock().unwrap().favorites.clone())
    }

    async fn add_favorite(&self, _token: &str, product_id: u64) -> Result<Vec<u64>, WordPressError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        if !state.favorites.contains(&product_id) {
            state.favorites.push(product_id);
        }
        Ok(state.favorites.clone())
    }

    async fn remove_favorite(
        &self,
        _token: &str,
        product_id: u64,
    ) -> Result<Vec<u64>, WordPressError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        state.favorites.retain(|id| *id != product_id);
        Ok(state.favorites.clone())
    }
}
