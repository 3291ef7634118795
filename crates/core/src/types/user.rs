//! WordPress user types.
//!
//! The role field arrives as a single string from some backend versions
//! and as a list from others; [`RoleField`] normalizes both shapes at the
//! boundary so call sites never re-check.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const ADMINISTRATOR: &str = "administrator";

/// A user's role field in either wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleField {
    Single(String),
    Many(Vec<String>),
}

impl RoleField {
    /// Normalized lowercase role set.
    #[must_use]
    pub fn normalized(&self) -> BTreeSet<String> {
        match self {
            Self::Single(role) => std::iter::once(role.to_lowercase()).collect(),
            Self::Many(roles) => roles.iter().map(|r| r.to_lowercase()).collect(),
        }
    }

    /// Whether `administrator` appears, case-insensitively.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        match self {
            Self::Single(role) => role.eq_ignore_ascii_case(ADMINISTRATOR),
            Self::Many(roles) => roles.iter().any(|r| r.eq_ignore_ascii_case(ADMINISTRATOR)),
        }
    }
}

impl Default for RoleField {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// A WordPress user as returned by the users endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Single-string role field (older backends).
    #[serde(default)]
    pub role: Option<RoleField>,
    /// List role field (newer backends).
    #[serde(default)]
    pub roles: Option<RoleField>,
    /// Connected Stripe account id (`acct_...`), present for authors.
    #[serde(default)]
    pub stripe_account_id: Option<String>,
}

impl User {
    /// The role field, preferring the list shape when both are present.
    #[must_use]
    pub fn role_field(&self) -> RoleField {
        self.roles
            .clone()
            .or_else(|| self.role.clone())
            .unwrap_or_default()
    }

    /// Login name used for password re-verification; WordPress exposes it
    /// as `username` on authenticated requests and `slug` otherwise.
    #[must_use]
    pub fn login_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.slug.as_deref())
    }
}
