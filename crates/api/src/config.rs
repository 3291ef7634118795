//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WC_API_URL` - WooCommerce REST base URL (e.g., https://shop.example/wp-json/wc/v3)
//! - `WC_CONSUMER_KEY` - WooCommerce REST consumer key
//! - `WC_CONSUMER_SECRET` - WooCommerce REST consumer secret
//! - `WP_URL` - WordPress site URL (identity provider)
//! - `WP_ADMIN_USER` - WordPress application user for privileged calls
//! - `WP_ADMIN_PASS` - WordPress application password
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8000)
//! - `CORS_ORIGINS` - Comma-separated allowed origins (default: http://localhost:3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins for the storefront client
    pub cors_origins: Vec<String>,
    /// WooCommerce catalog gateway configuration
    pub woo: WooConfig,
    /// WordPress identity gateway configuration
    pub wordpress: WordPressConfig,
    /// Stripe payments gateway configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact the consumer secret.
#[derive(Clone)]
pub struct WooConfig {
    /// REST base URL, without trailing slash
    pub base_url: String,
    /// Consumer key (service-level credential)
    pub consumer_key: String,
    /// Consumer secret (service-level credential)
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for WooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// WordPress identity provider configuration.
#[derive(Clone)]
pub struct WordPressConfig {
    /// Site URL, without trailing slash
    pub base_url: String,
    /// Application user for privileged calls (registration, password reset)
    pub admin_user: String,
    /// Application password for the admin user
    pub admin_pass: SecretString,
}

impl std::fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("base_url", &self.base_url)
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &"[REDACTED]")
            .finish()
    }
}

/// Stripe configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key
    pub secret_key: SecretString,
    /// Webhook signing secret
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;
        let cors_origins = get_env_or_default("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_origins,
            woo: WooConfig::from_env()?,
            wordpress: WordPressConfig::from_env()?,
            stripe: StripeConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl WooConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_base_url("WC_API_URL")?,
            consumer_key: get_required_env("WC_CONSUMER_KEY")?,
            consumer_secret: get_validated_secret("WC_CONSUMER_SECRET")?,
        })
    }
}

impl WordPressConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_base_url("WP_URL")?,
            admin_user: get_required_env("WP_ADMIN_USER")?,
            // Application passwords contain spaces, which trips the entropy
            // check less reliably than API keys; length-validate only.
            admin_pass: get_required_secret("WP_ADMIN_PASS")?,
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get a required URL-valued variable, stripping any trailing slash.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
