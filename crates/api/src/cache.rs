//! Response cache for remote reads and computed permission decisions.
//!
//! In-memory `moka` cache with per-entry TTL and glob-pattern
//! invalidation. Caching here is a performance optimization, never a
//! correctness dependency: every operation is total, and a missing or
//! expired entry simply forces a remote round-trip.
//!
//! Pattern invalidation is best-effort, not linearizable: a reader racing
//! an `invalidate` may still observe a subset of the matched keys until
//! the sweep completes.
//!
//! # Key namespaces
//!
//! - `category:{id}` - enriched category records
//! - `user_is_admin:{user_id}` - coarse admin flag per user
//! - `user_purchase:{user_id}:{product_id}` - fine purchase flag per pair
//! - `products:*`, `product:*`, `library_products:*`, `featured_products:*`,
//!   `genres`, `authors:*` - response caches keyed by
//!   `prefix:sorted-filter-json:slug?:user_id?`

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use regex::Regex;
use tracing::debug;

/// Cache TTLs, in seconds, per namespace.
pub mod ttl {
    use std::time::Duration;

    pub const PRODUCTS: Duration = Duration::from_secs(120);
    pub const SINGLE_PRODUCT: Duration = Duration::from_secs(300);
    pub const GENRES: Duration = Duration::from_secs(300);
    pub const AUTHORS: Duration = Duration::from_secs(300);
    pub const FEATURED: Duration = Duration::from_secs(600);
    pub const LIBRARY: Duration = Duration::from_secs(180);
    pub const CATEGORY: Duration = Duration::from_secs(3600);
    pub const PERMISSION: Duration = Duration::from_secs(300);
}

/// A cached JSON value with its own expiry.
#[derive(Debug, Clone)]
struct CachedEntry {
    value: serde_json::Value,
    ttl: Duration,
}

/// Expiry policy reading each entry's TTL.
struct PerEntryTtl;

impl Expiry<String, CachedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    // Without this, moka keeps the prior entry's remaining duration on
    // overwrite and the replacement's TTL is ignored.
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Key/value response cache with TTL and pattern invalidation.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<String, CachedEntry>,
}

impl ResponseCache {
    /// Create a cache bounded to `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    /// Look up a cached value. Expired or absent keys return `None`.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).await.map(|entry| entry.value)
    }

    /// Look up and deserialize a cached value. Entries that no longer
    /// deserialize (stale shape after a deploy) count as misses.
    pub async fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    /// Store a value under `key` for `ttl`.
    pub async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CachedEntry { value, ttl })
            .await;
    }

    /// Serialize and store a value. Unserializable values are dropped
    /// silently; the next read refetches.
    pub async fn set_as<T: serde::Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if let Ok(value) = serde_json::to_value(value) {
            self.set(key, value, ttl).await;
        }
    }

    /// Delete every key matching a glob pattern (`*` matches any run of
    /// characters). Returns the number of keys removed.
    pub async fn invalidate(&self, pattern: &str) -> u64 {
        let Some(matcher) = glob_to_regex(pattern) else {
            return 0;
        };

        let matched: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.is_match(key))
            .map(|(key, _)| (*key).clone())
            .collect();

        let count = matched.len() as u64;
        for key in matched {
            self.entries.invalidate(&key).await;
        }
        if count > 0 {
            debug!(pattern, count, "invalidated cache keys");
        }
        count
    }
}

/// Build the response-cache key `prefix:sorted-filter-json:slug?:user_id?`.
#[must_use]
pub fn response_cache_key(
    prefix: &str,
    filters_json: Option<&str>,
    slug: Option<&str>,
    user_id: Option<u64>,
) -> String {
    let mut parts = vec![prefix.to_string()];
    if let Some(filters) = filters_json {
        parts.push(filters.to_string());
    }
    if let Some(slug) = slug {
        parts.push(slug.to_string());
    }
    if let Some(user_id) = user_id {
        parts.push(user_id.to_string());
    }
    parts.join(":")
}

/// Translate a glob pattern into an anchored regex. `*` is the only
/// metacharacter; everything else matches literally.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 4);
    translated.push('^');
    for part in pattern.split('*') {
        if !translated.ends_with('^') {
            translated.push_str(".*");
        }
        translated.push_str(&regex::escape(part));
    }
    if pattern.ends_with('*') {
        translated.push_str(".*");
    }
    translated.push('$');
    Regex::new(&translated).ok()
}
