//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::services::{CatalogService, EntitlementResolver, OrderService, SettlementService};
use crate::stripe::StripeClient;
use crate::woo::WooClient;
use crate::wordpress::WordPressClient;

/// Response cache capacity; entries are small JSON payloads.
const CACHE_CAPACITY: u64 = 10_000;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The services share a single cache and
/// one client per remote.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    cache: ResponseCache,
    store: Arc<WooClient>,
    identity: Arc<WordPressClient>,
    payments: Arc<StripeClient>,
    catalog: CatalogService<WooClient, WordPressClient>,
    orders: OrderService<WooClient, StripeClient>,
    settlement: SettlementService<WooClient, StripeClient>,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = ResponseCache::new(CACHE_CAPACITY);
        let woo = Arc::new(WooClient::new(&config.woo));
        let identity = Arc::new(WordPressClient::new(&config.wordpress));
        let payments = Arc::new(StripeClient::new(&config.stripe));

        let catalog =
            CatalogService::new(Arc::clone(&woo), Arc::clone(&identity), cache.clone());
        let orders = OrderService::new(Arc::clone(&woo), Arc::clone(&payments));
        let settlement =
            SettlementService::new(Arc::clone(&woo), Arc::clone(&payments), cache.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                cache,
                store: woo,
                identity,
                payments,
                catalog,
                orders,
                settlement,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// The WooCommerce gateway, for operations the services do not wrap.
    #[must_use]
    pub fn store(&self) -> &WooClient {
        &self.inner.store
    }

    /// The WordPress identity gateway.
    #[must_use]
    pub fn identity(&self) -> &WordPressClient {
        &self.inner.identity
    }

    /// The Stripe payments gateway, for operations the services do not
    /// wrap.
    #[must_use]
    pub fn payments(&self) -> &StripeClient {
        &self.inner.payments
    }

    /// The catalog enrichment and gating pipeline.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService<WooClient, WordPressClient> {
        &self.inner.catalog
    }

    /// The entitlement resolver backing the catalog pipeline.
    #[must_use]
    pub fn entitlements(&self) -> &EntitlementResolver<WooClient> {
        self.inner.catalog.entitlements()
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService<WooClient, StripeClient> {
        &self.inner.orders
    }

    #[must_use]
    pub fn settlement(&self) -> &SettlementService<WooClient, StripeClient> {
        &self.inner.settlement
    }
}
