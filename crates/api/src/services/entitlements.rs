//! Per-user access decisions for gated digital content.
//!
//! `resolve(user, product)` is `is_admin(user) OR has_purchased(user,
//! product)`, admin first with short-circuit. Both sub-results are
//! cached independently so list views with many products do not repeat
//! remote round-trips: admin status per user (coarse), purchase status
//! per (user, product) pair (fine).
//!
//! Both checks fail closed: a remote error never grants access, and it
//! never propagates either - an outage hides gated fields instead of
//! failing the request. Error-derived `false` results are not cached, so
//! a transient outage does not pin a denial for the TTL window.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{ResponseCache, ttl};
use crate::woo::CatalogApi;
use inkwell_core::OrderStatus;

/// Resolves whether a user may see gated product fields.
#[derive(Clone)]
pub struct EntitlementResolver<C> {
    catalog: Arc<C>,
    cache: ResponseCache,
}

impl<C: CatalogApi> EntitlementResolver<C> {
    pub const fn new(catalog: Arc<C>, cache: ResponseCache) -> Self {
        Self { catalog, cache }
    }

    /// Whether the user holds the administrator role. Fail-closed: any
    /// remote error answers `false` (an elevation check must never grant
    /// privilege by accident).
    pub async fn is_admin(&self, user_id: u64) -> bool {
        let key = format!("user_is_admin:{user_id}");
        if let Some(cached) = self.cache.get_as::<bool>(&key).await {
            debug!(user_id, cached, "admin status (cached)");
            return cached;
        }

        let admin = match self.catalog.get_customer(user_id).await {
            Ok(user) => user.role_field().is_administrator(),
            Err(err) => {
                warn!(user_id, error = %err, "admin check failed, denying");
                return false;
            }
        };

        self.cache.set_as(&key, &admin, ttl::PERMISSION).await;
        admin
    }

    /// Whether the user has a completed order containing the product.
    /// Fail-closed: this gates paid content, so a failed check must not
    /// grant access.
    pub async fn has_purchased(&self, user_id: u64, product_id: u64) -> bool {
        let key = format!("user_purchase:{user_id}:{product_id}");
        if let Some(cached) = self.cache.get_as::<bool>(&key).await {
            debug!(user_id, product_id, cached, "purchase status (cached)");
            return cached;
        }

        let orders = match self.catalog.get_orders(user_id, OrderStatus::Completed).await {
            Ok(orders) => orders,
            Err(err) => {
                warn!(user_id, product_id, error = %err, "purchase check failed, denying");
                return false;
            }
        };

        let purchased = orders
            .iter()
            .flat_map(|order| &order.line_items)
            .any(|item| item.product_id == product_id);

        self.cache.set_as(&key, &purchased, ttl::PERMISSION).await;
        purchased
    }

    /// Full entitlement decision: admin shortcut, then purchase history.
    pub async fn resolve(&self, user_id: u64, product_id: u64) -> bool {
        if self.is_admin(user_id).await {
            return true;
        }
        self.has_purchased(user_id, product_id).await
    }
}
