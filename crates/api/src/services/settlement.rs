//! Post-payment settlement: one revenue-share transfer per recipient.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use inkwell_core::{Order, OrderStatus, payout_share_minor_units};

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::stripe::{PaymentsApi, Transfer, TransferRequest};
use crate::woo::CatalogApi;

/// Outcome of settling one order. Failures carry the destination and the
/// error text; the webhook acks regardless, so this is the audit record.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SettlementReport {
    pub order_id: u64,
    pub transfers: Vec<Transfer>,
    pub failures: Vec<SettlementFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementFailure {
    pub destination: String,
    pub amount: i64,
    pub error: String,
}

/// Aggregate each recipient's share across the order's line items.
///
/// Per-item shares are floored to minor units before summing, so a
/// recipient's payout for two 9.95 items is `895 + 895 = 1790`, one cent
/// under `floor(19.90 * 0.9 * 100) = 1791`. Items without a recipient
/// account fund the platform and are skipped; non-positive aggregates
/// are dropped.
#[must_use]
pub fn revenue_split(order: &Order) -> BTreeMap<String, i64> {
    let mut shares: BTreeMap<String, i64> = BTreeMap::new();
    for item in &order.line_items {
        if let Some(recipient) = item.recipient_account() {
            *shares.entry(recipient.to_string()).or_insert(0) +=
                payout_share_minor_units(item.total);
        }
    }
    shares.retain(|_, amount| *amount > 0);
    shares
}

/// Settles paid orders: marks them complete and fans out transfers.
#[derive(Clone)]
pub struct SettlementService<C, P> {
    catalog: Arc<C>,
    payments: Arc<P>,
    cache: ResponseCache,
}

impl<C: CatalogApi, P: PaymentsApi> SettlementService<C, P> {
    pub const fn new(catalog: Arc<C>, payments: Arc<P>, cache: ResponseCache) -> Self {
        Self {
            catalog,
            payments,
            cache,
        }
    }

    /// Settle a paid order.
    ///
    /// The status update is best-effort: a store hiccup must not block
    /// author payouts, and the deterministic idempotency keys make a
    /// webhook re-delivery safe to retry the whole sequence. Transfers
    /// run concurrently; one recipient's failure never blocks another's
    /// payout.
    pub async fn settle(&self, order_id: u64) -> Result<SettlementReport> {
        if let Err(err) = self
            .catalog
            .update_order_status(order_id, OrderStatus::Completed)
            .await
        {
            warn!(order_id, error = %err, "failed to mark order completed");
        }

        let order = self.catalog.get_order(order_id).await?;
        let shares = revenue_split(&order);
        if shares.is_empty() {
            info!(order_id, "no revenue shares to settle");
            self.invalidate_catalog_caches().await;
            return Ok(SettlementReport {
                order_id,
                ..SettlementReport::default()
            });
        }

        let currency = if order.currency.is_empty() {
            "usd".to_string()
        } else {
            order.currency.to_lowercase()
        };

        let attempts = shares.into_iter().map(|(destination, amount)| {
            let request = TransferRequest {
                amount,
                currency: currency.clone(),
                idempotency_key: format!("settle:{order_id}:{destination}"),
                destination,
                order_id,
            };
            async move {
                let outcome = self.payments.create_transfer(&request).await;
                (request, outcome)
            }
        });

        let mut report = SettlementReport {
            order_id,
            ..SettlementReport::default()
        };
        for (request, outcome) in join_all(attempts).await {
            match outcome {
                Ok(transfer) => {
                    info!(
                        order_id,
                        destination = %transfer.destination,
                        amount_minor = transfer.amount,
                        "transfer created"
                    );
                    report.transfers.push(transfer);
                }
                Err(err) => {
                    warn!(
                        order_id,
                        destination = %request.destination,
                        amount_minor = request.amount,
                        error = %err,
                        "transfer failed"
                    );
                    report.failures.push(SettlementFailure {
                        destination: request.destination,
                        amount: request.amount,
                        error: err.to_string(),
                    });
                }
            }
        }

        self.invalidate_catalog_caches().await;
        Ok(report)
    }

    /// Product listings may change once an order settles (stock,
    /// entitlements on the library view), so drop the response caches.
    /// Purchase entitlements are never invalidated here: a confirmed
    /// purchase only adds access.
    async fn invalidate_catalog_caches(&self) {
        for pattern in ["products:*", "product:*", "library_products:*"] {
            self.cache.invalidate(pattern).await;
        }
    }
}
