//! Checkout orchestration: pending order plus payment intent.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use inkwell_core::{Order, minor_units};

use crate::error::{AppError, Result};
use crate::stripe::PaymentsApi;
use crate::woo::{CatalogApi, NewOrder, OrderPage};

/// What the storefront needs to confirm a payment client-side.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub order: Order,
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// Creates orders and their payment intents.
#[derive(Clone)]
pub struct OrderService<C, P> {
    catalog: Arc<C>,
    payments: Arc<P>,
}

impl<C: CatalogApi, P: PaymentsApi> OrderService<C, P> {
    pub const fn new(catalog: Arc<C>, payments: Arc<P>) -> Self {
        Self { catalog, payments }
    }

    /// Create a pending order and a matching payment intent.
    ///
    /// The order is created first so its id can ride in the intent
    /// metadata; the settlement webhook reads it back from there. The
    /// intent amount comes from the store-computed order total, not the
    /// client payload.
    pub async fn create_checkout(&self, new_order: &NewOrder) -> Result<CheckoutSession> {
        if new_order.line_items.is_empty() {
            return Err(AppError::Validation(
                "order must contain at least one line item".to_string(),
            ));
        }

        let order = self.catalog.create_order(new_order).await?;

        let amount = minor_units(order.total).filter(|cents| *cents > 0).ok_or_else(|| {
            AppError::Validation(format!(
                "order total must be a positive amount, got {}",
                order.total
            ))
        })?;

        let metadata = vec![
            ("order_id".to_string(), order.id.to_string()),
            ("customer_email".to_string(), order.billing.email.clone()),
        ];
        let intent = self
            .payments
            .create_payment_intent(amount, &order.currency.to_lowercase(), &metadata)
            .await?;

        info!(
            order_id = order.id,
            intent = %intent.id,
            amount_minor = amount,
            "checkout created"
        );

        Ok(CheckoutSession {
            order,
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    /// One page of a customer's order history, pagination metadata intact.
    pub async fn list_orders(&self, customer_id: u64, page: u32, per_page: u32) -> Result<OrderPage> {
        Ok(self.catalog.list_orders(customer_id, page, per_page).await?)
    }

    /// A single order, only if it belongs to the requesting customer.
    pub async fn order_for_customer(&self, order_id: u64, customer_id: u64) -> Result<Order> {
        let order = self.catalog.get_order(order_id).await?;
        if order.customer_id != customer_id {
            return Err(AppError::NotFound(format!("order {order_id}")));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::testing::FakePayments;
    use crate::woo::NewLineItem;
    use crate::woo::testing::FakeCatalog;
    use rust_decimal::Decimal;

    fn new_order(totals: &[&str]) -> NewOrder {
        NewOrder {
            payment_method: "stripe".to_string(),
            payment_method_title: "Credit Card".to_string(),
            set_paid: false,
            billing: serde_json::from_value(serde_json::json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@example.com",
            }))
            .expect("billing"),
            line_items: totals
                .iter()
                .enumerate()
                .map(|(i, total)| NewLineItem {
                    product_id: 100 + i as u64,
                    quantity: 1,
                    name: format!("Book {i}"),
                    total: total.parse::<Decimal>().expect("decimal"),
                    sku: format!("SKU{i}"),
                })
                .collect(),
            customer_id: 42,
        }
    }

    #[tokio::test]
    async fn checkout_creates_pending_order_and_intent() {
        let catalog = FakeCatalog::default();
        let payments = FakePayments::default();
        let service = OrderService::new(Arc::new(catalog), Arc::new(payments.clone()));

        let session = service
            .create_checkout(&new_order(&["12.50", "7.49"]))
            .await
            .expect("checkout");

        assert_eq!(session.order.status, inkwell_core::OrderStatus::Pending);
        assert!(!session.client_secret.is_empty());

        let intents = payments.intents();
        assert_eq!(intents.len(), 1);
        // 12.50 + 7.49 = 19.99 -> 1999 minor units
        assert_eq!(intents[0].0, 1999);
        let metadata = &intents[0].2;
        assert!(
            metadata
                .iter()
                .any(|(k, v)| k == "order_id" && *v == session.order.id.to_string())
        );
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart_without_remote_calls() {
        let catalog = FakeCatalog::default();
        let service = OrderService::new(Arc::new(catalog.clone()), Arc::new(FakePayments::default()));

        let err = service
            .create_checkout(&new_order(&[]))
            .await
            .expect_err("validation");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(catalog.calls("create_order"), 0);
    }

    #[tokio::test]
    async fn checkout_rejects_zero_total() {
        let service = OrderService::new(
            Arc::new(FakeCatalog::default()),
            Arc::new(FakePayments::default()),
        );

        let err = service
            .create_checkout(&new_order(&["0.00"]))
            .await
            .expect_err("validation");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn order_lookup_is_scoped_to_customer() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 7,
            "status": "completed",
            "total": "10.00",
            "customer_id": 42,
        }))
        .expect("order");
        let catalog = FakeCatalog::default().with_order(order);
        let service = OrderService::new(Arc::new(catalog), Arc::new(FakePayments::default()));

        assert!(service.order_for_customer(7, 42).await.is_ok());
        let err = service.order_for_customer(7, 43).await.expect_err("scoped");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
