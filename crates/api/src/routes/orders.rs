//! Checkout and order-history handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use inkwell_core::BillingInfo;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::orders::CheckoutSession;
use crate::state::AppState;
use crate::woo::{NewLineItem, NewOrder, OrderPage};

/// Client checkout payload. The store recomputes the authoritative
/// total; line totals here only seed the pending order.
#[derive(Debug, Deserialize)]
pub struct CheckoutPayload {
    pub billing: BillingInfo,
    pub line_items: Vec<CheckoutItem>,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default = "default_payment_method_title")]
    pub payment_method_title: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub product_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default)]
    pub sku: String,
}

fn default_payment_method() -> String {
    "stripe".to_string()
}

fn default_payment_method_title() -> String {
    "Credit Card".to_string()
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    10
}

/// `POST /api/v1/orders`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<CheckoutPayload>,
) -> Result<Json<CheckoutSession>> {
    let new_order = NewOrder {
        payment_method: payload.payment_method,
        payment_method_title: payload.payment_method_title,
        set_paid: false,
        billing: payload.billing,
        line_items: payload
            .line_items
            .into_iter()
            .map(|item| NewLineItem {
                product_id: item.product_id,
                quantity: item.quantity,
                name: item.name,
                total: item.total,
                sku: item.sku,
            })
            .collect(),
        customer_id: user.id(),
    };

    let session = state.orders().create_checkout(&new_order).await?;
    Ok(Json(session))
}

/// `GET /api/v1/orders`
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<OrderPage>> {
    let page = state
        .orders()
        .list_orders(user.id(), query.page, query.per_page.min(100))
        .await?;
    Ok(Json(page))
}

/// `GET /api/v1/orders/{order_id}`
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<u64>,
) -> Result<Json<inkwell_core::Order>> {
    let order = state
        .orders()
        .order_for_customer(order_id, user.id())
        .await?;
    Ok(Json(order))
}
