//! Order types mirroring the WooCommerce REST payloads.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::MetaEntry;
use super::product::RECIPIENT_META_KEY;

/// WooCommerce order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    /// Statuses added by store plugins that we do not interpret.
    #[serde(other)]
    Other,
}

impl OrderStatus {
    /// Wire representation used in query parameters and update payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Other => "other",
        }
    }
}

/// Billing snapshot attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BillingInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A single order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub name: String,
    /// Line total as a decimal string, WooCommerce convention.
    #[serde(default, with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

impl LineItem {
    /// The Stripe connected account receiving this item's revenue share,
    /// if one is attached.
    #[must_use]
    pub fn recipient_account(&self) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == RECIPIENT_META_KEY)
            .and_then(MetaEntry::value_str)
    }
}

/// A WooCommerce order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub status: OrderStatus,
    /// Order total as a decimal string, WooCommerce convention.
    #[serde(default, with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub billing: BillingInfo,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
