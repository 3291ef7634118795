//! Core types for Inkwell.
//!
//! Domain models for the WooCommerce catalog, WordPress identities, and
//! payout arithmetic.

pub mod filters;
pub mod money;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use filters::ProductFilters;
pub use money::{minor_units, payout_share_minor_units, PAYOUT_FRACTION};
pub use order::{BillingInfo, LineItem, Order, OrderStatus};
pub use product::{Category, MetaEntry, Product, Tag, EBOOK_STREAM_URL_KEY, RECIPIENT_META_KEY};
pub use review::Review;
pub use user::{RoleField, User};
