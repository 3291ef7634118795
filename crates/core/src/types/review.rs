//! Product review types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A product review as stored in WooCommerce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub product_id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub reviewer_email: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_parses_woocommerce_payload() {
        let review: Review = serde_json::from_value(serde_json::json!({
            "id": 9,
            "product_id": 226,
            "status": "approved",
            "reviewer": "Jane",
            "reviewer_email": "jane@example.com",
            "review": "A gripping read from start to finish.",
            "rating": 5,
            "date_created": "2026-01-15T10:30:00"
        }))
        .expect("parse");
        assert_eq!(review.rating, 5);
        assert!(review.date_created.is_some());
    }
}
