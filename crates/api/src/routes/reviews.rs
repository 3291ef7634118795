//! Product review handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use inkwell_core::Review;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::woo::{CatalogApi, NewReview};

const MIN_REVIEW_CHARS: usize = 10;
const MIN_REVIEWER_CHARS: usize = 2;

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub product: u64,
    #[serde(default = "default_page")]
    pub page: u32,
}

const fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub product_id: u64,
    pub review: String,
    pub reviewer: String,
    pub reviewer_email: String,
    pub rating: u8,
}

impl ReviewPayload {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        if self.review.trim().chars().count() < MIN_REVIEW_CHARS {
            return Err(AppError::Validation(format!(
                "review must be at least {MIN_REVIEW_CHARS} characters"
            )));
        }
        if self.reviewer.trim().chars().count() < MIN_REVIEWER_CHARS {
            return Err(AppError::Validation(format!(
                "reviewer name must be at least {MIN_REVIEWER_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// `GET /api/v1/reviews?product=..&page=..`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<Review>>> {
    let reviews = state
        .store()
        .list_reviews(query.product, query.page)
        .await?;
    Ok(Json(reviews))
}

/// `POST /api/v1/reviews`
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<Review>> {
    payload.validate()?;

    let review = state
        .store()
        .create_review(&NewReview {
            product_id: payload.product_id,
            review: payload.review.trim().to_string(),
            reviewer: payload.reviewer.trim().to_string(),
            reviewer_email: payload.reviewer_email,
            rating: payload.rating,
            status: "approved".to_string(),
        })
        .await?;
    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(rating: u8, review: &str, reviewer: &str) -> ReviewPayload {
        ReviewPayload {
            product_id: 226,
            review: review.to_string(),
            reviewer: reviewer.to_string(),
            reviewer_email: "jane@example.com".to_string(),
            rating,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload(5, "A gripping read all round.", "Jane").validate().is_ok());
    }

    #[test]
    fn rating_bounds_enforced() {
        assert!(payload(0, "A gripping read all round.", "Jane").validate().is_err());
        assert!(payload(6, "A gripping read all round.", "Jane").validate().is_err());
    }

    #[test]
    fn short_review_rejected() {
        assert!(payload(4, "Nice", "Jane").validate().is_err());
    }

    #[test]
    fn whitespace_padding_does_not_satisfy_minimums() {
        assert!(payload(4, "   Nice    ", "Jane").validate().is_err());
        assert!(payload(4, "A gripping read all round.", " J ").validate().is_err());
    }
}
