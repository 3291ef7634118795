//! Connected-account handlers.
//!
//! Authors reach their Stripe Express dashboard through a short-lived
//! login link minted against their connected account.

use axum::{Json, extract::State};

use inkwell_core::User;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::stripe::{LoginLink, PaymentsApi};

/// `GET /api/v1/stripe/login`
pub async fn login(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<LoginLink>> {
    let link = login_link_for(state.payments(), &current.user).await?;
    Ok(Json(link))
}

/// Mint a dashboard login link for the user's connected account, if
/// they have one.
async fn login_link_for<P: PaymentsApi>(payments: &P, user: &User) -> Result<LoginLink> {
    let account = user
        .stripe_account_id
        .as_deref()
        .ok_or_else(|| AppError::Validation("no connected Stripe account".to_string()))?;
    Ok(payments.create_login_link(account).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::testing::FakePayments;

    fn author(account: Option<&str>) -> User {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "stripe_account_id": account,
        }))
        .expect("user")
    }

    #[tokio::test]
    async fn author_with_account_gets_a_link() {
        let payments = FakePayments::default();
        let link = login_link_for(&payments, &author(Some("acct_123")))
            .await
            .expect("link");
        assert_eq!(link.url, "https://connect.stripe.com/express/acct_123");
        assert_eq!(payments.login_links(), vec!["acct_123".to_string()]);
    }

    #[tokio::test]
    async fn user_without_account_is_rejected() {
        let payments = FakePayments::default();
        let err = login_link_for(&payments, &author(None))
            .await
            .expect_err("rejected");
        assert!(matches!(err, AppError::Validation(_)));
        assert!(payments.login_links().is_empty());
    }

    #[tokio::test]
    async fn outage_maps_to_remote_unavailable() {
        let payments = FakePayments::default().with_outage();
        let err = login_link_for(&payments, &author(Some("acct_123")))
            .await
            .expect_err("outage");
        assert!(matches!(err, AppError::RemoteUnavailable(_)));
    }
}
