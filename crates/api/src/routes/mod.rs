//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//!
//! # Catalog
//! GET  /api/v1/products               - Product listing (gated per viewer)
//! GET  /api/v1/products/library       - Products carrying gated content
//! GET  /api/v1/products/featured      - Featured products, gated meta stripped
//! GET  /api/v1/products/genres        - Product tags
//! GET  /api/v1/products/authors       - Distinct author names (?search=)
//! GET  /api/v1/products/{slug}        - Product detail
//!
//! # Orders
//! POST /api/v1/orders                 - Checkout: pending order + payment intent
//! GET  /api/v1/orders                 - Paginated order history
//! GET  /api/v1/orders/{id}            - One order, owner only
//!
//! # Reviews
//! GET  /api/v1/reviews                - Reviews for one product
//! POST /api/v1/reviews                - Submit a review
//!
//! # Auth
//! POST /api/v1/auth/login             - JWT login
//! GET  /api/v1/auth/me                - Current user
//! POST /api/v1/auth/register          - Self-service registration
//! POST /api/v1/auth/forgot-password   - Request a password reset
//! POST /api/v1/auth/reset-password    - Confirm a password reset
//!
//! # Users (requires auth)
//! PUT  /api/v1/users/profile          - Update profile fields
//! PUT  /api/v1/users/password         - Change password
//!
//! # Favorites (requires auth)
//! GET    /api/v1/favorites            - Favorited product records
//! POST   /api/v1/favorites/{id}       - Add a favorite
//! DELETE /api/v1/favorites/{id}       - Remove a favorite
//!
//! # Stripe Connect (requires auth)
//! GET  /api/v1/stripe/login           - Express dashboard login link
//!
//! # Webhooks
//! POST /webhooks/stripe               - Payment confirmation + settlement
//! ```

pub mod auth;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod stripe;
pub mod users;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/library", get(products::library))
        .route("/featured", get(products::featured))
        .route("/genres", get(products::genres))
        .route("/authors", get(products::authors))
        .route("/{slug}", get(products::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the user-profile routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", put(users::update_profile))
        .route("/password", put(users::change_password))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route(
            "/{product_id}",
            post(favorites::add).delete(favorites::remove),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/products", product_routes())
        .route("/orders", post(orders::create).get(orders::index))
        .route("/orders/{order_id}", get(orders::show))
        .route("/reviews", get(reviews::index).post(reviews::create))
        .route("/stripe/login", get(stripe::login))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/favorites", favorite_routes());

    Router::new()
        .nest("/api/v1", api)
        .route("/webhooks/stripe", post(webhooks::stripe))
}
