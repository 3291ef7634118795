//! Favorites handlers.
//!
//! The favorites list lives in WordPress; this surface resolves the ids
//! into product records via the catalog gateway.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use inkwell_core::Product;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::wordpress::IdentityApi;

#[derive(Debug, Serialize)]
pub struct FavoriteIds {
    pub favorites: Vec<u64>,
}

/// `GET /api/v1/favorites`
pub async fn index(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().favorite_products(&current.token).await?;
    Ok(Json(products))
}

/// `POST /api/v1/favorites/{product_id}`
pub async fn add(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(product_id): Path<u64>,
) -> Result<Json<FavoriteIds>> {
    let favorites = state
        .identity()
        .add_favorite(&current.token, product_id)
        .await?;
    Ok(Json(FavoriteIds { favorites }))
}

/// `DELETE /api/v1/favorites/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(product_id): Path<u64>,
) -> Result<Json<FavoriteIds>> {
    let favorites = state
        .identity()
        .remove_favorite(&current.token, product_id)
        .await?;
    Ok(Json(FavoriteIds { favorites }))
}
