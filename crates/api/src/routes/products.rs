//! Product listing and detail handlers.
//!
//! Every read is served cache-first. Keys carry the canonical filter
//! JSON plus the viewer's id wherever gating or favorites make the
//! response user-specific; anonymous and per-user entries never collide.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;

use inkwell_core::ProductFilters;

use crate::cache::{response_cache_key, ttl};
use crate::error::Result;
use crate::middleware::OptionalUser;
use crate::state::AppState;

/// `GET /api/v1/products`
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Value>> {
    let filters = filters.or_defaults();
    let user_id = user.as_ref().map(|u| u.id());
    let key = response_cache_key(
        "products",
        Some(&filters.canonical_json()),
        None,
        user_id,
    );
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let products = state.catalog().list_for_user(user_id, &filters).await?;
    let body = serde_json::to_value(products)?;
    state.cache().set(&key, body.clone(), ttl::PRODUCTS).await;
    Ok(Json(body))
}

/// `GET /api/v1/products/library`
pub async fn library(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Value>> {
    let filters = filters.or_defaults();
    let user_id = user.as_ref().map(|u| u.id());
    let key = response_cache_key(
        "library_products",
        Some(&filters.canonical_json()),
        None,
        user_id,
    );
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let products = state.catalog().library_for_user(user_id, &filters).await?;
    let body = serde_json::to_value(products)?;
    state.cache().set(&key, body.clone(), ttl::LIBRARY).await;
    Ok(Json(body))
}

/// `GET /api/v1/products/featured`
pub async fn featured(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Value>> {
    let filters = ProductFilters {
        featured: Some(true),
        ..filters.or_defaults()
    };
    let key = response_cache_key(
        "featured_products",
        Some(&filters.canonical_json()),
        None,
        None,
    );
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let products = state.catalog().featured(&filters).await?;
    let body = serde_json::to_value(products)?;
    state.cache().set(&key, body.clone(), ttl::FEATURED).await;
    Ok(Json(body))
}

/// `GET /api/v1/products/genres`
pub async fn genres(State(state): State<AppState>) -> Result<Json<Value>> {
    let key = response_cache_key("genres", None, None, None);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let tags = state.catalog().genres().await?;
    let body = serde_json::to_value(tags)?;
    state.cache().set(&key, body.clone(), ttl::GENRES).await;
    Ok(Json(body))
}

/// Narrows the author list to names containing the term.
#[derive(Debug, serde::Deserialize)]
pub struct AuthorsQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// `GET /api/v1/products/authors`
pub async fn authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorsQuery>,
) -> Result<Json<Value>> {
    let search = query.search.as_deref().filter(|term| !term.is_empty());
    let key = response_cache_key("authors", Some(search.unwrap_or("all")), None, None);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let authors = state.catalog().all_authors(search).await?;
    let body = serde_json::to_value(authors)?;
    state.cache().set(&key, body.clone(), ttl::AUTHORS).await;
    Ok(Json(body))
}

/// `GET /api/v1/products/{slug}`
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let user_id = user.as_ref().map(|u| u.id());
    let key = response_cache_key("product", None, Some(&slug), user_id);
    if let Some(cached) = state.cache().get(&key).await {
        return Ok(Json(cached));
    }

    let token = user.as_ref().map(|u| u.token.as_str());
    let product = state.catalog().product_by_slug(&slug, user_id, token).await?;
    let body = serde_json::to_value(product)?;
    state
        .cache()
        .set(&key, body.clone(), ttl::SINGLE_PRODUCT)
        .await;
    Ok(Json(body))
}
