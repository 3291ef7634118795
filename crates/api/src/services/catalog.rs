//! Catalog enrichment pipeline.
//!
//! Raw WooCommerce product payloads go through two independent
//! transformations before they reach a client: category references are
//! resolved into full `{id, name, image}` records (concurrent per
//! product, cached an hour), and gated meta entries are stripped for
//! users without entitlement (concurrent across the batch, input order
//! preserved).

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use inkwell_core::{Category, Product, ProductFilters, Tag};

use crate::cache::{ResponseCache, ttl};
use crate::error::Result;
use crate::services::EntitlementResolver;
use crate::woo::{CatalogApi, WooError};
use crate::wordpress::IdentityApi;

/// One distinct author name, in the object shape clients consume.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuthorEntry {
    pub name: String,
}

/// Products, enriched and entitlement-gated for a given viewer.
#[derive(Clone)]
pub struct CatalogService<C, I> {
    catalog: Arc<C>,
    identity: Arc<I>,
    entitlements: EntitlementResolver<C>,
    cache: ResponseCache,
}

impl<C: CatalogApi, I: IdentityApi> CatalogService<C, I> {
    pub fn new(catalog: Arc<C>, identity: Arc<I>, cache: ResponseCache) -> Self {
        let entitlements = EntitlementResolver::new(Arc::clone(&catalog), cache.clone());
        Self {
            catalog,
            identity,
            entitlements,
            cache,
        }
    }

    /// The entitlement resolver backing this pipeline.
    pub const fn entitlements(&self) -> &EntitlementResolver<C> {
        &self.entitlements
    }

    // =========================================================================
    // Category enrichment
    // =========================================================================

    /// Resolve one category reference, cache-first. Unresolved (404)
    /// categories answer `None` and are dropped by the caller; other
    /// failures are logged and treated the same so a flaky category
    /// endpoint cannot fail a product listing.
    async fn resolve_category(&self, id: u64) -> Option<Category> {
        let key = format!("category:{id}");
        if let Some(cached) = self.cache.get_as::<Category>(&key).await {
            return Some(cached);
        }

        match self.catalog.get_category(id).await {
            Ok(category) => {
                let enriched = Category {
                    id: category.id,
                    name: category.name,
                    image: category.image,
                };
                self.cache.set_as(&key, &enriched, ttl::CATEGORY).await;
                Some(enriched)
            }
            Err(WooError::NotFound(_)) => {
                debug!(category_id = id, "category no longer exists, dropping");
                None
            }
            Err(err) => {
                warn!(category_id = id, error = %err, "category fetch failed, dropping");
                None
            }
        }
    }

    /// Replace a product's category references with enriched records.
    /// All fetches for one product run concurrently; the result contains
    /// only successfully resolved categories, never placeholders.
    /// Idempotent: re-enriching hits the warm cache and never re-wraps.
    pub async fn enrich_categories(&self, mut product: Product) -> Product {
        if product.categories.is_empty() {
            return product;
        }

        let fetches = product
            .categories
            .iter()
            .map(|category| self.resolve_category(category.id));
        product.categories = join_all(fetches).await.into_iter().flatten().collect();
        product
    }

    async fn enrich_all(&self, products: Vec<Product>) -> Vec<Product> {
        join_all(products.into_iter().map(|p| self.enrich_categories(p))).await
    }

    // =========================================================================
    // Entitlement gating
    // =========================================================================

    /// Strip gated meta from products the viewer is not entitled to.
    ///
    /// Anonymous viewers never see gated fields; that path is pure and
    /// makes no remote calls. Authenticated viewers get one admin check
    /// plus a per-product purchase check, concurrent across the batch.
    /// Input order is preserved.
    pub async fn sanitize(&self, mut products: Vec<Product>, user_id: Option<u64>) -> Vec<Product> {
        let Some(user_id) = user_id else {
            for product in &mut products {
                product.strip_gated_meta();
            }
            return products;
        };

        if self.entitlements.is_admin(user_id).await {
            return products;
        }

        let checks = products.into_iter().map(|mut product| async move {
            if !self.entitlements.has_purchased(user_id, product.id).await {
                product.strip_gated_meta();
            }
            product
        });
        join_all(checks).await
    }

    async fn process(&self, products: Vec<Product>, user_id: Option<u64>) -> Vec<Product> {
        let enriched = self.enrich_all(products).await;
        self.sanitize(enriched, user_id).await
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Fetch a catalog page, enrich, and gate it for the viewer.
    pub async fn list_for_user(
        &self,
        user_id: Option<u64>,
        filters: &ProductFilters,
    ) -> Result<Vec<Product>> {
        let raw = self.catalog.list_products(filters).await?;
        Ok(self.process(raw, user_id).await)
    }

    /// The viewer's digital library: only products carrying the gated
    /// key. Membership is decided on the raw records, before
    /// sanitization strips the key from unentitled responses.
    pub async fn library_for_user(
        &self,
        user_id: Option<u64>,
        filters: &ProductFilters,
    ) -> Result<Vec<Product>> {
        let raw = self.catalog.list_products(filters).await?;
        let members: HashSet<u64> = raw
            .iter()
            .filter(|p| p.has_gated_content())
            .map(|p| p.id)
            .collect();

        let processed = self.process(raw, user_id).await;
        Ok(processed
            .into_iter()
            .filter(|p| members.contains(&p.id))
            .collect())
    }

    /// One product by unique slug, enriched and gated. With a token, a
    /// `favorite` flag is attached; a failed favorites lookup yields
    /// `false` rather than an error.
    pub async fn product_by_slug(
        &self,
        slug: &str,
        user_id: Option<u64>,
        token: Option<&str>,
    ) -> Result<Product> {
        let product = self.catalog.get_product(slug).await?;
        let mut processed = self.process(vec![product], user_id).await;
        // process() preserves length; guard anyway
        let mut product = processed
            .pop()
            .ok_or_else(|| crate::error::AppError::NotFound(format!("product '{slug}'")))?;

        if let Some(token) = token {
            let favorite = match self.identity.get_favorites(token).await {
                Ok(ids) => ids.contains(&product.id),
                Err(err) => {
                    warn!(slug, error = %err, "favorites lookup failed");
                    false
                }
            };
            product.favorite = Some(favorite);
        }

        Ok(product)
    }

    /// Products for the featured rail: no category enrichment, but
    /// gated meta is always stripped. The carousel response is shared
    /// across viewers, so it can never carry stream URLs.
    pub async fn featured(&self, filters: &ProductFilters) -> Result<Vec<Product>> {
        let mut products = self.catalog.list_products(filters).await?;
        for product in &mut products {
            product.strip_gated_meta();
        }
        Ok(products)
    }

    /// Every distinct author name across the catalog, title-cased and
    /// sorted, optionally narrowed to names containing `search`
    /// (case-insensitive).
    pub async fn all_authors(&self, search: Option<&str>) -> Result<Vec<AuthorEntry>> {
        let filters = ProductFilters {
            per_page: Some(100),
            ..ProductFilters::default()
        };
        let products = self.catalog.list_products(&filters).await?;

        let authors: BTreeSet<String> = products
            .iter()
            .flat_map(Product::author_names)
            .collect();

        let needle = search.map(str::to_lowercase);
        Ok(authors
            .into_iter()
            .filter(|name| {
                needle
                    .as_deref()
                    .is_none_or(|term| name.to_lowercase().contains(term))
            })
            .map(|name| AuthorEntry { name })
            .collect())
    }

    /// Product tags, used as genres by the storefront.
    pub async fn genres(&self) -> Result<Vec<Tag>> {
        Ok(self.catalog.get_tags().await?)
    }

    /// The viewer's favorited products, raw.
    pub async fn favorite_products(&self, token: &str) -> Result<Vec<Product>> {
        let ids = self.identity.get_favorites(token).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filters = ProductFilters {
            include: Some(ids),
            ..ProductFilters::default()
        };
        Ok(self.catalog.list_products(&filters).await?)
    }
}
