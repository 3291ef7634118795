//! WooCommerce REST API client.
//!
//! All calls carry service-level credentials (consumer key/secret via
//! basic auth), never end-user credentials. Pagination headers
//! (`X-WP-Total`, `X-WP-TotalPages`) are normalized into [`OrderPage`].
//!
//! [`CatalogApi`] is the seam the services program against; tests swap in
//! in-memory fakes.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use inkwell_core::{Category, Order, OrderStatus, Product, ProductFilters, Review, Tag, User};

use crate::config::WooConfig;

#[cfg(test)]
pub mod testing;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors from the WooCommerce gateway.
#[derive(Debug, Error)]
pub enum WooError {
    /// Network failure or timeout reaching the store.
    #[error("WooCommerce unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the request (4xx).
    #[error("WooCommerce rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not parse.
    #[error("WooCommerce parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One page of a customer's orders with normalized pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub data: Vec<Order>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub per_page: u32,
}

/// Payload for creating a pending order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    pub billing: inkwell_core::BillingInfo,
    pub line_items: Vec<NewLineItem>,
    pub customer_id: u64,
}

/// Line item in an order-create payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewLineItem {
    pub product_id: u64,
    pub quantity: u32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub sku: String,
}

/// Payload for creating a review.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub product_id: u64,
    pub review: String,
    pub reviewer: String,
    pub reviewer_email: String,
    pub rating: u8,
    pub status: String,
}

/// Catalog operations consumed by the services layer.
pub trait CatalogApi: Send + Sync {
    fn list_products(
        &self,
        filters: &ProductFilters,
    ) -> impl Future<Output = Result<Vec<Product>, WooError>> + Send;

    /// Fetch a single product by unique slug. `NotFound` on zero matches.
    fn get_product(&self, slug: &str) -> impl Future<Output = Result<Product, WooError>> + Send;

    fn get_category(&self, id: u64) -> impl Future<Output = Result<Category, WooError>> + Send;

    fn get_tags(&self) -> impl Future<Output = Result<Vec<Tag>, WooError>> + Send;

    fn create_order(&self, order: &NewOrder)
    -> impl Future<Output = Result<Order, WooError>> + Send;

    fn get_order(&self, id: u64) -> impl Future<Output = Result<Order, WooError>> + Send;

    fn update_order_status(
        &self,
        id: u64,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Order, WooError>> + Send;

    fn list_orders(
        &self,
        customer_id: u64,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<OrderPage, WooError>> + Send;

    /// All of a customer's orders in the given status, unpaginated.
    fn get_orders(
        &self,
        customer_id: u64,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Vec<Order>, WooError>> + Send;

    /// Customer record, including the version-dependent role field.
    fn get_customer(&self, user_id: u64) -> impl Future<Output = Result<User, WooError>> + Send;

    fn create_review(
        &self,
        review: &NewReview,
    ) -> impl Future<Output = Result<Review, WooError>> + Send;

    fn list_reviews(
        &self,
        product_id: u64,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Review>, WooError>> + Send;
}

/// WooCommerce REST client.
#[derive(Clone)]
pub struct WooClient {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl WooClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &WooConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.clone(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.expose_secret().to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, WooError> {
        let mut request = self
            .client
            .request(method, self.url(path))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WooError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WooError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            if status.is_client_error() {
                return Err(WooError::Rejected {
                    status: status.as_u16(),
                    message: message.chars().take(500).collect(),
                });
            }
            return Err(WooError::Unavailable(format!(
                "HTTP {status}: {}",
                message.chars().take(200).collect::<String>()
            )));
        }

        Ok(response)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T, WooError> {
        let response = self.send(method, path, query, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WooError::Unavailable(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl CatalogApi for WooClient {
    #[instrument(skip(self))]
    async fn list_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, WooError> {
        self.request(reqwest::Method::GET, "products", &filters.to_query(), None)
            .await
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn get_product(&self, slug: &str) -> Result<Product, WooError> {
        let query = vec![("slug".to_string(), slug.to_string())];
        let mut products: Vec<Product> = self
            .request(reqwest::Method::GET, "products", &query, None)
            .await?;
        if products.is_empty() {
            return Err(WooError::NotFound(format!("product '{slug}'")));
        }
        Ok(products.swap_remove(0))
    }

    #[instrument(skip(self))]
    async fn get_category(&self, id: u64) -> Result<Category, WooError> {
        self.request(
            reqwest::Method::GET,
            &format!("products/categories/{id}"),
            &[],
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_tags(&self) -> Result<Vec<Tag>, WooError> {
        self.request(reqwest::Method::GET, "products/tags", &[], None)
            .await
    }

    #[instrument(skip(self, order))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, WooError> {
        let body = serde_json::to_value(order)?;
        self.request(reqwest::Method::POST, "orders", &[], Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: u64) -> Result<Order, WooError> {
        self.request(reqwest::Method::GET, &format!("orders/{id}"), &[], None)
            .await
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, id: u64, status: OrderStatus) -> Result<Order, WooError> {
        let query = vec![("status".to_string(), status.as_str().to_string())];
        self.request(reqwest::Method::POST, &format!("orders/{id}"), &query, None)
            .await
    }

    #[instrument(skip(self))]
    async fn list_orders(
        &self,
        customer_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<OrderPage, WooError> {
        let query = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        let response = self.send(reqwest::Method::GET, "orders", &query, None).await?;

        let header_u64 = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0)
        };
        let total = header_u64("X-WP-Total");
        let total_pages = header_u64("X-WP-TotalPages");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WooError::Unavailable(e.to_string()))?;
        let data: Vec<Order> = serde_json::from_slice(&bytes)?;

        Ok(OrderPage {
            data,
            total,
            total_pages,
            current_page: page,
            per_page,
        })
    }

    #[instrument(skip(self))]
    async fn get_orders(
        &self,
        customer_id: u64,
        status: OrderStatus,
    ) -> Result<Vec<Order>, WooError> {
        let query = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("status".to_string(), status.as_str().to_string()),
        ];
        self.request(reqwest::Method::GET, "orders", &query, None)
            .await
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, user_id: u64) -> Result<User, WooError> {
        self.request(
            reqwest::Method::GET,
            &format!("customers/{user_id}"),
            &[],
            None,
        )
        .await
    }

    #[instrument(skip(self, review))]
    async fn create_review(&self, review: &NewReview) -> Result<Review, WooError> {
        let body = serde_json::to_value(review)?;
        self.request(reqwest::Method::POST, "products/reviews", &[], Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn list_reviews(&self, product_id: u64, page: u32) -> Result<Vec<Review>, WooError> {
        let query = vec![
            ("product".to_string(), product_id.to_string()),
            ("page".to_string(), page.to_string()),
        ];
        self.request(reqwest::Method::GET, "products/reviews", &query, None)
            .await
    }
}
