//! In-memory [`CatalogApi`] fake for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use inkwell_core::{Category, Order, OrderStatus, Product, ProductFilters, Review, Tag, User};

use super::{CatalogApi, NewOrder, NewReview, OrderPage, WooError};

#[derive(Default)]
struct State {
    outage: bool,
    update_failure: bool,
    products: Vec<Product>,
    categories: HashMap<u64, Category>,
    tags: Vec<Tag>,
    customers: HashMap<u64, User>,
    customer_orders: HashMap<u64, Vec<Order>>,
    orders_by_id: HashMap<u64, Order>,
    status_updates: Vec<(u64, OrderStatus)>,
    reviews: Vec<Review>,
    next_id: u64,
    calls: HashMap<&'static str, usize>,
}

/// Configurable catalog fake. Clones share state, so a test can hold one
/// handle for assertions while the service owns another.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<State>>,
}

impl FakeCatalog {
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state.lock().unwrap().products = products;
        self
    }

    #[must_use]
    pub fn with_category(self, id: u64, name: &str, image: Option<&str>) -> Self {
        self.state.lock().unwrap().categories.insert(
            id,
            Category {
                id,
                name: Some(name.to_string()),
                image: image.map(ToString::to_string),
            },
        );
        self
    }

    /// Readability alias: unknown categories already answer `NotFound`.
    #[must_use]
    pub fn with_missing_category(self, id: u64) -> Self {
        self.state.lock().unwrap().categories.remove(&id);
        self
    }

    #[must_use]
    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.state.lock().unwrap().tags = tags;
        self
    }

    #[must_use]
    pub fn with_customer(self, id: u64, roles: &[&str]) -> Self {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": id,
            "username": format!("user{id}"),
            "roles": roles,
        }))
        .expect("user fixture");
        self.state.lock().unwrap().customers.insert(id, user);
        self
    }

    #[must_use]
    pub fn with_admin(self, id: u64) -> Self {
        self.with_customer(id, &["administrator"])
    }

    /// Seed a customer's order history (any status).
    #[must_use]
    pub fn with_orders(self, customer_id: u64, orders: Vec<Order>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for order in &orders {
                state.orders_by_id.insert(order.id, order.clone());
            }
            state
                .customer_orders
                .entry(customer_id)
                .or_default()
                .extend(orders);
        }
        self
    }

    /// Seed a standalone order, fetchable by id.
    #[must_use]
    pub fn with_order(self, order: Order) -> Self {
        self.state
            .lock()
            .unwrap()
            .orders_by_id
            .insert(order.id, order);
        self
    }

    /// Every call answers `Unavailable`.
    #[must_use]
    pub fn with_outage(self) -> Self {
        self.state.lock().unwrap().outage = true;
        self
    }

    /// `update_order_status` fails while everything else works.
    #[must_use]
    pub fn with_update_failure(self) -> Self {
        self.state.lock().unwrap().update_failure = true;
        self
    }

    /// Number of invocations of the named trait method.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        *self.state.lock().unwrap().calls.get(method).unwrap_or(&0)
    }

    /// Status transitions applied through `update_order_status`, in order.
    #[must_use]
    pub fn status_updates(&self) -> Vec<(u64, OrderStatus)> {
        self.state.lock().unwrap().status_updates.clone()
    }

    fn record(&self, method: &'static str) -> Result<(), WooError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method).or_insert(0) += 1;
        if state.outage {
            return Err(WooError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

impl CatalogApi for FakeCatalog {
    async fn list_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, WooError> {
        self.record("list_products")?;
        let state = self.state.lock().unwrap();
        let products = state
            .products
            .iter()
            .filter(|p| {
                filters
                    .include
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&p.id))
            })
            .filter(|p| filters.slug.as_ref().is_none_or(|slug| &p.slug == slug))
            .cloned()
            .collect();
        Ok(products)
    }

    async fn get_product(&self, slug: &str) -> Result<Product, WooError> {
        self.record("get_product")?;
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| WooError::NotFound(format!("product '{slug}'")))
    }

    async fn get_category(&self, id: u64) -> Result<Category, WooError> {
        self.record("get_category")?;
        let state = self.state.lock().unwrap();
        state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| WooError::NotFound(format!("category {id}")))
    }

    async fn get_tags(&self) -> Result<Vec<Tag>, WooError> {
        self.record("get_tags")?;
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, WooError> {
        self.record("create_order")?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = 9000 + state.next_id;

        let total: rust_decimal::Decimal = order.line_items.iter().map(|item| item.total).sum();
        let created: Order = serde_json::from_value(serde_json::json!({
            "id": id,
            "status": "pending",
            "total": total.to_string(),
            "currency": "USD",
            "billing": order.billing,
            "line_items": order.line_items.iter().map(|item| serde_json::json!({
                "product_id": item.product_id,
                "quantity": item.quantity,
                "name": item.name,
                "total": item.total.to_string(),
                "sku": item.sku,
            })).collect::<Vec<_>>(),
            "customer_id": order.customer_id,
            "payment_method": order.payment_method,
            "payment_method_title": order.payment_method_title,
        }))?;

        state.orders_by_id.insert(id, created.clone());
        state
            .customer_orders
            .entry(order.customer_id)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: u64) -> Result<Order, WooError> {
        self.record("get_order")?;
        let state = self.state.lock().unwrap();
        state
            .orders_by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| WooError::NotFound(format!("order {id}")))
    }

    async fn update_order_status(&self, id: u64, status: OrderStatus) -> Result<Order, WooError> {
        self.record("update_order_status")?;
        let mut state = self.state.lock().unwrap();
        if state.update_failure {
            return Err(WooError::Unavailable("simulated update failure".to_string()));
        }
        state.status_updates.push((id, status));
        let order = state
            .orders_by_id
            .get_mut(&id)
            .ok_or_else(|| WooError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn list_orders(
        &self,
        customer_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<OrderPage, WooError> {
        self.record("list_orders")?;
        let state = self.state.lock().unwrap();
        let all = state
            .customer_orders
            .get(&customer_id)
            .cloned()
            .unwrap_or_default();
        let total = all.len() as u64;
        let total_pages = total.div_ceil(u64::from(per_page.max(1)));
        let start = (page.saturating_sub(1) * per_page) as usize;
        let data = all
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Ok(OrderPage {
            data,
            total,
            total_pages,
            current_page: page,
            per_page,
        })
    }

    async fn get_orders(
        &self,
        customer_id: u64,
        status: OrderStatus,
    ) -> Result<Vec<Order>, WooError> {
        self.record("get_orders")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .customer_orders
            .get(&customer_id)
            .map(|orders| {
                orders
                    .iter()
                    .filter(|order| order.status == status)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_customer(&self, user_id: u64) -> Result<User, WooError> {
        self.record("get_customer")?;
        let state = self.state.lock().unwrap();
        state
            .customers
            .get(&user_id)
            .cloned()
            .ok_or_else(|| WooError::NotFound(format!("customer {user_id}")))
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, WooError> {
        self.record("create_review")?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Review {
            id: state.next_id,
            product_id: review.product_id,
            status: review.status.clone(),
            reviewer: review.reviewer.clone(),
            reviewer_email: review.reviewer_email.clone(),
            review: review.review.clone(),
            rating: review.rating,
            date_created: None,
        };
        state.reviews.push(created.clone());
        Ok(created)
    }

    async fn list_reviews(&self, product_id: u64, _page: u32) -> Result<Vec<Review>, WooError> {
        self.record("list_reviews")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }
}
