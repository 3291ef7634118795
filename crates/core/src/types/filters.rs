//! Product listing filters, WooCommerce query-parameter compatible.

use serde::{Deserialize, Serialize};

/// Filters accepted on product listing endpoints.
///
/// Serializes to WooCommerce REST query parameters; `None` fields are
/// dropped. `canonical_json` gives a deterministic representation for
/// cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            orderby: Some("date".to_string()),
            order: Some("desc".to_string()),
            per_page: Some(10),
            page: Some(1),
            status: Some("publish".to_string()),
            include: None,
            exclude: None,
            slug: None,
            featured: None,
        }
    }
}

impl ProductFilters {
    /// Fill unset fields from the store defaults. Deserialized query
    /// strings leave omitted fields `None`; the catalog expects the
    /// published-only, newest-first conventions unless overridden.
    #[must_use]
    pub fn or_defaults(self) -> Self {
        let defaults = Self::default();
        Self {
            orderby: self.orderby.or(defaults.orderby),
            order: self.order.or(defaults.order),
            per_page: self.per_page.or(defaults.per_page),
            page: self.page.or(defaults.page),
            status: self.status.or(defaults.status),
            ..self
        }
    }

    /// Query parameters for the catalog gateway. `include`/`exclude` are
    /// comma-joined per the WooCommerce convention.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        };
        push("category", self.category.clone());
        push("search", self.search.clone());
        push("orderby", self.orderby.clone());
        push("order", self.order.clone());
        push("per_page", self.per_page.map(|v| v.to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("status", self.status.clone());
        push("include", self.include.as_ref().map(|ids| join_ids(ids)));
        push("exclude", self.exclude.as_ref().map(|ids| join_ids(ids)));
        push("slug", self.slug.clone());
        push("featured", self.featured.map(|v| v.to_string()));
        params
    }

    /// Deterministic JSON form for cache keys: serde_json maps preserve
    /// struct field order, so serialize through a `BTreeMap` to sort keys.
    #[must_use]
    pub fn canonical_json(&self) -> String {
        let value = serde_json::to_value(self).unwrap_or_default();
        let sorted: std::collections::BTreeMap<String, serde_json::Value> = match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => std::collections::BTreeMap::new(),
        };
        serde_json::to_string(&sorted).unwrap_or_default()
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
