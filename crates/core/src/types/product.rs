//! Product and category types mirroring the WooCommerce REST payloads.
//!
//! Only the fields Inkwell reads are modeled; everything else WooCommerce
//! sends is preserved verbatim in `extra` so responses can be proxied
//! without data loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Meta key holding the gated ebook stream URL.
///
/// Visible only to administrators and to customers who purchased the
/// product; stripped from every other response.
pub const EBOOK_STREAM_URL_KEY: &str = "_ebook_stream_url";

/// Meta key on a line item naming the Stripe connected account that
/// receives this item's revenue share.
pub const RECIPIENT_META_KEY: &str = "author_stripe_id";

/// Meta key holding the comma/ampersand separated author name list.
pub const AUTHOR_META_KEY: &str = "author";

/// A single WooCommerce meta data entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: serde_json::Value,
}

impl MetaEntry {
    /// The entry value as a string, if it is one.
    #[must_use]
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// A product category.
///
/// WooCommerce embeds bare references (`id` plus a slug) in product
/// payloads; the enrichment pipeline replaces them with the full
/// `{id, name, image}` shape. `name`/`image` being `None` marks an
/// unenriched reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Category {
    /// Whether this category already carries its enriched fields.
    #[must_use]
    pub const fn is_enriched(&self) -> bool {
        self.name.is_some()
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
    /// `true` once a favorites lookup confirmed membership. Absent from
    /// responses unless a token was supplied on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    /// Fields we do not interpret, proxied through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Product {
    /// Look up a meta value by key.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Whether this product carries a gated ebook stream URL.
    #[must_use]
    pub fn has_gated_content(&self) -> bool {
        self.meta(EBOOK_STREAM_URL_KEY).is_some()
    }

    /// Remove every gated meta entry from this product.
    pub fn strip_gated_meta(&mut self) {
        self.meta_data
            .retain(|entry| entry.key != EBOOK_STREAM_URL_KEY);
    }

    /// Author names from the `author` meta entry, split on `,` and `&`.
    #[must_use]
    pub fn author_names(&self) -> Vec<String> {
        let Some(raw) = self.meta(AUTHOR_META_KEY).and_then(|v| v.as_str()) else {
            return Vec::new();
        };
        raw.split([',', '&'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(title_case)
            .collect()
    }
}

/// Title-case a name: first letter of each whitespace-separated word
/// uppercased, the rest lowercased.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A product tag (used as a genre in the storefront).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(key: &str, value: &str) -> MetaEntry {
        MetaEntry {
            key: key.to_string(),
            value: serde_json::Value::String(value.to_string()),
        }
    }

    fn product_with_meta(entries: Vec<MetaEntry>) -> Product {
        Product {
            id: 1,
            slug: "test".to_string(),
            name: "Test".to_string(),
            status: "publish".to_string(),
            categories: Vec::new(),
            meta_data: entries,
            favorite: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn strip_gated_meta_removes_only_gated_key() {
        let mut product = product_with_meta(vec![
            meta(EBOOK_STREAM_URL_KEY, "https://cdn.example/stream/1"),
            meta(AUTHOR_META_KEY, "Jane Doe"),
        ]);
        product.strip_gated_meta();
        assert!(!product.has_gated_content());
        assert!(product.meta(AUTHOR_META_KEY).is_some());
    }

    #[test]
    fn author_names_split_on_comma_and_ampersand() {
        let product = product_with_meta(vec![meta(AUTHOR_META_KEY, "jane doe, JOHN SMITH & ada")]);
        assert_eq!(
            product.author_names(),
            vec!["Jane Doe", "John Smith", "Ada"]
        );
    }

    #[test]
    fn author_names_empty_without_meta() {
        let product = product_with_meta(Vec::new());
        assert!(product.author_names().is_empty());
    }

    #[test]
    fn category_reference_roundtrip_preserves_enrichment_state() {
        let raw: Category = serde_json::from_str(r#"{"id": 12}"#).expect("parse");
        assert!(!raw.is_enriched());

        let enriched: Category =
            serde_json::from_str(r#"{"id": 12, "name": "Sci-Fi", "image": "https://x/img.png"}"#)
                .expect("parse");
        assert!(enriched.is_enriched());
    }

    #[test]
    fn unknown_product_fields_are_preserved() {
        let json = r#"{"id": 7, "slug": "book", "price": "12.00", "featured": true}"#;
        let product: Product = serde_json::from_str(json).expect("parse");
        assert_eq!(product.extra.get("price"), Some(&serde_json::json!("12.00")));

        let out = serde_json::to_value(&product).expect("serialize");
        assert_eq!(out["featured"], serde_json::json!(true));
    }
}
