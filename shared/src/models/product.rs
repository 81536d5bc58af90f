//! Product Model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed attribute value after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// Clean dynamic attribute map keyed by resolved field name, in field order
pub type DynamicAttributes = IndexMap<String, AttributeValue>;

/// Raw attributes as submitted by forms or AI extraction (keyed by name or label)
pub type RawAttributes = Map<String, Value>;

/// Product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub currency: String,
    /// Category name within the schema tree
    pub category: String,
    #[serde(default)]
    pub dynamic_attributes: DynamicAttributes,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_auction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_ends_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bid: Option<f64>,
    #[serde(default)]
    pub bid_count: u32,
    /// High-value goods routed through expert authentication
    #[serde(default)]
    pub requires_authentication: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_currency() -> String {
    "USDT".to_string()
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category: String,
    #[serde(default)]
    pub dynamic_attributes: RawAttributes,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_auction: bool,
    pub auction_ends_at: Option<i64>,
    #[serde(default)]
    pub requires_authentication: bool,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub dynamic_attributes: Option<RawAttributes>,
    pub images: Option<Vec<String>>,
    pub auction_ends_at: Option<i64>,
    pub requires_authentication: Option<bool>,
}

/// Product list filter (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub seller_id: Option<i64>,
    pub auctions_only: Option<bool>,
}

/// Wishlist toggle result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggle {
    pub product_id: i64,
    pub in_wishlist: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_value_is_untagged() {
        let mut attrs = DynamicAttributes::new();
        attrs.insert("screen_size".into(), AttributeValue::Number(6.1));
        attrs.insert("brand".into(), AttributeValue::Text("Apple".into()));
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"screen_size":6.1,"brand":"Apple"}"#);

        let back: DynamicAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), ["screen_size", "brand"]);
    }

    #[test]
    fn create_payload_defaults() {
        let payload: ProductCreate = serde_json::from_str(
            r#"{"title":"iPhone 15","price":900,"category":"Смартфоны"}"#,
        )
        .unwrap();
        assert_eq!(payload.currency, "USDT");
        assert!(payload.dynamic_attributes.is_empty());
        assert!(!payload.is_auction);
    }
}
