//! Bid Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub product_id: i64,
    pub bidder_id: i64,
    pub amount: f64,
    pub created_at: i64,
}

/// Place bid payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBid {
    pub amount: f64,
}
