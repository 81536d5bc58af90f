//! Order Model

use serde::{Deserialize, Serialize};

use crate::order::{OrderAction, OrderStatus};

/// Payment mode chosen at checkout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Platform holds the funds until delivery is confirmed
    #[default]
    Escrow,
    /// Buyer pays the seller's wallet directly
    Direct,
}

/// One applied lifecycle transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub action: OrderAction,
    pub actor_id: i64,
    pub at: i64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub quantity: u32,
    pub total: f64,
    pub currency: String,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_token_id: Option<String>,
    /// Set once a dispute is opened on the order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_id: Option<i64>,
    /// Append-only transition log
    #[serde(default)]
    pub history: Vec<StatusChange>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_quantity() -> u32 {
    1
}

/// Checkout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub payment_mode: PaymentMode,
}

/// Lifecycle action request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActionRequest {
    pub action: OrderAction,
    /// Waybill number, required for `SHIP`
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// Expert report for `PASS_AUTHENTICATION` / `FAIL_AUTHENTICATION`
    #[serde(default)]
    pub report: Option<String>,
    /// Certificate token, required for `ISSUE_NFT`
    #[serde(default)]
    pub nft_token_id: Option<String>,
    /// Reason text for `OPEN_DISPUTE`
    #[serde(default)]
    pub reason: Option<String>,
}

impl OrderActionRequest {
    pub fn new(action: OrderAction) -> Self {
        Self {
            action,
            tracking_number: None,
            report: None,
            nft_token_id: None,
            reason: None,
        }
    }
}
