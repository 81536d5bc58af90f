//! Dispute Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    #[default]
    Open,
    Resolved,
}

/// Which side an admin ruled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeOutcome {
    Buyer,
    Seller,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeMessage {
    pub id: i64,
    pub sender_id: i64,
    pub text: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: i64,
    pub order_id: i64,
    pub opened_by: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: DisputeStatus,
    #[serde(default)]
    pub messages: Vec<DisputeMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<DisputeOutcome>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeMessageCreate {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeResolve {
    pub outcome: DisputeOutcome,
}
