//! Order status and lifecycle actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
///
/// Main path: `PENDING → PAID → SHIPPED → DELIVERED → COMPLETED`.
/// Authentication path: `PAID → SHIPPED_TO_EXPERT → PENDING_AUTHENTICATION →
/// AUTHENTICATION_PASSED → NFT_ISSUED → SHIPPED`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Disputed,
    Completed,
    Cancelled,
    ShippedToExpert,
    PendingAuthentication,
    AuthenticationPassed,
    AuthenticationFailed,
    NftIssued,
    ResolvedBuyer,
    ResolvedSeller,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 14] = [
        Self::Pending,
        Self::Paid,
        Self::Shipped,
        Self::Delivered,
        Self::Disputed,
        Self::Completed,
        Self::Cancelled,
        Self::ShippedToExpert,
        Self::PendingAuthentication,
        Self::AuthenticationPassed,
        Self::AuthenticationFailed,
        Self::NftIssued,
        Self::ResolvedBuyer,
        Self::ResolvedSeller,
    ];

    /// No action is accepted once an order reaches a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::ResolvedBuyer | Self::ResolvedSeller
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Disputed => "DISPUTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::ShippedToExpert => "SHIPPED_TO_EXPERT",
            Self::PendingAuthentication => "PENDING_AUTHENTICATION",
            Self::AuthenticationPassed => "AUTHENTICATION_PASSED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::NftIssued => "NFT_ISSUED",
            Self::ResolvedBuyer => "RESOLVED_BUYER",
            Self::ResolvedSeller => "RESOLVED_SELLER",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action requested against an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    ConfirmPayment,
    /// Seller generates a waybill
    Ship,
    ConfirmDelivery,
    OpenDispute,
    Complete,
    Cancel,
    SendToExpert,
    BeginAuthentication,
    PassAuthentication,
    FailAuthentication,
    IssueNft,
    ResolveForBuyer,
    ResolveForSeller,
}

impl OrderAction {
    pub const ALL: [OrderAction; 13] = [
        Self::ConfirmPayment,
        Self::Ship,
        Self::ConfirmDelivery,
        Self::OpenDispute,
        Self::Complete,
        Self::Cancel,
        Self::SendToExpert,
        Self::BeginAuthentication,
        Self::PassAuthentication,
        Self::FailAuthentication,
        Self::IssueNft,
        Self::ResolveForBuyer,
        Self::ResolveForSeller,
    ];
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the wire name
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// How the acting user relates to the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Buyer,
    Seller,
    Admin,
}
