//! Unified error codes for the CryptoCraft marketplace
//!
//! This module defines all error codes used across craft-server, craft-client and the frontend.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: User errors
//! - 4xxx: Order errors
//! - 5xxx: Dispute errors
//! - 6xxx: Product / category errors
//! - 7xxx: Auction errors
//! - 8xxx: Governance errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired
    SessionExpired = 1005,
    /// Telegram payload signature does not match
    TelegramSignatureInvalid = 1010,
    /// Telegram auth_date is too old
    TelegramAuthExpired = 1011,
    /// Telegram bot token is not configured on the server
    TelegramNotConfigured = 1012,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: User ====================
    /// User not found
    UserNotFound = 3001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already reached a terminal status
    OrderAlreadyClosed = 4003,
    /// Action is not allowed from the current order status
    OrderInvalidTransition = 4010,
    /// Shipping requires a tracking number
    OrderTrackingRequired = 4011,
    /// NFT issuance requires a token id
    OrderNftTokenRequired = 4012,
    /// Quantity must be positive
    OrderInvalidQuantity = 4013,
    /// Buyer and seller are the same user
    OrderOwnProduct = 4014,

    // ==================== 5xxx: Dispute ====================
    /// Dispute not found
    DisputeNotFound = 5001,
    /// Dispute has already been resolved
    DisputeAlreadyResolved = 5002,
    /// Dispute message is empty
    DisputeMessageEmpty = 5003,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Dynamic attributes do not satisfy the category schema
    ProductAttributesInvalid = 6004,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name duplicated among siblings
    CategoryNameDuplicate = 6103,
    /// Category tree is malformed
    CategoryTreeInvalid = 6104,

    // ==================== 7xxx: Auction ====================
    /// Product is not an auction listing
    AuctionNotActive = 7001,
    /// Auction has ended
    AuctionEnded = 7002,
    /// Bid is below the minimum next bid
    BidTooLow = 7003,
    /// Sellers cannot bid on their own listing
    BidOwnListing = 7004,
    /// Bid amount is not a positive finite number
    BidInvalidAmount = 7005,

    // ==================== 8xxx: Governance ====================
    /// Proposal not found
    ProposalNotFound = 8001,
    /// Proposal is closed for voting
    ProposalClosed = 8002,
    /// Proposal payload is invalid
    ProposalInvalid = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::TelegramSignatureInvalid => "Telegram signature is invalid",
            ErrorCode::TelegramAuthExpired => "Telegram authorization is outdated",
            ErrorCode::TelegramNotConfigured => "Telegram login is not configured",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // User
            ErrorCode::UserNotFound => "User not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyClosed => "Order is already closed",
            ErrorCode::OrderInvalidTransition => "Action is not allowed in the current order status",
            ErrorCode::OrderTrackingRequired => "Tracking number is required to ship",
            ErrorCode::OrderNftTokenRequired => "NFT token id is required",
            ErrorCode::OrderInvalidQuantity => "Quantity must be positive",
            ErrorCode::OrderOwnProduct => "Cannot buy your own product",

            // Dispute
            ErrorCode::DisputeNotFound => "Dispute not found",
            ErrorCode::DisputeAlreadyResolved => "Dispute has already been resolved",
            ErrorCode::DisputeMessageEmpty => "Message text is empty",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductAttributesInvalid => "Product attributes do not match the category",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameDuplicate => "Category name is duplicated among siblings",
            ErrorCode::CategoryTreeInvalid => "Category tree is invalid",

            // Auction
            ErrorCode::AuctionNotActive => "Product is not an auction",
            ErrorCode::AuctionEnded => "Auction has ended",
            ErrorCode::BidTooLow => "Bid is below the minimum allowed",
            ErrorCode::BidOwnListing => "Cannot bid on your own listing",
            ErrorCode::BidInvalidAmount => "Bid amount is invalid",

            // Governance
            ErrorCode::ProposalNotFound => "Proposal not found",
            ErrorCode::ProposalClosed => "Proposal is closed for voting",
            ErrorCode::ProposalInvalid => "Proposal is invalid",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1010 => Ok(ErrorCode::TelegramSignatureInvalid),
            1011 => Ok(ErrorCode::TelegramAuthExpired),
            1012 => Ok(ErrorCode::TelegramNotConfigured),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // User
            3001 => Ok(ErrorCode::UserNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyClosed),
            4010 => Ok(ErrorCode::OrderInvalidTransition),
            4011 => Ok(ErrorCode::OrderTrackingRequired),
            4012 => Ok(ErrorCode::OrderNftTokenRequired),
            4013 => Ok(ErrorCode::OrderInvalidQuantity),
            4014 => Ok(ErrorCode::OrderOwnProduct),

            // Dispute
            5001 => Ok(ErrorCode::DisputeNotFound),
            5002 => Ok(ErrorCode::DisputeAlreadyResolved),
            5003 => Ok(ErrorCode::DisputeMessageEmpty),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6004 => Ok(ErrorCode::ProductAttributesInvalid),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6103 => Ok(ErrorCode::CategoryNameDuplicate),
            6104 => Ok(ErrorCode::CategoryTreeInvalid),

            // Auction
            7001 => Ok(ErrorCode::AuctionNotActive),
            7002 => Ok(ErrorCode::AuctionEnded),
            7003 => Ok(ErrorCode::BidTooLow),
            7004 => Ok(ErrorCode::BidOwnListing),
            7005 => Ok(ErrorCode::BidInvalidAmount),

            // Governance
            8001 => Ok(ErrorCode::ProposalNotFound),
            8002 => Ok(ErrorCode::ProposalClosed),
            8003 => Ok(ErrorCode::ProposalInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
