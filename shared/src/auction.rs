//! Auction bidding rules
//!
//! Pure checks over a [`Product`] snapshot. The server runs them inside the
//! same write transaction that stores the bid.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::Product;
use crate::money::{self, to_decimal};

/// Smallest allowed raise: 5% of the current bid, never below 1.0
pub fn min_increment(current: f64) -> f64 {
    let five_percent = to_decimal(current) * Decimal::new(5, 2);
    money::to_f64(five_percent.max(Decimal::ONE))
}

/// Lowest amount the next bid must reach
///
/// The starting price when nobody has bid yet.
pub fn min_next_bid(product: &Product) -> f64 {
    match product.current_bid {
        Some(current) if product.bid_count > 0 => {
            money::to_f64(to_decimal(current) + to_decimal(min_increment(current)))
        }
        _ => product.price,
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BidError {
    #[error("product is not an auction")]
    NotAuction,

    #[error("auction has ended")]
    Ended,

    #[error("cannot bid on your own listing")]
    OwnListing,

    #[error("bid amount must be a positive number")]
    InvalidAmount,

    #[error("bid must be at least {min_bid}")]
    TooLow { min_bid: f64 },
}

impl From<BidError> for AppError {
    fn from(err: BidError) -> Self {
        let code = match &err {
            BidError::NotAuction => ErrorCode::AuctionNotActive,
            BidError::Ended => ErrorCode::AuctionEnded,
            BidError::OwnListing => ErrorCode::BidOwnListing,
            BidError::InvalidAmount => ErrorCode::BidInvalidAmount,
            BidError::TooLow { .. } => ErrorCode::BidTooLow,
        };
        let app = AppError::with_message(code, err.to_string());
        match err {
            BidError::TooLow { min_bid } => app.with_detail("minBid", min_bid),
            _ => app,
        }
    }
}

/// Check a bid without changing anything
pub fn validate_bid(product: &Product, bidder_id: i64, amount: f64, now: i64) -> Result<(), BidError> {
    if !product.is_auction {
        return Err(BidError::NotAuction);
    }
    if product.auction_ends_at.is_some_and(|ends| now >= ends) {
        return Err(BidError::Ended);
    }
    if product.seller_id == bidder_id {
        return Err(BidError::OwnListing);
    }
    if !money::is_valid_amount(amount) {
        return Err(BidError::InvalidAmount);
    }
    let min_bid = min_next_bid(product);
    if to_decimal(amount) < to_decimal(min_bid) {
        return Err(BidError::TooLow { min_bid });
    }
    Ok(())
}

/// Validate and record a bid on the product snapshot
pub fn place_bid(
    product: &mut Product,
    bidder_id: i64,
    amount: f64,
    now: i64,
) -> Result<(), BidError> {
    validate_bid(product, bidder_id, amount, now)?;
    product.current_bid = Some(money::to_f64(to_decimal(amount)));
    product.bid_count += 1;
    product.updated_at = now;
    Ok(())
}
