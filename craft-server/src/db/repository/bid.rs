//! Bid Repository

use crate::db::Storage;
use crate::db::storage::PRODUCTS_TABLE;
use shared::auction;
use shared::error::{AppError, ErrorCode};
use shared::models::{Bid, Product};
use shared::util::snowflake_id;

use super::{RepoResult, found};

#[derive(Clone)]
pub struct BidRepository {
    storage: Storage,
}

impl BidRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Bids on a product, oldest first
    pub fn list(&self, product_id: i64) -> RepoResult<Vec<Bid>> {
        let mut bids: Vec<Bid> = self.storage.bids_for_product(product_id)?;
        bids.sort_by_key(|b| (b.created_at, b.id));
        Ok(bids)
    }

    /// Highest accepted bid
    pub fn leading(&self, product_id: i64) -> RepoResult<Option<Bid>> {
        Ok(self
            .list(product_id)?
            .into_iter()
            .max_by(|a, b| a.amount.total_cmp(&b.amount)))
    }

    /// Check and record a bid; the product's `currentBid`/`bidCount` move in
    /// the same transaction.
    pub fn place(&self, product_id: i64, bidder_id: i64, amount: f64, now: i64) -> RepoResult<Bid> {
        let txn = self.storage.begin_write()?;
        let mut product = found(
            self.storage.get_txn::<Product>(&txn, PRODUCTS_TABLE, product_id)?,
            ErrorCode::ProductNotFound,
        )?;

        auction::place_bid(&mut product, bidder_id, amount, now).map_err(AppError::from)?;

        let bid = Bid {
            id: snowflake_id(),
            product_id,
            bidder_id,
            amount: product.current_bid.unwrap_or(amount),
            created_at: now,
        };
        self.storage.put(&txn, PRODUCTS_TABLE, product_id, &product)?;
        self.storage.put_bid(&txn, product_id, bid.id, &bid)?;
        txn.commit()?;

        tracing::info!(product_id, bidder_id, amount = bid.amount, bid_count = product.bid_count, "Bid placed");
        Ok(bid)
    }
}
