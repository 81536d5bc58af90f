//! Wishlist Repository

use crate::db::Storage;
use crate::db::storage::PRODUCTS_TABLE;
use shared::error::ErrorCode;
use shared::models::{Product, WishlistToggle};

use super::{RepoResult, found};

#[derive(Clone)]
pub struct WishlistRepository {
    storage: Storage,
}

impl WishlistRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Add the product if absent, remove it otherwise
    pub fn toggle(&self, user_id: i64, product_id: i64) -> RepoResult<WishlistToggle> {
        let txn = self.storage.begin_write()?;
        found(
            self.storage.get_txn::<Product>(&txn, PRODUCTS_TABLE, product_id)?,
            ErrorCode::ProductNotFound,
        )?;
        let in_wishlist = self.storage.toggle_wishlist(&txn, user_id, product_id)?;
        txn.commit()?;
        Ok(WishlistToggle {
            product_id,
            in_wishlist,
        })
    }

    /// Saved product ids
    pub fn list(&self, user_id: i64) -> RepoResult<Vec<i64>> {
        Ok(self.storage.wishlist(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::AppError;
    use shared::models::DynamicAttributes;

    #[test]
    fn toggle_twice_removes() {
        let storage = Storage::open_in_memory().unwrap();
        let product = Product {
            id: 9,
            seller_id: 1,
            title: "Nintendo Switch OLED".into(),
            description: String::new(),
            price: 320.0,
            currency: "USDT".into(),
            category: "Консоли".into(),
            dynamic_attributes: DynamicAttributes::new(),
            images: vec![],
            is_auction: false,
            auction_ends_at: None,
            current_bid: None,
            bid_count: 0,
            requires_authentication: false,
            created_at: 0,
            updated_at: 0,
        };
        let txn = storage.begin_write().unwrap();
        storage.put(&txn, PRODUCTS_TABLE, product.id, &product).unwrap();
        txn.commit().unwrap();

        let repo = WishlistRepository::new(storage);
        assert!(repo.toggle(2, 9).unwrap().in_wishlist);
        assert_eq!(repo.list(2).unwrap(), vec![9]);
        assert!(!repo.toggle(2, 9).unwrap().in_wishlist);
        assert!(repo.list(2).unwrap().is_empty());

        let err = repo.toggle(2, 404).unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::ProductNotFound);
    }
}
