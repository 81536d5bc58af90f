//! redb-based storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `users` | user id | `User` | Profiles |
//! | `telegram_users` | telegram id | user id | Sign-in lookup |
//! | `category_tree` | `"tree"` | `Vec<CategorySchema>` | Category forest |
//! | `products` | product id | `Product` | Listings |
//! | `bids` | `(product_id, bid_id)` | `Bid` | Auction bids |
//! | `orders` | order id | `Order` | Orders with status history |
//! | `disputes` | dispute id | `Dispute` | Disputes with messages |
//! | `proposals` | proposal id | `Proposal` | DAO proposals with votes |
//! | `wishlist` | `(user_id, product_id)` | `()` | Wishlist membership |
//!
//! Values are JSON. redb serializes write transactions, so a
//! read-check-write inside one [`WriteTransaction`] is atomic.

use std::path::Path;
use std::sync::Arc;

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use shared::error::AppError;

/// JSON document keyed by snowflake id
pub type JsonTable = TableDefinition<'static, i64, &'static [u8]>;

pub const USERS_TABLE: JsonTable = TableDefinition::new("users");
pub const PRODUCTS_TABLE: JsonTable = TableDefinition::new("products");
pub const ORDERS_TABLE: JsonTable = TableDefinition::new("orders");
pub const DISPUTES_TABLE: JsonTable = TableDefinition::new("disputes");
pub const PROPOSALS_TABLE: JsonTable = TableDefinition::new("proposals");

/// Telegram id → user id
pub const TELEGRAM_USERS_TABLE: TableDefinition<i64, i64> = TableDefinition::new("telegram_users");

/// Single-row table holding the whole category forest
pub const CATEGORY_TREE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("category_tree");
pub const CATEGORY_TREE_KEY: &str = "tree";

/// (product_id, bid_id) → Bid
pub const BIDS_TABLE: TableDefinition<(i64, i64), &[u8]> = TableDefinition::new("bids");

/// (user_id, product_id) → ()
pub const WISHLIST_TABLE: TableDefinition<(i64, i64), ()> = TableDefinition::new("wishlist");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::database(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Marketplace storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for table in [
                USERS_TABLE,
                PRODUCTS_TABLE,
                ORDERS_TABLE,
                DISPUTES_TABLE,
                PROPOSALS_TABLE,
            ] {
                let _ = write_txn.open_table(table)?;
            }
            let _ = write_txn.open_table(TELEGRAM_USERS_TABLE)?;
            let _ = write_txn.open_table(CATEGORY_TREE_TABLE)?;
            let _ = write_txn.open_table(BIDS_TABLE)?;
            let _ = write_txn.open_table(WISHLIST_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== JSON documents ==========

    /// Read one document
    pub fn get<T: DeserializeOwned>(&self, table: JsonTable, id: i64) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        decode_row(&table, id)
    }

    /// Read one document (within transaction)
    pub fn get_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        table: JsonTable,
        id: i64,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(table)?;
        decode_row(&table, id)
    }

    /// Insert or replace one document
    pub fn put<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        table: JsonTable,
        id: i64,
        value: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(table)?;
        let bytes = serde_json::to_vec(value)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    /// Remove one document, returning whether it existed
    pub fn remove(&self, txn: &WriteTransaction, table: JsonTable, id: i64) -> StorageResult<bool> {
        let mut table = txn.open_table(table)?;
        let existed = table.remove(id)?.is_some();
        Ok(existed)
    }

    /// Every document in key order
    pub fn list<T: DeserializeOwned>(&self, table: JsonTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut rows = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            rows.push(serde_json::from_slice(value.value())?);
        }
        Ok(rows)
    }

    pub fn count(&self, table: JsonTable) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        Ok(table.len()?)
    }

    // ========== Telegram index ==========

    pub fn user_id_for_telegram_txn(
        &self,
        txn: &WriteTransaction,
        telegram_id: i64,
    ) -> StorageResult<Option<i64>> {
        let table = txn.open_table(TELEGRAM_USERS_TABLE)?;
        Ok(table.get(telegram_id)?.map(|g| g.value()))
    }

    pub fn link_telegram(
        &self,
        txn: &WriteTransaction,
        telegram_id: i64,
        user_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(TELEGRAM_USERS_TABLE)?;
        table.insert(telegram_id, user_id)?;
        Ok(())
    }

    // ========== Category tree ==========

    pub fn get_category_tree<T: DeserializeOwned + Default>(&self) -> StorageResult<T> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CATEGORY_TREE_TABLE)?;
        match table.get(CATEGORY_TREE_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(T::default()),
        }
    }

    pub fn put_category_tree<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        tree: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(CATEGORY_TREE_TABLE)?;
        let bytes = serde_json::to_vec(tree)?;
        table.insert(CATEGORY_TREE_KEY, bytes.as_slice())?;
        Ok(())
    }

    // ========== Bids ==========

    pub fn put_bid<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        product_id: i64,
        bid_id: i64,
        bid: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(BIDS_TABLE)?;
        let bytes = serde_json::to_vec(bid)?;
        table.insert((product_id, bid_id), bytes.as_slice())?;
        Ok(())
    }

    /// Bids for one product in insertion (id) order
    pub fn bids_for_product<T: DeserializeOwned>(&self, product_id: i64) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BIDS_TABLE)?;

        let mut bids = Vec::new();
        for result in table.range((product_id, i64::MIN)..=(product_id, i64::MAX))? {
            let (_key, value) = result?;
            bids.push(serde_json::from_slice(value.value())?);
        }
        Ok(bids)
    }

    /// Drop every bid of a product
    pub fn remove_bids(&self, txn: &WriteTransaction, product_id: i64) -> StorageResult<u64> {
        let mut table = txn.open_table(BIDS_TABLE)?;
        let keys = table
            .range((product_id, i64::MIN)..=(product_id, i64::MAX))?
            .map(|entry| entry.map(|(key, _)| key.value()))
            .collect::<Result<Vec<_>, _>>()?;
        let removed = keys.len() as u64;
        for key in keys {
            table.remove(key)?;
        }
        Ok(removed)
    }

    // ========== Wishlist ==========

    /// Flip membership, returning the new state
    pub fn toggle_wishlist(
        &self,
        txn: &WriteTransaction,
        user_id: i64,
        product_id: i64,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(WISHLIST_TABLE)?;
        if table.remove((user_id, product_id))?.is_some() {
            return Ok(false);
        }
        table.insert((user_id, product_id), ())?;
        Ok(true)
    }

    pub fn wishlist(&self, user_id: i64) -> StorageResult<Vec<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WISHLIST_TABLE)?;

        let mut ids = Vec::new();
        for result in table.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
            let (key, _) = result?;
            ids.push(key.value().1);
        }
        Ok(ids)
    }
}

fn decode_row<T: DeserializeOwned>(
    table: &impl ReadableTable<i64, &'static [u8]>,
    id: i64,
) -> StorageResult<Option<T>> {
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
    }

    #[test]
    fn document_crud() {
        let storage = Storage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .put(&txn, USERS_TABLE, 7, &Doc { name: "anna".into() })
            .unwrap();
        txn.commit().unwrap();

        let doc: Option<Doc> = storage.get(USERS_TABLE, 7).unwrap();
        assert_eq!(doc, Some(Doc { name: "anna".into() }));
        assert_eq!(storage.count(USERS_TABLE).unwrap(), 1);

        let txn = storage.begin_write().unwrap();
        assert!(storage.remove(&txn, USERS_TABLE, 7).unwrap());
        assert!(!storage.remove(&txn, USERS_TABLE, 7).unwrap());
        txn.commit().unwrap();
        assert!(storage.get::<Doc>(USERS_TABLE, 7).unwrap().is_none());
    }

    #[test]
    fn uncommitted_writes_are_discarded() {
        let storage = Storage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            storage
                .put(&txn, ORDERS_TABLE, 1, &Doc { name: "draft".into() })
                .unwrap();
            // dropped without commit
        }
        assert!(storage.list::<Doc>(ORDERS_TABLE).unwrap().is_empty());
    }

    #[test]
    fn bids_are_scoped_per_product() {
        let storage = Storage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_bid(&txn, 1, 10, &Doc { name: "a".into() }).unwrap();
        storage.put_bid(&txn, 1, 11, &Doc { name: "b".into() }).unwrap();
        storage.put_bid(&txn, 2, 12, &Doc { name: "c".into() }).unwrap();
        txn.commit().unwrap();

        let bids: Vec<Doc> = storage.bids_for_product(1).unwrap();
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[1].name, "b");

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.remove_bids(&txn, 1).unwrap(), 2);
        txn.commit().unwrap();
        assert!(storage.bids_for_product::<Doc>(1).unwrap().is_empty());
        assert_eq!(storage.bids_for_product::<Doc>(2).unwrap().len(), 1);
    }

    #[test]
    fn wishlist_toggle() {
        let storage = Storage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert!(storage.toggle_wishlist(&txn, 5, 100).unwrap());
        assert!(storage.toggle_wishlist(&txn, 5, 200).unwrap());
        assert!(!storage.toggle_wishlist(&txn, 5, 100).unwrap());
        txn.commit().unwrap();
        assert_eq!(storage.wishlist(5).unwrap(), vec![200]);
        assert!(storage.wishlist(6).unwrap().is_empty());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("craft.redb");

        {
            let storage = Storage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage
                .put(&txn, PRODUCTS_TABLE, 3, &Doc { name: "kept".into() })
                .unwrap();
            txn.commit().unwrap();
        }

        let reopened = Storage::open(&path).unwrap();
        let doc: Option<Doc> = reopened.get(PRODUCTS_TABLE, 3).unwrap();
        assert_eq!(doc, Some(Doc { name: "kept".into() }));
    }
}
