//! Repository Module
//!
//! One repository per entity over the shared [`Storage`]. Every mutation
//! reads, checks and writes inside a single redb write transaction.

pub mod bid;
pub mod category;
pub mod dispute;
pub mod order;
pub mod product;
pub mod proposal;
pub mod user;
pub mod wishlist;

pub use bid::BidRepository;
pub use category::CategoryRepository;
pub use dispute::DisputeRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use proposal::ProposalRepository;
pub use user::UserRepository;
pub use wishlist::WishlistRepository;

use thiserror::Error;

use crate::db::StorageError;
use shared::error::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(ErrorCode),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A business rule refused the operation
    #[error("{0}")]
    Rejected(#[from] AppError),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code) => AppError::new(code),
            RepoError::Storage(e) => e.into(),
            RepoError::Rejected(e) => e,
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<redb::TableError> for RepoError {
    fn from(err: redb::TableError) -> Self {
        RepoError::Storage(err.into())
    }
}

impl From<redb::CommitError> for RepoError {
    fn from(err: redb::CommitError) -> Self {
        RepoError::Storage(err.into())
    }
}

/// Unwrap a lookup or fail with the resource's not-found code
pub(crate) fn found<T>(value: Option<T>, code: ErrorCode) -> RepoResult<T> {
    value.ok_or(RepoError::NotFound(code))
}

/// Fail unless the caller owns the resource or is an admin
pub(crate) fn ensure_owner(owner_id: i64, user_id: i64, is_admin: bool) -> RepoResult<()> {
    if owner_id == user_id || is_admin {
        return Ok(());
    }
    Err(AppError::permission_denied("Not the owner of this resource").into())
}

