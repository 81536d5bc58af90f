//! Storage layer
//!
//! - [`Storage`] - redb database handle and typed table access
//! - [`repository`] - per-entity operations, each mutation in one write transaction

pub mod repository;
pub mod storage;

pub use storage::{Storage, StorageError, StorageResult};
