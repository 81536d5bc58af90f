//! Shared types for the CryptoCraft marketplace
//!
//! Domain models, error codes and the pure marketplace rules used by both
//! the server and the client: category field resolution, attribute
//! normalization, the order lifecycle, auction bidding and DAO voting.

pub mod auction;
pub mod catalog;
pub mod error;
pub mod governance;
pub mod models;
pub mod money;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
