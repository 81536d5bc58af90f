//! Craft Client - typed HTTP client for the CryptoCraft API
//!
//! - [`MarketClient`] - one method per endpoint
//! - [`SessionService`] - bearer token kept across launches
//! - [`telegram`] - Mini-App launch data helpers

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod telegram;

pub use api::MarketClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};
pub use session::SessionService;

// Re-export shared types for convenience
pub use shared::error::ApiResponse;
