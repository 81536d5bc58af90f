//! Authentication
//!
//! - [`JwtService`] - access tokens
//! - [`TelegramVerifier`] - Login Widget and Mini-App signature checks
//! - [`CurrentUser`] - caller context injected by [`require_auth`]

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod telegram;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use telegram::{TelegramAuthError, TelegramVerifier};
