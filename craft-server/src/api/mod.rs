//! API routes
//!
//! - [`health`] - liveness
//! - [`auth`] - Telegram sign-in and current user
//! - [`users`] - profiles
//! - [`categories`] - category tree and resolved fields
//! - [`products`] - listings and auction bids
//! - [`orders`] - checkout and order lifecycle
//! - [`disputes`] - dispute threads and resolution
//! - [`proposals`] - DAO governance
//! - [`wishlist`] - saved products

pub mod auth;
pub mod categories;
pub mod disputes;
pub mod health;
pub mod orders;
pub mod products;
pub mod proposals;
pub mod users;
pub mod wishlist;
