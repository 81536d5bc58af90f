//! Data models
//!
//! Wire and storage shapes shared by the server and the client. All JSON is
//! camelCase; all IDs are `i64` snowflakes.

pub mod auction;
pub mod category;
pub mod dispute;
pub mod order;
pub mod product;
pub mod proposal;
pub mod user;

// Re-exports
pub use auction::*;
pub use category::*;
pub use dispute::*;
pub use order::*;
pub use product::*;
pub use proposal::*;
pub use user::*;
