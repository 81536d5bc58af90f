//! CryptoCraft marketplace server
//!
//! # Module layout
//!
//! ```text
//! craft-server/src/
//! ├── core/      # config, state, server, startup errors
//! ├── auth/      # JWT, Telegram sign-in, middleware
//! ├── db/        # redb storage and repositories
//! ├── api/       # HTTP routes and handlers
//! ├── routes/    # router assembly and tower layers
//! └── utils/     # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod routes;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use db::Storage;
pub use routes::build_app;
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event logging
///
/// Emits at INFO with `target: "security"` so the events can be routed to a
/// dedicated sink.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the work directory and start logging
pub fn setup_environment() -> Result<Config, ServerError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir.clone();
    init_logger_with_file(Some(&config.log_level), log_dir.as_deref());
    config.validate()?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ______           ______
  / ____/________ _/ __/ /_
 / /   / ___/ __ `/ /_/ __/
/ /___/ /  / /_/ / __/ /_
\____/_/   \__,_/_/  \__/   marketplace
"#
    );
}
