//! Auth API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/telegram | POST | public |
//! | /api/auth/webapp | POST | public |
//! | /api/auth/me | GET | bearer |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/telegram", post(handler::telegram_login))
        .route("/webapp", post(handler::webapp_login))
        .route("/me", get(handler::me))
}
