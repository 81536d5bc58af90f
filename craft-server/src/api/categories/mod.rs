//! Category API
//!
//! The tree is readable by any signed-in user; only admins replace it.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::tree).put(handler::replace))
        .route("/{name}/fields", get(handler::fields))
}
