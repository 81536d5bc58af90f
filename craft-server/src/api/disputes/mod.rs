//! Dispute API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/disputes", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/messages", post(handler::add_message))
        .route("/{id}/resolve", post(handler::resolve))
}
