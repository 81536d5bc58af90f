//! Order API
//!
//! Checkout creates a `PENDING` order; every later status change goes
//! through `POST /api/orders/{id}/actions`.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::checkout))
        .route("/purchases", get(handler::purchases))
        .route("/sales", get(handler::sales))
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/actions",
            get(handler::available_actions).post(handler::apply_action),
        )
}
