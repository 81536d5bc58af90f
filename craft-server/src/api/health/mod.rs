//! Health check (public)

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::storage::PRODUCTS_TABLE;
use shared::error::{ApiResponse, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    products: u64,
}

async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthResponse>> {
    // Touches the database so a broken store fails the check
    let products = state.storage.count(PRODUCTS_TABLE)?;
    Ok(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        products,
    }))
}
