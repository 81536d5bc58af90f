//! Wishlist API Handlers

use axum::extract::{Path, State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::WishlistRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::WishlistToggle;

pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<ApiResponse<Vec<i64>>> {
    let repo = WishlistRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.list(user.id)?))
}

pub async fn toggle(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<ApiResponse<WishlistToggle>> {
    let repo = WishlistRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.toggle(user.id, product_id)?))
}
