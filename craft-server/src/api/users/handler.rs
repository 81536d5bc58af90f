//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::{User, UserUpdate};

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<User>> {
    let repo = UserRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get(id)?))
}

pub async fn update_me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    let repo = UserRepository::new(state.storage.clone());
    let updated = repo.update(user.id, payload, user.is_admin)?;
    Ok(ApiResponse::success(updated))
}
