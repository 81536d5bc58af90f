//! Dispute API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::DisputeRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::{Dispute, DisputeMessageCreate, DisputeResolve};
use shared::util::now_millis;

/// Open disputes queue (admin)
pub async fn list_open(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Dispute>>> {
    user.require_admin()?;
    let repo = DisputeRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.list_open()?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Dispute>> {
    let repo = DisputeRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get_for(id, user.id, user.is_admin)?))
}

pub async fn add_message(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DisputeMessageCreate>,
) -> AppResult<ApiResponse<Dispute>> {
    let repo = DisputeRepository::new(state.storage.clone());
    let dispute = repo.add_message(id, user.id, user.is_admin, &payload.text, now_millis())?;
    Ok(ApiResponse::success(dispute))
}

pub async fn resolve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DisputeResolve>,
) -> AppResult<ApiResponse<Dispute>> {
    user.require_admin()?;
    let repo = DisputeRepository::new(state.storage.clone());
    let dispute = repo.resolve(id, user.id, payload.outcome, now_millis())?;
    Ok(ApiResponse::success(dispute))
}
