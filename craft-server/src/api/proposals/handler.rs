//! Proposal API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::ProposalRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::{CastVote, ProposalCreate, ProposalView};
use shared::util::now_millis;

pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<ProposalView>>> {
    let repo = ProposalRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.list(now_millis())?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ProposalView>> {
    let repo = ProposalRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get(id, now_millis())?))
}

pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProposalCreate>,
) -> AppResult<ApiResponse<ProposalView>> {
    let repo = ProposalRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.create(user.id, payload, now_millis())?))
}

pub async fn vote(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CastVote>,
) -> AppResult<ApiResponse<ProposalView>> {
    let repo = ProposalRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.vote(id, user.id, payload.choice, now_millis())?))
}

/// End voting early (admin)
pub async fn close(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ProposalView>> {
    user.require_admin()?;
    let repo = ProposalRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.close(id, now_millis())?))
}
