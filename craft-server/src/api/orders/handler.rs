//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::OrderRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::{Order, OrderActionRequest, OrderCreate};
use shared::order::OrderAction;
use shared::util::now_millis;

pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<ApiResponse<Order>> {
    let repo = OrderRepository::new(state.storage.clone());
    let order = repo.create(user.id, payload, now_millis())?;
    Ok(ApiResponse::success(order))
}

pub async fn purchases(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let repo = OrderRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.purchases(user.id)?))
}

pub async fn sales(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let repo = OrderRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.sales(user.id)?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Order>> {
    let repo = OrderRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get_for(id, user.id, user.is_admin)?))
}

/// Actions the caller may take from the order's current status
pub async fn available_actions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<OrderAction>>> {
    let repo = OrderRepository::new(state.storage.clone());
    let actions = repo.available_actions(id, user.id, user.is_admin)?;
    Ok(ApiResponse::success(actions))
}

pub async fn apply_action(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderActionRequest>,
) -> AppResult<ApiResponse<Order>> {
    let repo = OrderRepository::new(state.storage.clone());
    let order = repo.apply_action(id, user.id, user.is_admin, &payload, now_millis())?;
    Ok(ApiResponse::success(order))
}
