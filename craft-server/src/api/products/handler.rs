//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{BidRepository, ProductRepository};
use shared::error::{ApiResponse, AppResult};
use shared::models::{Bid, PlaceBid, Product, ProductCreate, ProductQuery, ProductUpdate};
use shared::util::now_millis;

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let repo = ProductRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.list(&query)?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Product>> {
    let repo = ProductRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get(id)?))
}

pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<ApiResponse<Product>> {
    let repo = ProductRepository::new(state.storage.clone());
    let product = repo.create(user.id, payload, now_millis())?;
    Ok(ApiResponse::success(product))
}

pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<ApiResponse<Product>> {
    let repo = ProductRepository::new(state.storage.clone());
    let product = repo.update(id, user.id, user.is_admin, payload, now_millis())?;
    Ok(ApiResponse::success(product))
}

pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<bool>> {
    let repo = ProductRepository::new(state.storage.clone());
    repo.delete(id, user.id, user.is_admin)?;
    Ok(ApiResponse::success(true))
}

pub async fn list_bids(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Bid>>> {
    // 404 for unknown products rather than an empty list
    ProductRepository::new(state.storage.clone()).get(id)?;
    let repo = BidRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.list(id)?))
}

pub async fn place_bid(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PlaceBid>,
) -> AppResult<ApiResponse<Bid>> {
    let repo = BidRepository::new(state.storage.clone());
    let bid = repo.place(id, user.id, payload.amount, now_millis())?;
    Ok(ApiResponse::success(bid))
}
