//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::CategoryRepository;
use shared::error::{ApiResponse, AppResult};
use shared::models::{CategoryFieldWithMeta, CategorySchema};

pub async fn tree(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<CategorySchema>>> {
    let repo = CategoryRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.tree()?))
}

/// Replace the whole tree (admin)
pub async fn replace(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(tree): Json<Vec<CategorySchema>>,
) -> AppResult<ApiResponse<Vec<CategorySchema>>> {
    user.require_admin()?;
    let repo = CategoryRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.replace(tree)?))
}

/// Inherited plus own fields of a category, root first
pub async fn fields(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<ApiResponse<Vec<CategoryFieldWithMeta>>> {
    let repo = CategoryRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.fields(&name)?))
}
