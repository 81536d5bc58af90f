//! Auth API Handlers

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::security_log;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{AuthResponse, TelegramLoginPayload, TelegramUser, User, WebAppAuthRequest};
use shared::util::now_millis;

/// Login Widget callback
pub async fn telegram_login(
    State(state): State<ServerState>,
    Json(payload): Json<TelegramLoginPayload>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let now = now_millis();
    let tg = state
        .telegram
        .verify_login(&payload, now / 1000)
        .map_err(|e| {
            security_log!("WARN", "telegram_login_rejected", telegram_id = payload.id, error = e.to_string());
            AppError::from(e)
        })?;
    sign_in(&state, tg, now).map(ApiResponse::success)
}

/// Mini-App launch
pub async fn webapp_login(
    State(state): State<ServerState>,
    Json(payload): Json<WebAppAuthRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let now = now_millis();
    let tg = state
        .telegram
        .verify_init_data(&payload.init_data, now / 1000)
        .map_err(|e| {
            security_log!("WARN", "webapp_login_rejected", error = e.to_string());
            AppError::from(e)
        })?;
    sign_in(&state, tg, now).map(ApiResponse::success)
}

pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<ApiResponse<User>> {
    let repo = UserRepository::new(state.storage.clone());
    Ok(ApiResponse::success(repo.get(user.id)?))
}

fn sign_in(state: &ServerState, tg: TelegramUser, now: i64) -> AppResult<AuthResponse> {
    let is_admin = state.is_admin_telegram_id(tg.id);
    let repo = UserRepository::new(state.storage.clone());
    let user = repo.upsert_telegram(&tg, is_admin, now)?;
    let token = state.jwt_service.generate_token(user.id, &user.username, is_admin)?;

    tracing::info!(user_id = user.id, telegram_id = tg.id, is_admin, "User signed in");
    Ok(AuthResponse {
        token,
        user,
        is_admin,
    })
}
