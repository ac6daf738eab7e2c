use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
    api::AppState,
    error::AppResult,
    middleware::AuthUser,
    models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            message: "Registration successful! Please log in.".to_string(),
        }),
    ))
}

/// Handler for login; the returned token is sent back as a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.auth.login(request).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout(user.token).await?;
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Json(MessageResponse {
        message: "You have been logged out successfully.".to_string(),
    }))
}

/// Identity behind the presented token
pub async fn me(user: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": user.id,
        "username": user.username,
    }))
}
