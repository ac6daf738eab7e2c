use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{api::AppState, error::AppError};

/// Identity of the caller, resolved from `Authorization: Bearer <token>`
///
/// Handlers receive this explicitly and pass `id` down to every service call.
/// Use `Option<AuthUser>` where signing in is optional.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub token: Uuid,
}

/// Parses the bearer token out of the request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let missing = || AppError::Unauthorized("Please log in to access this page.".to_string());

    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(missing)?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(missing)?;

    Uuid::parse_str(token.trim()).map_err(|_| missing())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let user = state.auth.authenticate(token).await?.ok_or_else(|| {
            AppError::Unauthorized("Session expired, please log in again.".to_string())
        })?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            token,
        })
    }
}
