use axum::{extract::State, Json};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::AuthUser,
    models::{WatchlistCounts, WatchlistStats},
};

/// Full statistics for the caller's watchlist
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<WatchlistStats>> {
    let stats = state.watchlist.statistics(user.id).await?;

    tracing::debug!(
        user_id = %user.id,
        total = stats.counts.total,
        genres = stats.genres.len(),
        "Statistics computed"
    );

    Ok(Json(stats))
}

/// Watched/unwatched totals only
pub async fn counts(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<WatchlistCounts>> {
    Ok(Json(state.watchlist.counts(user.id).await?))
}
