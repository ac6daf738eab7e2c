use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{HomeResponse, MovieDetailsResponse, WatchlistEntry},
    services::catalog::{listing_or_empty, search_or_empty, Listing},
};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    q: Option<String>,
}

/// Search results for `q`, or trending and popular listings without it
///
/// Catalog failures leave the affected list empty.
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeQuery>,
) -> Json<HomeResponse> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());
    let catalog = state.catalog.as_ref();

    let (results, trending, popular) = match &query {
        Some(q) => (search_or_empty(catalog, q).await, Vec::new(), Vec::new()),
        None => {
            let (trending, popular) = tokio::join!(
                listing_or_empty(catalog, Listing::Trending),
                listing_or_empty(catalog, Listing::Popular)
            );
            (Vec::new(), trending, popular)
        }
    };

    Json(HomeResponse {
        query,
        results,
        trending,
        popular,
        image_base: state.image_base.clone(),
    })
}

/// Catalog details plus the caller's own entry when signed in
///
/// The catalog record is the page itself, so a catalog failure is a 404.
/// The watchlist entry only decorates it: if the store cannot be read the
/// page is still served, just without the entry.
pub async fn details(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    user: Option<AuthUser>,
) -> AppResult<Json<MovieDetailsResponse>> {
    let movie = state.catalog.get_by_id(movie_id).await.map_err(|e| {
        tracing::warn!(error = %e, movie_id = movie_id, "Movie details unavailable");
        AppError::NotFound("Movie not found".to_string())
    })?;

    let watchlist_entry = match &user {
        Some(user) => own_entry(&state, user, movie_id).await,
        None => None,
    };

    Ok(Json(MovieDetailsResponse {
        cast: movie.top_cast(),
        director: movie.director().cloned(),
        trailer: movie.trailer().cloned(),
        movie,
        watchlist_entry,
        image_base: state.image_base.clone(),
    }))
}

async fn own_entry(state: &AppState, user: &AuthUser, movie_id: i64) -> Option<WatchlistEntry> {
    match state.watchlist.find(user.id, movie_id).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(
                error = %e,
                user_id = %user.id,
                movie_id = movie_id,
                "Watchlist lookup failed, showing details without entry"
            );
            None
        }
    }
}
