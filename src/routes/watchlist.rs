use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::{
    api::AppState,
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::{
        AddEntryRequest, AddOutcome, NotesRequest, RateRequest, RemoveOutcome, SortKey,
        StatusFilter, UpdateOutcome, WatchlistCounts, WatchlistEntry, WatchlistFilter,
        WatchlistQuery,
    },
};

/// Filtered watchlist plus what a client needs to render its filter controls
#[derive(Debug, Serialize)]
pub struct WatchlistView {
    pub entries: Vec<WatchlistEntry>,
    /// Every genre in the user's list, for the genre picker
    pub genres: Vec<String>,
    #[serde(flatten)]
    pub counts: WatchlistCounts,
    pub selected_genre: Option<String>,
    pub selected_status: StatusFilter,
    pub selected_sort: SortKey,
    pub search_query: Option<String>,
    pub image_base: String,
}

/// Outcome of a single-entry mutation
///
/// `success` is false when the request was understood but changed nothing,
/// such as adding a movie that is already listed. `entry` carries the updated
/// record for rating and notes changes so clients can re-render without
/// another fetch.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<WatchlistEntry>,
}

impl MutationResponse {
    fn ok(message: String, entry: Option<WatchlistEntry>) -> Self {
        Self {
            success: true,
            message,
            new_status: None,
            entry,
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            new_status: None,
            entry: None,
        }
    }
}

const NOT_FOUND_MESSAGE: &str = "Movie not found";

fn not_found() -> (StatusCode, Json<MutationResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MutationResponse::failed(NOT_FOUND_MESSAGE)),
    )
}

/// Handler for the watchlist view
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WatchlistQuery>,
) -> AppResult<Json<WatchlistView>> {
    let filter = WatchlistFilter::from(query);

    let snapshot = state.watchlist.snapshot(user.id, &filter).await?;

    Ok(Json(WatchlistView {
        entries: snapshot.entries,
        genres: snapshot.genres,
        counts: snapshot.counts,
        selected_genre: filter.genre,
        selected_status: filter.status,
        selected_sort: filter.sort,
        search_query: filter.search,
        image_base: state.image_base.clone(),
    }))
}

/// Adds a movie; 201 when added, 200 when it was already there
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AddEntryRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user.id,
        movie_id = request.movie_id,
        "Processing add to watchlist"
    );

    Ok(match state.watchlist.add(user.id, request).await? {
        AddOutcome::Added(entry) => (
            StatusCode::CREATED,
            Json(MutationResponse::ok(
                format!("\"{}\" added to your watchlist!", entry.title),
                Some(entry),
            )),
        ),
        AddOutcome::AlreadyPresent { title } => (
            StatusCode::OK,
            Json(MutationResponse {
                success: false,
                message: format!("\"{}\" is already in your watchlist!", title),
                new_status: None,
                entry: None,
            }),
        ),
    })
}

/// Removing a movie that is not in the list still answers 200
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MutationResponse>> {
    Ok(Json(match state.watchlist.remove(user.id, movie_id).await? {
        RemoveOutcome::Removed { title } => {
            MutationResponse::ok(format!("\"{}\" removed from your watchlist!", title), None)
        }
        RemoveOutcome::NotInWatchlist => MutationResponse::failed("Movie not in your watchlist"),
    }))
}

/// Flips watched/unwatched and reports the new state
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<i64>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    Ok(match state.watchlist.toggle_watched(user.id, movie_id).await? {
        UpdateOutcome::Updated(entry) => {
            let status_text = if entry.watched { "watched" } else { "unwatched" };
            let mut response = MutationResponse::ok(
                format!("\"{}\" marked as {}!", entry.title, status_text),
                None,
            );
            response.new_status = Some(entry.watched);
            (StatusCode::OK, Json(response))
        }
        UpdateOutcome::NotFound => not_found(),
    })
}

pub async fn rate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<i64>,
    Json(request): Json<RateRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    Ok(
        match state.watchlist.rate(user.id, movie_id, request.rating).await? {
            UpdateOutcome::Updated(entry) => (
                StatusCode::OK,
                Json(MutationResponse::ok(
                    format!("Rated \"{}\" {} stars!", entry.title, request.rating),
                    Some(entry),
                )),
            ),
            UpdateOutcome::NotFound => not_found(),
        },
    )
}

pub async fn notes(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<i64>,
    Json(request): Json<NotesRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    Ok(
        match state
            .watchlist
            .update_notes(user.id, movie_id, request.notes)
            .await?
        {
            UpdateOutcome::Updated(entry) => (
                StatusCode::OK,
                Json(MutationResponse::ok(
                    format!("Notes updated for \"{}\"!", entry.title),
                    Some(entry),
                )),
            ),
            UpdateOutcome::NotFound => not_found(),
        },
    )
}
