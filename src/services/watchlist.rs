use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::WatchlistStore,
    error::{AppError, AppResult},
    models::{
        AddEntryRequest, AddOutcome, InsertOutcome, NewWatchlistEntry, RemoveOutcome,
        UpdateOutcome, WatchlistCounts, WatchlistEntry, WatchlistFilter, WatchlistSnapshot,
        WatchlistStats,
    },
    services::{
        catalog::{genres_or_empty, MovieCatalog},
        engine,
    },
};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Watchlist operations for an explicitly identified user
///
/// Every method is keyed by the caller's user id; the id always comes from the
/// authenticated request, never from the request body.
#[derive(Clone)]
pub struct WatchlistService {
    store: Arc<dyn WatchlistStore>,
    catalog: Arc<dyn MovieCatalog>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn WatchlistStore>, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Adds a movie, resolving its genres from the catalog first
    pub async fn add(&self, user_id: Uuid, request: AddEntryRequest) -> AppResult<AddOutcome> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }

        let genres = genres_or_empty(self.catalog.as_ref(), request.movie_id).await;

        let entry = NewWatchlistEntry {
            movie_id: request.movie_id,
            title: title.clone(),
            poster_path: request.poster_path.filter(|p| !p.is_empty()),
            release_date: request.release_date.unwrap_or_default(),
            genres,
            vote_average: request.vote_average,
        };

        match self.store.insert(user_id, entry).await? {
            InsertOutcome::Inserted(entry) => {
                tracing::info!(
                    user_id = %user_id,
                    movie_id = entry.movie_id,
                    genres = entry.genres.len(),
                    "Added to watchlist"
                );
                Ok(AddOutcome::Added(entry))
            }
            InsertOutcome::Duplicate => {
                tracing::debug!(user_id = %user_id, movie_id = request.movie_id, "Already in watchlist");
                Ok(AddOutcome::AlreadyPresent { title })
            }
        }
    }

    /// Removing something that is not there is not an error
    pub async fn remove(&self, user_id: Uuid, movie_id: i64) -> AppResult<RemoveOutcome> {
        Ok(match self.store.delete(user_id, movie_id).await? {
            Some(entry) => {
                tracing::info!(user_id = %user_id, movie_id = movie_id, "Removed from watchlist");
                RemoveOutcome::Removed { title: entry.title }
            }
            None => RemoveOutcome::NotInWatchlist,
        })
    }

    pub async fn toggle_watched(&self, user_id: Uuid, movie_id: i64) -> AppResult<UpdateOutcome> {
        let updated = self.store.toggle_watched(user_id, movie_id).await?;
        Ok(updated.map_or(UpdateOutcome::NotFound, UpdateOutcome::Updated))
    }

    /// Sets the personal rating; only whole stars from 1 to 5 are accepted
    pub async fn rate(&self, user_id: Uuid, movie_id: i64, rating: i64) -> AppResult<UpdateOutcome> {
        let rating = validate_rating(rating)?;
        let updated = self.store.set_rating(user_id, movie_id, rating).await?;
        Ok(updated.map_or(UpdateOutcome::NotFound, UpdateOutcome::Updated))
    }

    /// Replaces the notes; blank text clears them
    pub async fn update_notes(
        &self,
        user_id: Uuid,
        movie_id: i64,
        notes: Option<String>,
    ) -> AppResult<UpdateOutcome> {
        let notes = notes.filter(|n| !n.trim().is_empty());
        let updated = self.store.set_notes(user_id, movie_id, notes).await?;
        Ok(updated.map_or(UpdateOutcome::NotFound, UpdateOutcome::Updated))
    }

    pub async fn find(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        self.store.find(user_id, movie_id).await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &WatchlistFilter,
    ) -> AppResult<Vec<WatchlistEntry>> {
        engine::list_entries(self.store.as_ref(), user_id, filter).await
    }

    /// Everything the list view shows, read from the store once
    pub async fn snapshot(
        &self,
        user_id: Uuid,
        filter: &WatchlistFilter,
    ) -> AppResult<WatchlistSnapshot> {
        engine::snapshot(self.store.as_ref(), user_id, filter).await
    }

    pub async fn genres(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        engine::distinct_genres(self.store.as_ref(), user_id).await
    }

    pub async fn counts(&self, user_id: Uuid) -> AppResult<WatchlistCounts> {
        engine::count_entries(self.store.as_ref(), user_id).await
    }

    pub async fn statistics(&self, user_id: Uuid) -> AppResult<WatchlistStats> {
        engine::compute_statistics(self.store.as_ref(), user_id).await
    }
}

fn validate_rating(rating: i64) -> AppResult<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    u8::try_from(rating).map_err(|e| AppError::Internal(e.to_string()))
}
