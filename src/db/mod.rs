//! Persistence seams
//!
//! Every watchlist method takes the owning user id; no method looks an entry up
//! by movie id alone. That pairing is the access-control boundary for the
//! whole service, so implementations must filter on both columns.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{InsertOutcome, NewWatchlistEntry, User, WatchlistEntry},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, PgStore};

/// Accounts and login sessions
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. A taken username or email yields `AppError::Conflict`.
    async fn create_user(&self, user: User) -> AppResult<User>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// True when either the username or the email is already registered
    async fn username_or_email_taken(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Opens a new session for `user_id`.
    ///
    /// Sessions of the same user created before `expired_before` are deleted
    /// in the same call, so a user who keeps logging in without logging out
    /// does not accumulate rows.
    async fn create_session(
        &self,
        user_id: Uuid,
        expired_before: DateTime<Utc>,
    ) -> AppResult<Uuid>;

    /// Resolves a session token to its user. Sessions created before
    /// `issued_after` count as expired and resolve to `None`.
    async fn user_for_session(
        &self,
        token: Uuid,
        issued_after: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Returns whether a session was deleted
    async fn delete_session(&self, token: Uuid) -> AppResult<bool>;
}

/// Per-user watchlist rows
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Inserts unless `(user_id, movie_id)` already exists
    async fn insert(&self, user_id: Uuid, entry: NewWatchlistEntry) -> AppResult<InsertOutcome>;

    /// Deletes and returns the removed entry
    async fn delete(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>>;

    async fn find(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>>;

    /// Flips `watched` in a single statement and returns the updated entry
    async fn toggle_watched(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<WatchlistEntry>>;

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: u8,
    ) -> AppResult<Option<WatchlistEntry>>;

    async fn set_notes(
        &self,
        user_id: Uuid,
        movie_id: i64,
        notes: Option<String>,
    ) -> AppResult<Option<WatchlistEntry>>;

    /// All entries owned by `user_id`, oldest first (date added, then id)
    async fn entries_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;
}
