use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{UserStore, WatchlistStore},
    error::{AppError, AppResult},
    models::{InsertOutcome, NewWatchlistEntry, User, WatchlistEntry},
};

/// Process-local store used when no database URL is configured
///
/// Each method takes the lock once, so every operation is atomic with respect
/// to the others, mirroring single-statement semantics of the SQL store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    /// Keyed by `(user_id, movie_id)`, which makes duplicates unrepresentable
    entries: HashMap<(Uuid, i64), WatchlistEntry>,
    next_entry_id: i64,
}

struct Session {
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_entry<F>(
        &self,
        user_id: Uuid,
        movie_id: i64,
        apply: F,
    ) -> AppResult<Option<WatchlistEntry>>
    where
        F: FnOnce(&mut WatchlistEntry) + Send,
    {
        let mut inner = self.inner.write().await;
        Ok(inner.entries.get_mut(&(user_id, movie_id)).map(|entry| {
            apply(entry);
            entry.clone()
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(AppError::Conflict(
                "Username or email already exists!".to_string(),
            ));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expired_before: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} does not exist", user_id)));
        }
        inner
            .sessions
            .retain(|_, s| s.user_id != user_id || s.created_at >= expired_before);

        let token = Uuid::new_v4();
        inner.sessions.insert(
            token,
            Session {
                user_id,
                created_at: Utc::now(),
            },
        );
        Ok(token)
    }

    async fn user_for_session(
        &self,
        token: Uuid,
        issued_after: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(&token)
            .filter(|session| session.created_at >= issued_after)
            .and_then(|session| inner.users.get(&session.user_id))
            .cloned())
    }

    async fn delete_session(&self, token: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.sessions.remove(&token).is_some())
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn insert(&self, user_id: Uuid, entry: NewWatchlistEntry) -> AppResult<InsertOutcome> {
        let mut inner = self.inner.write().await;
        let key = (user_id, entry.movie_id);
        if inner.entries.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }

        inner.next_entry_id += 1;
        let stored = WatchlistEntry {
            id: inner.next_entry_id,
            user_id,
            movie_id: entry.movie_id,
            title: entry.title,
            poster_path: entry.poster_path,
            release_date: entry.release_date,
            genres: entry.genres,
            vote_average: entry.vote_average,
            watched: false,
            personal_rating: None,
            notes: None,
            date_added: Utc::now(),
        };
        inner.entries.insert(key, stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn delete(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let mut inner = self.inner.write().await;
        Ok(inner.entries.remove(&(user_id, movie_id)))
    }

    async fn find(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(&(user_id, movie_id)).cloned())
    }

    async fn toggle_watched(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_entry(user_id, movie_id, |entry| entry.watched = !entry.watched)
            .await
    }

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: u8,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_entry(user_id, movie_id, |entry| {
            entry.personal_rating = Some(rating)
        })
        .await
    }

    async fn set_notes(
        &self,
        user_id: Uuid,
        movie_id: i64,
        notes: Option<String>,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_entry(user_id, movie_id, |entry| entry.notes = notes)
            .await
    }

    async fn entries_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<WatchlistEntry> = inner
            .entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.date_added.cmp(&b.date_added).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}
