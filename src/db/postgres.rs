use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    db::{UserStore, WatchlistStore},
    error::{AppError, AppResult},
    models::{
        join_genres, split_genres, InsertOutcome, NewWatchlistEntry, User, WatchlistEntry,
    },
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const ENTRY_COLUMNS: &str = "id, user_id, tmdb_id, title, poster_path, release_date, genres, \
     vote_average, watched, personal_rating, notes, date_added";

#[derive(Debug, FromRow)]
struct WatchlistRow {
    id: i64,
    user_id: Uuid,
    tmdb_id: i64,
    title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    genres: Option<String>,
    vote_average: Option<f64>,
    watched: bool,
    personal_rating: Option<i16>,
    notes: Option<String>,
    date_added: DateTime<Utc>,
}

impl From<WatchlistRow> for WatchlistEntry {
    fn from(row: WatchlistRow) -> Self {
        WatchlistEntry {
            id: row.id,
            user_id: row.user_id,
            movie_id: row.tmdb_id,
            title: row.title,
            poster_path: row.poster_path,
            release_date: row.release_date.unwrap_or_default(),
            genres: row.genres.as_deref().map(split_genres).unwrap_or_default(),
            vote_average: row.vote_average,
            watched: row.watched,
            personal_rating: row.personal_rating.and_then(|r| u8::try_from(r).ok()),
            notes: row.notes,
            date_added: row.date_added,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// sqlx-backed implementation of both stores
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_returning(
        &self,
        assignment: &str,
        user_id: Uuid,
        movie_id: i64,
        bind: Option<UpdateValue>,
    ) -> AppResult<Option<WatchlistEntry>> {
        let sql = format!(
            "UPDATE watchlist SET {} WHERE user_id = $1 AND tmdb_id = $2 RETURNING {}",
            assignment, ENTRY_COLUMNS
        );
        let query = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(movie_id);
        let query = match bind {
            Some(UpdateValue::Rating(rating)) => query.bind(rating),
            Some(UpdateValue::Notes(notes)) => query.bind(notes),
            None => query,
        };

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(WatchlistEntry::from))
    }
}

enum UpdateValue {
    Rating(i16),
    Notes(Option<String>),
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: User) -> AppResult<User> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::Conflict("Username or email already exists!".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expired_before: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;

        // Prune this user's stale sessions before adding the new one
        let pruned = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND created_at < $2")
            .bind(user_id)
            .bind(expired_before)
            .execute(&mut *tx)
            .await?;
        if pruned.rows_affected() > 0 {
            tracing::debug!(user_id = %user_id, pruned = pruned.rows_affected(), "Pruned expired sessions");
        }

        let token = Uuid::new_v4();
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token)
    }

    async fn user_for_session(
        &self,
        token: Uuid,
        issued_after: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.created_at >= $2
            "#,
        )
        .bind(token)
        .bind(issued_after)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn delete_session(&self, token: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WatchlistStore for PgStore {
    async fn insert(&self, user_id: Uuid, entry: NewWatchlistEntry) -> AppResult<InsertOutcome> {
        let sql = format!(
            r#"
            INSERT INTO watchlist
                (user_id, tmdb_id, title, poster_path, release_date, genres, vote_average)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, tmdb_id) DO NOTHING
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );

        let row = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(entry.movie_id)
            .bind(&entry.title)
            .bind(&entry.poster_path)
            .bind(&entry.release_date)
            .bind(join_genres(&entry.genres))
            .bind(entry.vote_average)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => InsertOutcome::Inserted(row.into()),
            None => InsertOutcome::Duplicate,
        })
    }

    async fn delete(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let sql = format!(
            "DELETE FROM watchlist WHERE user_id = $1 AND tmdb_id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistEntry::from))
    }

    async fn find(&self, user_id: Uuid, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE user_id = $1 AND tmdb_id = $2",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistEntry::from))
    }

    async fn toggle_watched(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_returning("watched = NOT watched", user_id, movie_id, None)
            .await
    }

    async fn set_rating(
        &self,
        user_id: Uuid,
        movie_id: i64,
        rating: u8,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_returning(
            "personal_rating = $3",
            user_id,
            movie_id,
            Some(UpdateValue::Rating(i16::from(rating))),
        )
        .await
    }

    async fn set_notes(
        &self,
        user_id: Uuid,
        movie_id: i64,
        notes: Option<String>,
    ) -> AppResult<Option<WatchlistEntry>> {
        self.update_returning(
            "notes = $3",
            user_id,
            movie_id,
            Some(UpdateValue::Notes(notes)),
        )
        .await
    }

    async fn entries_for_user(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE user_id = $1 ORDER BY date_added ASC, id ASC",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(WatchlistEntry::from).collect())
    }
}
