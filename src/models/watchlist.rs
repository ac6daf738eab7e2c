use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used when genres are flattened into a single column
pub const GENRE_SEPARATOR: &str = ", ";

/// One user's watchlist record for one catalog movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    /// Store-assigned, increases with insertion order
    pub id: i64,
    pub user_id: Uuid,
    /// Catalog (TMDB) movie identifier
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    /// ISO `YYYY-MM-DD`, or empty when the catalog has no date
    pub release_date: String,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
    pub watched: bool,
    /// 1 to 5 when set
    pub personal_rating: Option<u8>,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl WatchlistEntry {
    /// Genres joined the way they are stored
    pub fn genre_string(&self) -> String {
        join_genres(&self.genres)
    }

    /// Four-character year prefix of the release date, if any
    pub fn release_year(&self) -> Option<&str> {
        if self.release_date.is_empty() {
            return None;
        }
        Some(self.release_date.get(..4).unwrap_or(&self.release_date))
    }
}

/// Fields supplied when adding a movie; genres are resolved by the service
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchlistEntry {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: String,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
}

/// Joins genre tags into the flattened column form
pub fn join_genres(genres: &[String]) -> String {
    genres.join(GENRE_SEPARATOR)
}

/// Splits the flattened column form back into trimmed, non-empty tags
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split(GENRE_SEPARATOR)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Result of inserting into the store
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(WatchlistEntry),
    /// `(user, movie)` already present; nothing was written
    Duplicate,
}

/// Result of the add operation as seen by callers
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(WatchlistEntry),
    AlreadyPresent { title: String },
}

/// Result of the remove operation
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed { title: String },
    NotInWatchlist,
}

/// Result of a field update on a single entry
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(WatchlistEntry),
    NotFound,
}

/// Form for the add operation
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    pub movie_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Watched/unwatched totals for one user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WatchlistCounts {
    pub total: usize,
    pub watched: usize,
    pub unwatched: usize,
}

/// One consistent read of a user's watchlist for the list view
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistSnapshot {
    /// Entries matching the filter, in the requested order
    pub entries: Vec<WatchlistEntry>,
    /// Genres across the whole list, not just the matching entries
    pub genres: Vec<String>,
    /// Counts across the whole list
    pub counts: WatchlistCounts,
}

/// Count for a genre or a release year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistogramBucket {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentAddition {
    pub title: String,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopRated {
    pub title: String,
    pub personal_rating: u8,
}

/// Aggregates over one user's whole watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistStats {
    #[serde(flatten)]
    pub counts: WatchlistCounts,
    /// Rounded to one decimal; `None` when nothing has been rated yet
    pub average_rating: Option<f64>,
    pub genres: Vec<HistogramBucket>,
    pub years: Vec<HistogramBucket>,
    pub recent_additions: Vec<RecentAddition>,
    pub top_rated: Vec<TopRated>,
}
