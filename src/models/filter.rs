use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Watched-status restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl StatusFilter {
    /// Anything other than `watched`/`unwatched` means no restriction
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("watched") => StatusFilter::Watched,
            Some("unwatched") => StatusFilter::Unwatched,
            _ => StatusFilter::All,
        }
    }

    pub fn matches(self, watched: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Watched => watched,
            StatusFilter::Unwatched => !watched,
        }
    }
}

/// Ordering applied to a watchlist view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    TitleAsc,
    TitleDesc,
    YearAsc,
    YearDesc,
    RatingAsc,
    RatingDesc,
    DateAddedAsc,
    #[default]
    DateAddedDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::YearAsc,
        SortKey::YearDesc,
        SortKey::RatingAsc,
        SortKey::RatingDesc,
        SortKey::DateAddedAsc,
        SortKey::DateAddedDesc,
    ];

    /// Unknown or missing values fall back to `date_added_desc`
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return SortKey::default();
        };
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == raw)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
            SortKey::YearAsc => "year_asc",
            SortKey::YearDesc => "year_desc",
            SortKey::RatingAsc => "rating_asc",
            SortKey::RatingDesc => "rating_desc",
            SortKey::DateAddedAsc => "date_added_asc",
            SortKey::DateAddedDesc => "date_added_desc",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query string accepted by the watchlist view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistQuery {
    pub genre: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    /// Free-text title search
    pub q: Option<String>,
}

/// Parsed view parameters; blank strings are treated as absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchlistFilter {
    pub genre: Option<String>,
    pub status: StatusFilter,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl WatchlistFilter {
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = non_blank(Some(genre.into()));
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(Some(search.into()));
        self
    }
}

impl From<WatchlistQuery> for WatchlistFilter {
    fn from(query: WatchlistQuery) -> Self {
        Self {
            genre: non_blank(query.genre),
            status: StatusFilter::parse(query.status.as_deref()),
            search: non_blank(query.q),
            sort: SortKey::parse(query.sort.as_deref()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
