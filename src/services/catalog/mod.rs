use crate::{
    error::AppResult,
    models::{MovieDetails, MovieSummary},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Listings shown on the home view are cut to this many movies
pub const HOME_LISTING_LIMIT: usize = 8;

/// Third-party movie metadata source
///
/// Every call crosses the network and may fail or time out. Callers that only
/// enrich a response should go through [`search_or_empty`], [`listing_or_empty`]
/// or [`genres_or_empty`], which log the failure and carry on with no data.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search_by_title(&self, query: &str) -> AppResult<Vec<MovieSummary>>;

    /// Full record, including genres, credits and videos
    async fn get_by_id(&self, movie_id: i64) -> AppResult<MovieDetails>;

    async fn trending(&self) -> AppResult<Vec<MovieSummary>>;

    async fn popular(&self) -> AppResult<Vec<MovieSummary>>;

    /// Catalog name for logging
    fn name(&self) -> &'static str;
}

/// Title search that never fails
///
/// An empty query or an unreachable catalog both come back as no results;
/// the failure is only visible in the logs.
pub async fn search_or_empty(catalog: &dyn MovieCatalog, query: &str) -> Vec<MovieSummary> {
    match catalog.search_by_title(query).await {
        Ok(movies) => movies,
        Err(e) => {
            tracing::warn!(
                error = %e,
                query = %query,
                catalog = catalog.name(),
                "Catalog search failed, returning no results"
            );
            Vec::new()
        }
    }
}

/// Which home listing to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Trending,
    Popular,
}

/// First [`HOME_LISTING_LIMIT`] movies of a listing, or nothing on failure
pub async fn listing_or_empty(catalog: &dyn MovieCatalog, listing: Listing) -> Vec<MovieSummary> {
    let result = match listing {
        Listing::Trending => catalog.trending().await,
        Listing::Popular => catalog.popular().await,
    };

    match result {
        Ok(mut movies) => {
            movies.truncate(HOME_LISTING_LIMIT);
            movies
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                listing = ?listing,
                catalog = catalog.name(),
                "Catalog listing failed, returning no results"
            );
            Vec::new()
        }
    }
}

/// Genre names for a movie, or none when the catalog is unreachable
pub async fn genres_or_empty(catalog: &dyn MovieCatalog, movie_id: i64) -> Vec<String> {
    match catalog.get_by_id(movie_id).await {
        Ok(details) => details.genres,
        Err(e) => {
            tracing::warn!(
                error = %e,
                movie_id = movie_id,
                catalog = catalog.name(),
                "Genre lookup failed, adding without genres"
            );
            Vec::new()
        }
    }
}
