//! TMDB (The Movie Database) v3 catalog
//!
//! Endpoints used:
//! 1. Search: /search/movie?query=...
//! 2. Details: /movie/{id}?append_to_response=credits,videos
//! 3. Listings: /trending/movie/week and /movie/popular
//!
//! Authentication is the `api_key` query parameter.

use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSummary, TmdbMovieDetails, TmdbPage},
    services::catalog::MovieCatalog,
};

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    /// Builds a client whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(path = %path, "TMDB request timed out");
                }
                e
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn get_page(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Vec<MovieSummary>> {
        let page: TmdbPage = self.get_json(path, params).await?;
        Ok(page.results.into_iter().map(MovieSummary::from).collect())
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search_by_title(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let movies = self
            .get_page("search/movie", &[("query", query.trim())])
            .await?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            catalog = self.name(),
            "Title search completed"
        );

        Ok(movies)
    }

    async fn get_by_id(&self, movie_id: i64) -> AppResult<MovieDetails> {
        let path = format!("movie/{}", movie_id);
        let details: TmdbMovieDetails = self
            .get_json(&path, &[("append_to_response", "credits,videos")])
            .await?;

        let details = MovieDetails::from(details);
        tracing::debug!(
            movie_id = movie_id,
            genres = details.genres.len(),
            cast = details.cast.len(),
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn trending(&self) -> AppResult<Vec<MovieSummary>> {
        self.get_page("trending/movie/week", &[]).await
    }

    async fn popular(&self) -> AppResult<Vec<MovieSummary>> {
        self.get_page("movie/popular", &[]).await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
