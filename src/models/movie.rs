use serde::{Deserialize, Serialize};

use super::WatchlistEntry;

/// Catalog search/listing result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    /// Empty when the catalog has no date
    pub release_date: String,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
    pub profile_path: Option<String>,
}

/// Video reference (trailers, teasers) hosted by a third-party site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    pub video_type: String,
}

/// Full catalog record for one movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub backdrop_path: Option<String>,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub videos: Vec<Video>,
}

/// Number of cast members shown on the details view
pub const TOP_CAST: usize = 10;

impl MovieDetails {
    /// Billed cast in catalog order, truncated to [`TOP_CAST`]
    pub fn top_cast(&self) -> Vec<CastMember> {
        self.cast.iter().take(TOP_CAST).cloned().collect()
    }

    pub fn director(&self) -> Option<&CrewMember> {
        self.crew.iter().find(|person| person.job == "Director")
    }

    /// First YouTube trailer, if the catalog lists one
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .iter()
            .find(|video| video.video_type == "Trailer" && video.site == "YouTube")
    }
}

/// Home view: either search results or trending/popular listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomeResponse {
    pub query: Option<String>,
    pub results: Vec<MovieSummary>,
    pub trending: Vec<MovieSummary>,
    pub popular: Vec<MovieSummary>,
    pub image_base: String,
}

/// Details view, enriched with the caller's own entry when signed in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetailsResponse {
    pub movie: MovieDetails,
    pub cast: Vec<CastMember>,
    pub director: Option<CrewMember>,
    pub trailer: Option<Video>,
    pub watchlist_entry: Option<WatchlistEntry>,
    pub image_base: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response (`/search/movie`, `/trending/...`, `/movie/popular`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl From<TmdbMovie> for MovieSummary {
    fn from(movie: TmdbMovie) -> Self {
        MovieSummary {
            id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            release_date: movie.release_date.unwrap_or_default(),
            vote_average: movie.vote_average,
            overview: movie.overview,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// `/movie/{id}?append_to_response=credits,videos`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(flatten)]
    pub movie: TmdbMovie,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub credits: TmdbCredits,
    #[serde(default)]
    pub videos: TmdbVideos,
}

impl From<TmdbMovieDetails> for MovieDetails {
    fn from(details: TmdbMovieDetails) -> Self {
        MovieDetails {
            summary: details.movie.into(),
            backdrop_path: details.backdrop_path,
            runtime: details.runtime,
            tagline: details.tagline.filter(|t| !t.is_empty()),
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            cast: details
                .credits
                .cast
                .into_iter()
                .map(|c| CastMember {
                    name: c.name,
                    character: c.character,
                    profile_path: c.profile_path,
                })
                .collect(),
            crew: details
                .credits
                .crew
                .into_iter()
                .map(|c| CrewMember {
                    name: c.name,
                    job: c.job,
                    profile_path: c.profile_path,
                })
                .collect(),
            videos: details
                .videos
                .results
                .into_iter()
                .map(|v| Video {
                    key: v.key,
                    name: v.name,
                    site: v.site,
                    video_type: v.video_type,
                })
                .collect(),
        }
    }
}
