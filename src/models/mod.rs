pub mod filter;
pub mod movie;
pub mod user;
pub mod watchlist;

pub use filter::{SortKey, StatusFilter, WatchlistFilter, WatchlistQuery};
pub use movie::{
    CastMember, CrewMember, HomeResponse, MovieDetails, MovieDetailsResponse, MovieSummary,
    TmdbMovieDetails, TmdbPage, Video,
};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, User, UserResponse};
pub use watchlist::{
    join_genres, split_genres, AddEntryRequest, AddOutcome, HistogramBucket, InsertOutcome,
    NewWatchlistEntry, NotesRequest, RateRequest, RecentAddition, RemoveOutcome, TopRated,
    UpdateOutcome, WatchlistCounts, WatchlistEntry, WatchlistSnapshot, WatchlistStats,
};
