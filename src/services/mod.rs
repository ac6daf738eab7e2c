pub mod auth;
pub mod catalog;
pub mod engine;
pub mod watchlist;

pub use auth::AuthService;
pub use catalog::{MovieCatalog, TmdbCatalog};
pub use watchlist::WatchlistService;
