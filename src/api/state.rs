use std::sync::Arc;

use crate::{
    db::{UserStore, WatchlistStore},
    services::{AuthService, MovieCatalog, WatchlistService},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub watchlist: WatchlistService,
    pub catalog: Arc<dyn MovieCatalog>,
    /// Prefix clients put in front of poster and profile paths
    pub image_base: String,
}

impl AppState {
    /// Wires the services over the given stores and catalog
    pub fn new(
        users: Arc<dyn UserStore>,
        watchlist: Arc<dyn WatchlistStore>,
        catalog: Arc<dyn MovieCatalog>,
        image_base: String,
    ) -> Self {
        Self {
            auth: AuthService::new(users),
            watchlist: WatchlistService::new(watchlist, catalog.clone()),
            catalog,
            image_base,
        }
    }

    /// Replaces the password hashing work factor
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.auth = self.auth.with_hash_cost(hash_cost);
        self
    }

    pub fn with_session_ttl(mut self, session_ttl: chrono::Duration) -> Self {
        self.auth = self.auth.with_session_ttl(session_ttl);
        self
    }
}
