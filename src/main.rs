use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelbook::{
    api::AppState,
    config::Config,
    db::{create_pool, run_migrations, MemoryStore, PgStore, UserStore, WatchlistStore},
    routes::create_router,
    services::{MovieCatalog, TmdbCatalog},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelbook=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (users, watchlist): (Arc<dyn UserStore>, Arc<dyn WatchlistStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = create_pool(url, config.database_max_connections).await?;
                run_migrations(&pool).await?;
                let store = Arc::new(PgStore::new(pool));
                (store.clone(), store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };

    if config.tmdb_api_key.is_empty() {
        tracing::warn!("TMDB_API_KEY not set, catalog requests will fail");
    }

    let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        Duration::from_secs(config.catalog_timeout_secs),
    )?);

    let state = AppState::new(users, watchlist, catalog, config.tmdb_image_base.clone())
        .with_session_ttl(chrono::Duration::hours(config.session_ttl_hours));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
