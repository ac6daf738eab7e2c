use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::AppState,
    middleware::{make_span_with_request_id, request_id_middleware},
};

pub mod auth;
pub mod movies;
pub mod stats;
pub mod watchlist;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Catalog
        .route("/movies", get(movies::home))
        .route("/movies/:movie_id", get(movies::details))
        // Watchlist
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route("/watchlist/stats", get(stats::counts))
        .route("/watchlist/:movie_id", delete(watchlist::remove))
        .route("/watchlist/:movie_id/toggle", post(watchlist::toggle))
        .route("/watchlist/:movie_id/rating", put(watchlist::rate))
        .route("/watchlist/:movie_id/notes", put(watchlist::notes))
        // Statistics
        .route("/stats", get(stats::statistics))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
