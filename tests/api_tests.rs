use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use reelbook::{
    api::AppState,
    db::{MemoryStore, WatchlistStore},
    error::{AppError, AppResult},
    models::{
        CrewMember, InsertOutcome, MovieDetails, MovieSummary, NewWatchlistEntry, WatchlistEntry,
    },
    routes::create_router,
    services::MovieCatalog,
};

/// Catalog with three known movies; the popular listing is always down
struct StubCatalog;

fn summary(id: i64, title: &str, release_date: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{}.jpg", id)),
        release_date: release_date.to_string(),
        vote_average: Some(8.0),
        overview: None,
    }
}

fn details(id: i64, title: &str, release_date: &str, genres: &[&str]) -> MovieDetails {
    MovieDetails {
        summary: summary(id, title, release_date),
        backdrop_path: None,
        runtime: Some(120),
        tagline: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        cast: Vec::new(),
        crew: vec![CrewMember {
            name: "Some Director".to_string(),
            job: "Director".to_string(),
            profile_path: None,
        }],
        videos: Vec::new(),
    }
}

#[async_trait::async_trait]
impl MovieCatalog for StubCatalog {
    async fn search_by_title(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        let query = query.to_lowercase();
        Ok([
            summary(550, "Fight Club", "1999-10-15"),
            summary(603, "The Matrix", "1999-03-30"),
            summary(155, "The Dark Knight", "2008-07-16"),
        ]
        .into_iter()
        .filter(|m| m.title.to_lowercase().contains(&query))
        .collect())
    }

    async fn get_by_id(&self, movie_id: i64) -> AppResult<MovieDetails> {
        match movie_id {
            550 => Ok(details(550, "Fight Club", "1999-10-15", &["Drama", "Thriller"])),
            603 => Ok(details(
                603,
                "The Matrix",
                "1999-03-30",
                &["Action", "Science Fiction"],
            )),
            155 => Ok(details(
                155,
                "The Dark Knight",
                "2008-07-16",
                &["Action", "Crime", "Drama"],
            )),
            _ => Err(AppError::NotFound("Movie not found".to_string())),
        }
    }

    async fn trending(&self) -> AppResult<Vec<MovieSummary>> {
        Ok((1..=12)
            .map(|i| summary(i, &format!("Trending {}", i), "2024-01-01"))
            .collect())
    }

    async fn popular(&self) -> AppResult<Vec<MovieSummary>> {
        Err(AppError::ExternalApi("upstream unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Watchlist store whose database is unreachable
struct UnavailableStore;

fn pool_timeout<T>() -> AppResult<T> {
    Err(AppError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait::async_trait]
impl WatchlistStore for UnavailableStore {
    async fn insert(&self, _: Uuid, _: NewWatchlistEntry) -> AppResult<InsertOutcome> {
        pool_timeout()
    }

    async fn delete(&self, _: Uuid, _: i64) -> AppResult<Option<WatchlistEntry>> {
        pool_timeout()
    }

    async fn find(&self, _: Uuid, _: i64) -> AppResult<Option<WatchlistEntry>> {
        pool_timeout()
    }

    async fn toggle_watched(&self, _: Uuid, _: i64) -> AppResult<Option<WatchlistEntry>> {
        pool_timeout()
    }

    async fn set_rating(&self, _: Uuid, _: i64, _: u8) -> AppResult<Option<WatchlistEntry>> {
        pool_timeout()
    }

    async fn set_notes(
        &self,
        _: Uuid,
        _: i64,
        _: Option<String>,
    ) -> AppResult<Option<WatchlistEntry>> {
        pool_timeout()
    }

    async fn entries_for_user(&self, _: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        pool_timeout()
    }
}

fn create_test_server() -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store,
        Arc::new(StubCatalog),
        "https://images.test/w500".to_string(),
    )
    .with_hash_cost(4);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn register(server: &TestServer, username: &str) {
    server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123",
            "confirm_password": "secret123"
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

/// Registers and logs in, returning the bearer token
async fn sign_in(server: &TestServer, username: &str) -> String {
    register(server, username).await;
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": username, "password": "secret123" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

async fn add_movie(server: &TestServer, token: &str, movie_id: i64, title: &str, date: &str) {
    server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({
            "movie_id": movie_id,
            "title": title,
            "release_date": date,
            "vote_average": 8.0
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn get_json(server: &TestServer, token: &str, path: &str) -> Value {
    let response = server.get(path).add_header(AUTHORIZATION, bearer(token)).await;
    response.assert_status_ok();
    response.json()
}

fn titles(view: &Value) -> Vec<String> {
    view["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let server = create_test_server();
    let token = sign_in(&server, "alice").await;

    let me = get_json(&server, &token, "/api/v1/auth/me").await;
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let server = create_test_server();

    server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "secret123",
            "confirm_password": "different"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    register(&server, "bob").await;
    server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "bob",
            "email": "other@example.com",
            "password": "secret123",
            "confirm_password": "secret123"
        }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = create_test_server();
    register(&server, "carol").await;

    server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "carol", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_watchlist_requires_session() {
    let server = create_test_server();

    server
        .get("/api/v1/watchlist")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&uuid::Uuid::new_v4().to_string()))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = create_test_server();
    let token = sign_in(&server, "dave").await;

    server
        .post("/api/v1/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_resolves_genres_and_rejects_duplicates() {
    let server = create_test_server();
    let token = sign_in(&server, "erin").await;

    // Add a movie; genres come from the catalog, not the request
    let response = server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "movie_id": 550, "title": "Fight Club", "release_date": "1999-10-15" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "\"Fight Club\" added to your watchlist!");
    assert_eq!(body["entry"]["genres"], json!(["Drama", "Thriller"]));
    assert_eq!(body["entry"]["watched"], false);

    // Adding it again is reported but leaves one entry
    let response = server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "movie_id": 550, "title": "Fight Club" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "\"Fight Club\" is already in your watchlist!");

    let view = get_json(&server, &token, "/api/v1/watchlist").await;
    assert_eq!(view["total"], 1);
}

#[tokio::test]
async fn test_add_survives_catalog_miss() {
    let server = create_test_server();
    let token = sign_in(&server, "frank").await;

    let response = server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "movie_id": 999, "title": "Obscure Film" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["entry"]["genres"], json!([]));
    assert_eq!(body["entry"]["release_date"], "");
}

#[tokio::test]
async fn test_add_requires_title() {
    let server = create_test_server();
    let token = sign_in(&server, "grace").await;

    server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "movie_id": 550, "title": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let server = create_test_server();
    let token = sign_in(&server, "heidi").await;

    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;
    add_movie(&server, &token, 603, "The Matrix", "1999-03-30").await;
    add_movie(&server, &token, 155, "The Dark Knight", "2008-07-16").await;

    server
        .post("/api/v1/watchlist/603/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    // Default ordering is newest first
    let view = get_json(&server, &token, "/api/v1/watchlist").await;
    assert_eq!(
        titles(&view),
        vec!["The Dark Knight", "The Matrix", "Fight Club"]
    );
    assert_eq!(view["selected_sort"], "date_added_desc");
    assert_eq!(view["selected_status"], "all");
    assert_eq!(view["total"], 3);
    assert_eq!(view["watched"], 1);
    assert_eq!(view["unwatched"], 2);
    assert_eq!(
        view["genres"],
        json!(["Action", "Crime", "Drama", "Science Fiction", "Thriller"])
    );
    assert_eq!(view["image_base"], "https://images.test/w500");

    let view = get_json(&server, &token, "/api/v1/watchlist?status=watched").await;
    assert_eq!(titles(&view), vec!["The Matrix"]);

    let view = get_json(&server, &token, "/api/v1/watchlist?genre=action&sort=title_asc").await;
    assert_eq!(titles(&view), vec!["The Dark Knight", "The Matrix"]);
    assert_eq!(view["selected_genre"], "action");

    let view = get_json(&server, &token, "/api/v1/watchlist?sort=year_asc").await;
    assert_eq!(
        titles(&view),
        vec!["The Matrix", "Fight Club", "The Dark Knight"]
    );

    let view = get_json(&server, &token, "/api/v1/watchlist?q=MATRIX").await;
    assert_eq!(titles(&view), vec!["The Matrix"]);
    assert_eq!(view["search_query"], "MATRIX");

    // Unknown sort keys fall back to the default ordering
    let view = get_json(&server, &token, "/api/v1/watchlist?sort=bogus").await;
    assert_eq!(view["selected_sort"], "date_added_desc");
    assert_eq!(
        titles(&view),
        vec!["The Dark Knight", "The Matrix", "Fight Club"]
    );

    // Filters narrow the entries but not the counts
    let view = get_json(&server, &token, "/api/v1/watchlist?genre=Thriller&status=watched").await;
    assert!(titles(&view).is_empty());
    assert_eq!(view["total"], 3);
}

#[tokio::test]
async fn test_toggle_flips_status() {
    let server = create_test_server();
    let token = sign_in(&server, "ivan").await;
    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;

    let response = server
        .post("/api/v1/watchlist/550/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["new_status"], true);
    assert_eq!(body["message"], "\"Fight Club\" marked as watched!");

    let response = server
        .post("/api/v1/watchlist/550/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["new_status"], false);
    assert_eq!(body["message"], "\"Fight Club\" marked as unwatched!");

    let response = server
        .post("/api/v1/watchlist/603/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rate_validates_range() {
    let server = create_test_server();
    let token = sign_in(&server, "judy").await;
    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;

    for rating in [0, 6, -1] {
        server
            .put("/api/v1/watchlist/550/rating")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "rating": rating }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let response = server
        .put("/api/v1/watchlist/550/rating")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "rating": 4 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Rated \"Fight Club\" 4 stars!");
    assert_eq!(body["entry"]["personal_rating"], 4);

    server
        .put("/api/v1/watchlist/603/rating")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "rating": 3 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notes_overwrite_and_clear() {
    let server = create_test_server();
    let token = sign_in(&server, "ken").await;
    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;

    let response = server
        .put("/api/v1/watchlist/550/notes")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "notes": "Rewatch with friends" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Notes updated for \"Fight Club\"!");
    assert_eq!(body["entry"]["notes"], "Rewatch with friends");

    let response = server
        .put("/api/v1/watchlist/550/notes")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "notes": "  " }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["entry"]["notes"], Value::Null);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let server = create_test_server();
    let token = sign_in(&server, "leo").await;
    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;

    // Remove it
    let response = server
        .delete("/api/v1/watchlist/550")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "\"Fight Club\" removed from your watchlist!");

    // Removing again is a no-op
    let response = server
        .delete("/api/v1/watchlist/550")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let view = get_json(&server, &token, "/api/v1/watchlist").await;
    assert_eq!(view["total"], 0);
}

#[tokio::test]
async fn test_statistics() {
    let server = create_test_server();
    let token = sign_in(&server, "mallory").await;

    let empty = get_json(&server, &token, "/api/v1/stats").await;
    assert_eq!(empty["total"], 0);
    assert_eq!(empty["average_rating"], Value::Null);
    assert_eq!(empty["genres"], json!([]));

    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;
    add_movie(&server, &token, 603, "The Matrix", "1999-03-30").await;
    add_movie(&server, &token, 155, "The Dark Knight", "2008-07-16").await;

    // Rate two of the three and mark one watched
    for (movie_id, rating) in [(550, 5), (603, 4)] {
        server
            .put(&format!("/api/v1/watchlist/{}/rating", movie_id))
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "rating": rating }))
            .await
            .assert_status_ok();
    }
    server
        .post("/api/v1/watchlist/550/toggle")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let stats = get_json(&server, &token, "/api/v1/stats").await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["watched"], 1);
    assert_eq!(stats["unwatched"], 2);
    assert_eq!(stats["average_rating"], 4.5);
    assert_eq!(
        stats["years"],
        json!([{ "key": "2008", "count": 1 }, { "key": "1999", "count": 2 }])
    );
    assert_eq!(stats["genres"][0], json!({ "key": "Drama", "count": 2 }));
    assert_eq!(stats["genres"][1], json!({ "key": "Action", "count": 2 }));
    assert_eq!(stats["recent_additions"][0]["title"], "The Dark Knight");
    assert_eq!(
        stats["top_rated"],
        json!([
            { "title": "Fight Club", "personal_rating": 5 },
            { "title": "The Matrix", "personal_rating": 4 }
        ])
    );

    let counts = get_json(&server, &token, "/api/v1/watchlist/stats").await;
    assert_eq!(counts, json!({ "total": 3, "watched": 1, "unwatched": 2 }));
}

#[tokio::test]
async fn test_users_are_isolated() {
    let server = create_test_server();
    let alice = sign_in(&server, "alice").await;
    let bob = sign_in(&server, "bob").await;

    add_movie(&server, &alice, 550, "Fight Club", "1999-10-15").await;

    let view = get_json(&server, &bob, "/api/v1/watchlist").await;
    assert!(titles(&view).is_empty());
    assert_eq!(view["total"], 0);

    server
        .post("/api/v1/watchlist/550/toggle")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .delete("/api/v1/watchlist/550")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await;
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    // Bob can add the same movie independently
    add_movie(&server, &bob, 550, "Fight Club", "1999-10-15").await;

    let view = get_json(&server, &alice, "/api/v1/watchlist").await;
    assert_eq!(view["total"], 1);
    assert_eq!(view["entries"][0]["watched"], false);
}

#[tokio::test]
async fn test_movie_details_include_own_entry() {
    let server = create_test_server();
    let token = sign_in(&server, "nina").await;

    let response = server.get("/api/v1/movies/550").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["movie"]["title"], "Fight Club");
    assert_eq!(body["director"]["name"], "Some Director");
    assert_eq!(body["watchlist_entry"], Value::Null);

    add_movie(&server, &token, 550, "Fight Club", "1999-10-15").await;

    let body = get_json(&server, &token, "/api/v1/movies/550").await;
    assert_eq!(body["watchlist_entry"]["movie_id"], 550);

    server
        .get("/api/v1/movies/424242")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_details_survive_watchlist_outage() {
    // Accounts work, watchlist storage does not
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(UnavailableStore),
        Arc::new(StubCatalog),
        "https://images.test/w500".to_string(),
    )
    .with_hash_cost(4);
    let server = TestServer::new(create_router(state)).unwrap();
    let token = sign_in(&server, "oscar").await;

    // The details page degrades to the bare catalog record
    let body = get_json(&server, &token, "/api/v1/movies/550").await;
    assert_eq!(body["movie"]["title"], "Fight Club");
    assert_eq!(body["watchlist_entry"], Value::Null);

    // The watchlist itself has nothing to fall back on
    server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_home_listings_and_search() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["trending"].as_array().unwrap().len(), 8);
    // Popular listing is down, which only empties that list
    assert_eq!(body["popular"], json!([]));
    assert_eq!(body["query"], Value::Null);

    let response = server.get("/api/v1/movies?q=matrix").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["query"], "matrix");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["id"], 603);
    assert_eq!(body["trending"], json!([]));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&request_id).unwrap(),
        )
        .await;
    assert_eq!(response.header("x-request-id"), request_id.as_str());
}
