#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use groupie_tracker::config::Settings;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::Mutex};

/// Behaviour of the fake Spotify/Groupie upstream.
#[derive(Clone, Default)]
pub struct FakeConfig {
    /// Status of the token endpoint, 200 when `None`.
    pub token_status: Option<u16>,
    /// Replaces the `access_token` value; `Some("")` yields an empty token.
    pub token_value: Option<String>,
    /// `expires_in` sent with the token, 3600 when `None`.
    pub expires_in: Option<u64>,
    /// Leave `expires_in` out of the token response altogether.
    pub omit_expires_in: bool,
    /// Search results by query.
    pub search: HashMap<String, Vec<Value>>,
    /// Queries answered with a 500.
    pub failing_queries: HashSet<String>,
    /// Number of data requests answered with a 401 before the real answer.
    pub unauthorized: usize,
    pub search_delay: Option<Duration>,
    /// Number of searches answered with a 429 before the real answer.
    pub rate_limited: usize,
    /// `Retry-After` of those 429s, 1 second when `None`.
    pub retry_after: Option<u64>,
    /// Full profiles by Spotify ID; unknown IDs are a 404.
    pub profiles: HashMap<String, Value>,
    /// Albums by Spotify ID.
    pub albums: HashMap<String, Vec<Value>>,
    /// Answer top tracks, detail albums and related artists with a 500.
    pub detail_lists_fail: bool,
    pub groupie_artists: Vec<Value>,
    pub groupie_relations: Vec<Value>,
}

#[derive(Default)]
pub struct Counters {
    pub token_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub album_calls: AtomicUsize,
    pub unauthorized_left: AtomicUsize,
    pub rate_limited_left: AtomicUsize,
    pub last_authorization: Mutex<Option<String>>,
    pub last_token_body: Mutex<Option<String>>,
}

struct Fake {
    config: FakeConfig,
    counters: Arc<Counters>,
}

pub struct FakeUpstream {
    pub base_url: String,
    pub counters: Arc<Counters>,
}

impl FakeUpstream {
    pub async fn start(config: FakeConfig) -> Self {
        let counters = Arc::new(Counters::default());
        counters
            .unauthorized_left
            .store(config.unauthorized, Ordering::SeqCst);
        counters
            .rate_limited_left
            .store(config.rate_limited, Ordering::SeqCst);

        let fake = Arc::new(Fake {
            config,
            counters: Arc::clone(&counters),
        });

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/artists/{id}", get(profile))
            .route("/v1/artists/{id}/top-tracks", get(top_tracks))
            .route("/v1/artists/{id}/albums", get(albums))
            .route("/v1/artists/{id}/related-artists", get(related))
            .route("/groupie/artists", get(groupie_artists))
            .route("/groupie/relation", get(groupie_relations))
            .with_state(fake);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeUpstream {
            base_url: format!("http://{}", addr),
            counters,
        }
    }

    /// Settings with working credentials pointed at this fake.
    pub fn settings(&self) -> Settings {
        self.unconfigured_settings().with_credentials("id", "secret")
    }

    /// Settings pointed at this fake but still carrying the placeholders.
    pub fn unconfigured_settings(&self) -> Settings {
        Settings::default()
            .with_spotify_base(&self.base_url)
            .with_groupie_url(&format!("{}/groupie", self.base_url))
            .with_http_timeout(Duration::from_secs(5))
    }

    pub fn token_calls(&self) -> usize {
        self.counters.token_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.counters.search_calls.load(Ordering::SeqCst)
    }

    pub fn album_calls(&self) -> usize {
        self.counters.album_calls.load(Ordering::SeqCst)
    }
}

pub fn artist_json(id: &str, name: &str, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "genres": genres,
        "images": [{ "url": format!("https://img.example/{}.jpg", id), "height": 640, "width": 640 }],
    })
}

pub fn album_json(name: &str, release_date: &str) -> Value {
    json!({
        "id": format!("album-{}", name),
        "name": name,
        "release_date": release_date,
        "total_tracks": 10,
        "external_urls": { "spotify": format!("https://open.spotify.com/album/{}", name) },
        "images": [],
    })
}

pub fn profile_json(id: &str, name: &str, followers: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "genres": ["french hip hop"],
        "popularity": 77,
        "followers": { "total": followers },
        "external_urls": { "spotify": format!("https://open.spotify.com/artist/{}", id) },
        "images": [{ "url": "https://img.example/profile.jpg" }],
    })
}

async fn token(State(fake): State<Arc<Fake>>, headers: HeaderMap, body: String) -> Response {
    let n = fake.counters.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    *fake.counters.last_authorization.lock().await = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *fake.counters.last_token_body.lock().await = Some(body);

    if let Some(status) = fake.config.token_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "invalid_client").into_response();
    }

    let value = fake
        .config
        .token_value
        .clone()
        .unwrap_or_else(|| format!("token-{}", n));
    let mut body = json!({ "access_token": value, "token_type": "Bearer" });
    if !fake.config.omit_expires_in {
        body["expires_in"] = json!(fake.config.expires_in.unwrap_or(3600));
    }
    Json(body).into_response()
}

/// Consumes one queued 401, if any.
fn reject(fake: &Fake, headers: &HeaderMap) -> Option<Response> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !bearer {
        return Some(StatusCode::UNAUTHORIZED.into_response());
    }

    let left = &fake.counters.unauthorized_left;
    if left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return Some(StatusCode::UNAUTHORIZED.into_response());
    }
    None
}

async fn search(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.counters.search_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(rejected) = reject(&fake, &headers) {
        return rejected;
    }
    if fake
        .counters
        .rate_limited_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        let retry_after = fake.config.retry_after.unwrap_or(1).to_string();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after)],
        )
            .into_response();
    }
    if let Some(delay) = fake.config.search_delay {
        tokio::time::sleep(delay).await;
    }

    let query = params.get("q").cloned().unwrap_or_default();
    if fake.config.failing_queries.contains(&query) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let items = fake.config.search.get(&query).cloned().unwrap_or_default();
    let total = items.len();
    Json(json!({ "artists": { "items": items, "total": total } })).into_response()
}

async fn profile(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejected) = reject(&fake, &headers) {
        return rejected;
    }
    match fake.config.profiles.get(&id) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such artist").into_response(),
    }
}

async fn top_tracks(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejected) = reject(&fake, &headers) {
        return rejected;
    }
    if fake.config.detail_lists_fail {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({
        "tracks": [{
            "id": format!("{}-t1", id),
            "name": "Hit",
            "duration_ms": 185_000,
            "preview_url": null,
            "external_urls": { "spotify": "https://open.spotify.com/track/t1" },
            "album": { "name": "Best Of", "images": [] },
        }]
    }))
    .into_response()
}

async fn albums(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.counters.album_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(rejected) = reject(&fake, &headers) {
        return rejected;
    }
    let scanning = params.get("include_groups").is_some_and(|g| g == "album");
    if fake.config.detail_lists_fail && !scanning {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let items = fake.config.albums.get(&id).cloned().unwrap_or_default();
    Json(json!({ "items": items })).into_response()
}

async fn related(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Some(rejected) = reject(&fake, &headers) {
        return rejected;
    }
    if fake.config.detail_lists_fail {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "artists": [artist_json("rel1", "Related One", &["pop"])] })).into_response()
}

async fn groupie_artists(State(fake): State<Arc<Fake>>) -> Json<Value> {
    Json(Value::Array(fake.config.groupie_artists.clone()))
}

async fn groupie_relations(State(fake): State<Arc<Fake>>) -> Json<Value> {
    Json(json!({ "index": fake.config.groupie_relations }))
}
