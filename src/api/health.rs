use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::api::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let cached = state.catalog.snapshot().await.map_or(0, |a| a.len());
    let age = state.catalog.snapshot_age().await.map(|d| d.as_secs());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cached_artists": cached,
        "cache_age_secs": age,
        "aggregations": state.catalog.aggregation_count(),
    }))
}
