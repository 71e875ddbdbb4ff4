use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{
    api::{
        AppState,
        render::{render_error, render_page},
    },
    error::AppError,
    types::Artist,
    utils::{self, FilterOptions},
    warning,
};

/// Spelling variants tried by the named-artist shortcut, in order.
pub const NAMED_ARTIST_VARIANTS: [&str; 4] = ["GIMS", "Gims", "Maître Gims", "Maitre Gims"];

/// Number of results of the free-text search page.
const SEARCH_LIMIT: u32 = 20;

pub async fn home(State(state): State<AppState>) -> Response {
    render_page(&state, StatusCode::OK, "home.html", json!({ "Title": "Home" }))
}

/// Artist list with the optional `q` search and the filter form.
///
/// An aggregation failure still renders the page, with no artists and the
/// error in `Error`.
pub async fn artists(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let options = FilterOptions::from_pairs(&pairs);
    let query = pairs
        .iter()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();

    if query.chars().count() > utils::MAX_QUERY_LEN {
        let err = AppError::BadRequest(format!(
            "search query must be 1-{} characters long",
            utils::MAX_QUERY_LEN
        ));
        return render_error(&state, &err);
    }

    let (all, error) = load_artists(&state).await;
    let mut shown = utils::filter_artists(&all, &options);
    if !query.is_empty() {
        shown = utils::search_artists(&shown, &query);
    }

    let data = json!({
        "Title": "Artists",
        "Artists": shown,
        "Total": all.len(),
        "Query": query,
        "Filters": options,
        "Genres": utils::unique_genres(&all),
        "Locations": utils::popular_locations(),
        "Error": error,
    });
    render_page(&state, StatusCode::OK, "artists.html", data)
}

pub async fn artist_detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match raw_id.trim().parse::<u32>() {
        Ok(id) if id >= 1 => id,
        _ => {
            let err = AppError::BadRequest(format!("invalid artist ID {:?}", raw_id));
            return render_error(&state, &err);
        }
    };

    match state.catalog.get_artist_detail(id).await {
        Ok(detail) => {
            let durations: Vec<String> = detail
                .top_tracks
                .iter()
                .map(|t| utils::format_duration(t.duration_ms))
                .collect();
            let data = json!({
                "Title": format!("Details of {}", detail.artist.name),
                "Followers": utils::format_number(detail.artist.followers),
                "TrackDurations": durations,
                "Artist": detail,
            });
            render_page(&state, StatusCode::OK, "artist_details.html", data)
        }
        Err(e) => render_error(&state, &e),
    }
}

/// Free-text search against the upstream.
///
/// An empty query redirects to the list; an upstream failure renders the
/// list template with the error instead of a 500 page.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let raw = params.get("q").map(String::as_str).unwrap_or("");
    if raw.trim().is_empty() {
        return Redirect::to("/artists").into_response();
    }
    let query = match utils::validate_query(raw) {
        Ok(q) => q,
        Err(msg) => return render_error(&state, &AppError::BadRequest(msg)),
    };

    let (found, error) = match state.catalog.search_upstream(query, SEARCH_LIMIT).await {
        Ok(found) => (found, None),
        Err(e) => {
            warning!("Search for {:?} failed: {}", query, e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let data = json!({
        "Title": format!("Search results for: {}", query),
        "Artists": found,
        "Query": query,
        "Error": error,
    });
    render_page(&state, StatusCode::OK, "artists.html", data)
}

pub async fn map(State(state): State<AppState>) -> Response {
    let locations = state.catalog.map_locations().await;
    let locations_json = serde_json::to_string(&locations).unwrap_or_else(|_| "[]".to_string());

    let data = json!({
        "Title": "Interactive map",
        "Locations": locations,
        "LocationsJSON": locations_json,
    });
    render_page(&state, StatusCode::OK, "map.html", data)
}

pub async fn location(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let name = name.trim().to_string();
    if name.is_empty() {
        return render_error(&state, &AppError::BadRequest("invalid location".to_string()));
    }

    let (all, error) = load_artists(&state).await;
    let data = json!({
        "Title": format!("Artists related to {}", name),
        "Location": name,
        "Artists": utils::artists_for_location(&all, &name),
        "Error": error,
    });
    render_page(&state, StatusCode::OK, "location.html", data)
}

/// Sends the named artist to its detail page.
///
/// Falls back to a search for the resolved name when the artist is not in the
/// current snapshot, and to the list page when no variant resolves.
pub async fn named_artist(State(state): State<AppState>) -> Response {
    match state
        .catalog
        .resolve_artist_name(&NAMED_ARTIST_VARIANTS)
        .await
    {
        Some(resolved) => match resolved.local_id {
            Some(id) => Redirect::to(&format!("/artist/{}", id)).into_response(),
            None => Redirect::to(&format!(
                "/search?q={}",
                urlencoding::encode(&resolved.name)
            ))
            .into_response(),
        },
        None => Redirect::to("/artists").into_response(),
    }
}

pub async fn not_found(State(state): State<AppState>) -> Response {
    render_error(&state, &AppError::NotFound("page".to_string()))
}

pub async fn method_not_allowed(State(state): State<AppState>) -> Response {
    render_error(&state, &AppError::MethodNotAllowed)
}

async fn load_artists(state: &AppState) -> (Vec<Artist>, Option<String>) {
    match state.catalog.get_artists().await {
        Ok(artists) => (artists, None),
        Err(e) => {
            warning!("Could not load artists: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    }
}
