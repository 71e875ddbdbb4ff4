use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{api::AppState, utils, warning};

/// Autosuggest names for the search box, as a JSON array.
///
/// Never fails on upstream errors: the box simply shows no suggestions.
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = params.get("q").map(|q| q.trim()).unwrap_or("");
    if query.is_empty() {
        return Json(Vec::<String>::new()).into_response();
    }
    if query.chars().count() > utils::MAX_QUERY_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "query too long" })),
        )
            .into_response();
    }

    match state.catalog.get_artists().await {
        Ok(artists) => Json(utils::suggestions(&artists, query)).into_response(),
        Err(e) => {
            warning!("Suggestions unavailable: {}", e);
            Json(Vec::<String>::new()).into_response()
        }
    }
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method not allowed" })),
    )
        .into_response()
}
