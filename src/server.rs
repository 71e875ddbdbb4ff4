use axum::{Router, routing::get};
use std::{net::SocketAddr, str::FromStr};

use crate::{Res, api, api::AppState, success};

/// Builds the application router.
///
/// Every route answers `GET` only; other methods get a `405` page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::home).fallback(api::method_not_allowed))
        .route("/artists", get(api::artists).fallback(api::method_not_allowed))
        .route(
            "/artist/{id}",
            get(api::artist_detail).fallback(api::method_not_allowed),
        )
        .route("/search", get(api::search).fallback(api::method_not_allowed))
        .route(
            "/suggestions",
            get(api::suggestions).fallback(api::json_method_not_allowed),
        )
        .route("/map", get(api::map).fallback(api::method_not_allowed))
        .route(
            "/location/{name}",
            get(api::location).fallback(api::method_not_allowed),
        )
        .route("/gims", get(api::named_artist).fallback(api::method_not_allowed))
        .route("/health", get(api::health))
        .fallback(api::not_found)
        .with_state(state)
}

/// Binds `addr` and serves the application until the process stops.
pub async fn start_server(state: AppState, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| format!("Failed to parse server address {:?}: {}", addr, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    success!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
