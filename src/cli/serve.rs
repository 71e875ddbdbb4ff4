use std::sync::Arc;

use crate::{
    api::{AppState, PlainRenderer},
    config::Settings,
    error, info,
    management::Catalog,
    server::start_server,
    warning,
};

/// Starts the web application on `addr` (or `SERVER_ADDRESS`).
///
/// With `open` the home page is opened in the default browser once the
/// server is about to accept connections.
pub async fn serve(addr: Option<String>, open: bool) {
    let settings = Settings::from_env();
    if !settings.credentials_configured() {
        warning!(
            "Spotify credentials are not configured; artist pages will show an error until SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are set"
        );
    }

    let catalog = match Catalog::new(&settings) {
        Ok(c) => c,
        Err(e) => error!("Cannot set up the catalog. Err: {}", e),
    };
    let state = AppState::new(catalog, Arc::new(PlainRenderer));
    let addr = addr.unwrap_or_else(|| settings.server_addr.clone());

    if open {
        let url = format!("http://{}/", addr);
        if webbrowser::open(&url).is_err() {
            warning!("Failed to open browser. Please navigate to {} manually", url);
        }
    }

    info!("Starting server on {}", addr);
    if let Err(e) = start_server(state, &addr).await {
        error!("Server stopped. Err: {}", e);
    }
}
