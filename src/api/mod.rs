//! # API Module
//!
//! HTTP handlers of the Groupie Tracker web application, built on
//! [Axum](https://docs.rs/axum).
//!
//! Handlers never produce markup themselves: they gather plain data from the
//! [`Catalog`] and pass it, together with a template name, to the configured
//! [`Renderer`]. Core errors are turned into exactly one of `400`, `404`,
//! `405` or `500` through [`crate::error::AppError::status_code`].
//!
//! ## Endpoints
//!
//! - [`home`] - landing page
//! - [`artists`] - artist list with free-text and filter criteria
//! - [`artist_detail`] - detail page by local ID
//! - [`search`] - free-text search against the upstream
//! - [`suggestions`] - JSON autosuggest
//! - [`map`] and [`location`] - concert locations
//! - [`named_artist`] - shortcut resolving a well-known artist name
//! - [`health`] - JSON health and cache status
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let state = AppState::new(catalog, Arc::new(PlainRenderer));
//! let app = groupie_tracker::server::router(state);
//! ```

mod health;
mod pages;
pub mod render;
mod suggestions;

use std::sync::Arc;

pub use health::health;
pub use pages::{
    NAMED_ARTIST_VARIANTS, artist_detail, artists, home, location, map, method_not_allowed,
    named_artist, not_found, search,
};
pub use render::{PlainRenderer, Renderer};
pub use suggestions::{method_not_allowed as json_method_not_allowed, suggestions};

use crate::management::Catalog;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(catalog: Catalog, renderer: Arc<dyn Renderer>) -> Self {
        AppState { catalog, renderer }
    }
}
