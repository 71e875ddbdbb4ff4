//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used to build the
//! artist catalog. It handles application authentication, artist search and
//! every per-artist lookup shown on the detail pages.
//!
//! ## Architecture
//!
//! ```text
//! Catalog (management)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 client credentials)
//!     ├── Search / profile / top tracks / albums / related artists
//!     └── Earliest-album resolution
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Client-credentials token manager. Tokens are renewed before
//!   they come within the configured safety margin of their expiry and after
//!   the API rejects them with `401`.
//! - [`client`] - Authenticated calls. `401` answers trigger exactly one silent
//!   re-authentication and retry, short `Retry-After` delays on `429` are
//!   honoured, and every call carries the configured client-side timeout.
//! - [`albums`] - Pure release-date helpers used to find an artist's first album.
//!
//! ## Error Types
//!
//! All operations return [`crate::error::AppError`]:
//! - `Config` when credentials are missing (no request is sent)
//! - `Auth` when the token endpoint refuses the credentials
//! - `NotFound` on `404`
//! - `Upstream` on any other failure, including timeouts
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials grant
//! - `GET /search?type=artist`
//! - `GET /artists/{id}`
//! - `GET /artists/{id}/top-tracks`
//! - `GET /artists/{id}/albums`
//! - `GET /artists/{id}/related-artists`

pub mod albums;
pub mod auth;
pub mod client;

pub use auth::{AccessToken, TokenManager};
pub use client::SpotifyClient;
