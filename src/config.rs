//! Configuration management for the Groupie Tracker.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. All values are collected once into a [`Settings`]
//! value which is handed to the long-lived catalog service and the HTTP server,
//! so nothing downstream reads the environment on its own.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults

use std::{env, path::PathBuf, time::Duration};

/// Placeholder used when `SPOTIFY_CLIENT_ID` is not set.
pub const CLIENT_ID_PLACEHOLDER: &str = "your_client_id_here";

/// Placeholder used when `SPOTIFY_CLIENT_SECRET` is not set.
pub const CLIENT_SECRET_PLACEHOLDER: &str = "your_client_secret_here";

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_GROUPIE_URL: &str = "https://groupietrackers.herokuapp.com/api";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_MARKET: &str = "FR";

/// Loads environment variables from `.env` files.
///
/// The file in the platform-specific local data directory is read first
/// (`groupie-tracker/.env`, the directory is created when missing), then a
/// `.env` in the current working directory. Variables that are already set
/// are never overwritten, and a missing file is not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/groupie-tracker/.env`
/// - macOS: `~/Library/Application Support/groupie-tracker/.env`
/// - Windows: `%LOCALAPPDATA%/groupie-tracker/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("groupie-tracker/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.exists() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Runtime settings shared by the upstream clients, the cache and the server.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
    pub groupie_url: String,
    pub server_addr: String,
    pub market: String,
    pub http_timeout: Duration,
    pub groupie_timeout: Duration,
    pub cache_ttl: Duration,
    pub token_safety_margin: Duration,
    pub default_token_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: CLIENT_ID_PLACEHOLDER.to_string(),
            client_secret: CLIENT_SECRET_PLACEHOLDER.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            groupie_url: DEFAULT_GROUPIE_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            market: DEFAULT_MARKET.to_string(),
            http_timeout: Duration::from_secs(10),
            groupie_timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(5 * 60),
            token_safety_margin: Duration::from_secs(60),
            default_token_ttl: Duration::from_secs(3600),
        }
    }
}

impl Settings {
    /// Builds settings from the process environment, falling back to defaults.
    ///
    /// Empty variables are treated like unset ones, so `SPOTIFY_CLIENT_ID=`
    /// still ends up as the placeholder and is reported as not configured.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            client_id: var_or("SPOTIFY_CLIENT_ID", defaults.client_id),
            client_secret: var_or("SPOTIFY_CLIENT_SECRET", defaults.client_secret),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", defaults.token_url),
            api_url: var_or("SPOTIFY_API_URL", defaults.api_url),
            groupie_url: var_or("GROUPIE_API_URL", defaults.groupie_url),
            server_addr: var_or("SERVER_ADDRESS", defaults.server_addr),
            market: var_or("SPOTIFY_MARKET", defaults.market),
            ..defaults
        }
    }

    /// Whether real Spotify credentials have been provided.
    pub fn credentials_configured(&self) -> bool {
        let id = self.client_id.trim();
        let secret = self.client_secret.trim();
        !id.is_empty()
            && !secret.is_empty()
            && id != CLIENT_ID_PLACEHOLDER
            && secret != CLIENT_SECRET_PLACEHOLDER
    }

    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = client_id.to_string();
        self.client_secret = client_secret.to_string();
        self
    }

    /// Points the Spotify token endpoint and Web API at `base`.
    ///
    /// The token endpoint becomes `{base}/api/token` and the API `{base}/v1`,
    /// mirroring the layout of the real services on a single host.
    pub fn with_spotify_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{}/api/token", base);
        self.api_url = format!("{}/v1", base);
        self
    }

    pub fn with_groupie_url(mut self, url: &str) -> Self {
        self.groupie_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_token_safety_margin(mut self, margin: Duration) -> Self {
        self.token_safety_margin = margin;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

fn var_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}
