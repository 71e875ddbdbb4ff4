use std::time::{Duration, Instant};

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, header};
use tokio::sync::Mutex;

use crate::{config::Settings, error::AppError, info, types::TokenResponse};

/// A bearer token obtained through the client-credentials grant.
///
/// Tokens are replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    /// Whether the token can still be used `margin` from now.
    pub fn is_usable(&self, margin: Duration) -> bool {
        Instant::now() + margin < self.expires_at
    }
}

/// Holds the application's Spotify access token and renews it on demand.
///
/// The held token sits behind a short-lived lock that is never kept across the
/// token request. Renewals go through a separate gate so that concurrent
/// callers hitting an expired token trigger a single request to the token
/// endpoint and all receive its result.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    credentials_configured: bool,
    safety_margin: Duration,
    default_ttl: Duration,
    held: Mutex<Option<AccessToken>>,
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    pub fn new(http: Client, settings: &Settings) -> Self {
        TokenManager {
            http,
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            credentials_configured: settings.credentials_configured(),
            safety_margin: settings.token_safety_margin,
            default_ttl: settings.default_token_ttl,
            held: Mutex::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Returns a token that is valid beyond the safety margin.
    ///
    /// The held token is returned unchanged when it is still usable; otherwise
    /// a new one is requested with the client-credentials grant and stored.
    ///
    /// # Errors
    ///
    /// - `AppError::Config` if the client ID or secret is missing or still the
    ///   placeholder. No request is made in that case.
    /// - `AppError::Auth` if the token endpoint answers with a non-2xx status,
    ///   an unreadable body or an empty `access_token`, or cannot be reached.
    pub async fn ensure_valid_token(&self) -> Result<AccessToken, AppError> {
        if !self.credentials_configured {
            return Err(AppError::Config(
                "Spotify credentials are not configured: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET".to_string(),
            ));
        }

        if let Some(token) = self.usable_token().await {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;
        // another caller may have renewed while we waited at the gate
        if let Some(token) = self.usable_token().await {
            return Ok(token);
        }

        let token = self.request_token().await?;
        *self.held.lock().await = Some(token.clone());
        Ok(token)
    }

    /// Drops the held token if it is still the one that was rejected.
    ///
    /// Comparing against `rejected` keeps a token that a concurrent caller has
    /// just renewed from being thrown away.
    pub async fn invalidate(&self, rejected: &str) {
        let mut held = self.held.lock().await;
        if held.as_ref().is_some_and(|t| t.value == rejected) {
            *held = None;
        }
    }

    /// The held token, whether or not it is still usable.
    pub async fn current(&self) -> Option<AccessToken> {
        self.held.lock().await.clone()
    }

    async fn usable_token(&self) -> Option<AccessToken> {
        let held = self.held.lock().await;
        held.as_ref()
            .filter(|t| t.is_usable(self.safety_margin))
            .cloned()
    }

    async fn request_token(&self) -> Result<AccessToken, AppError> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(&self.token_url)
            .header(header::AUTHORIZATION, format!("Basic {}", credentials))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::auth(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::auth(Some(status.as_u16()), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::auth(Some(status.as_u16()), e.to_string()))?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::auth(
                Some(status.as_u16()),
                format!("malformed token response: {}", e),
            )
        })?;

        if parsed.access_token.trim().is_empty() {
            return Err(AppError::auth(Some(status.as_u16()), "empty token"));
        }

        let ttl = match parsed.expires_in {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => self.default_ttl,
        };
        info!("Obtained Spotify access token (valid for {}s)", ttl.as_secs());

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: Instant::now() + ttl,
        })
    }
}
