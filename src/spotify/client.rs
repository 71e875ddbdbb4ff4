use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config::Settings,
    error::AppError,
    spotify::{
        albums::{EARLIEST_ALBUM_SCAN_LIMIT, earliest_album},
        auth::TokenManager,
    },
    types::{
        AlbumInfo, AlbumsResponse, ArtistDetail, EarliestAlbum, RelatedArtistInfo,
        RelatedArtistsResponse, SearchResponse, TopTracksResponse, TrackInfo, UpstreamArtist,
        UpstreamArtistFull, first_image,
    },
    warning,
};

/// Largest page size accepted by the search and albums endpoints.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Number of albums listed on an artist's detail view.
pub const DETAIL_ALBUM_LIMIT: u32 = 20;

/// Longest `Retry-After` we are willing to wait for inside a request.
const MAX_RETRY_AFTER_SECS: u64 = 2;

/// Authenticated client for the Spotify Web API.
///
/// Every call obtains its bearer token from the [`TokenManager`]. A `401`
/// answer invalidates that token, triggers one re-authentication and one
/// retry; a second `401` is reported as `AppError::Upstream`.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    market: String,
    tokens: TokenManager,
}

impl SpotifyClient {
    /// Builds a client with the request timeout from `settings`.
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(SpotifyClient {
            tokens: TokenManager::new(http.clone(), settings),
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            market: settings.market.clone(),
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Searches artists matching `query`.
    ///
    /// `limit` is clamped into `1..=50`. Entries without an ID or a name are
    /// dropped.
    ///
    /// # Example
    ///
    /// ```
    /// let artists = client.search_artists("jazz", 15).await?;
    /// ```
    pub async fn search_artists(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<UpstreamArtist>, AppError> {
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let url = format!("{}/search", self.api_url);
        let params = [
            ("q", query.to_string()),
            ("type", "artist".to_string()),
            ("limit", limit.to_string()),
        ];

        let res: SearchResponse = self.get_json(&url, &params).await?;

        Ok(res
            .artists
            .items
            .into_iter()
            .filter(|a| !a.id.trim().is_empty() && !a.name.trim().is_empty())
            .collect())
    }

    /// Returns the best match for `name`, or `AppError::NotFound`.
    pub async fn find_artist_by_name(&self, name: &str) -> Result<UpstreamArtist, AppError> {
        self.search_artists(name, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("no Spotify artist named {:?}", name)))
    }

    /// Fetches the full profile of an artist.
    ///
    /// # Errors
    ///
    /// `AppError::NotFound` on `404`, `AppError::Upstream` on any other
    /// non-2xx answer.
    pub async fn fetch_full_profile(
        &self,
        external_id: &str,
    ) -> Result<UpstreamArtistFull, AppError> {
        if external_id.trim().is_empty() {
            return Err(AppError::NotFound("empty Spotify artist ID".to_string()));
        }
        let url = format!("{}/artists/{}", self.api_url, external_id);
        self.get_json(&url, &[]).await
    }

    pub async fn fetch_top_tracks(&self, external_id: &str) -> Result<Vec<TrackInfo>, AppError> {
        let url = format!("{}/artists/{}/top-tracks", self.api_url, external_id);
        let res: TopTracksResponse = self
            .get_json(&url, &[("market", self.market.clone())])
            .await?;

        Ok(res
            .tracks
            .into_iter()
            .map(|t| TrackInfo {
                name: t.name,
                album_name: t.album.name,
                duration_ms: t.duration_ms,
                preview_url: t.preview_url.unwrap_or_default(),
                spotify_url: t.external_urls.spotify,
            })
            .collect())
    }

    pub async fn fetch_albums(&self, external_id: &str) -> Result<Vec<AlbumInfo>, AppError> {
        let url = format!("{}/artists/{}/albums", self.api_url, external_id);
        let params = [
            ("limit", DETAIL_ALBUM_LIMIT.to_string()),
            ("market", self.market.clone()),
        ];
        let res: AlbumsResponse = self.get_json(&url, &params).await?;

        Ok(res
            .items
            .into_iter()
            .map(|a| AlbumInfo {
                image_url: first_image(&a.images),
                name: a.name,
                release_date: a.release_date,
                total_tracks: a.total_tracks,
                spotify_url: a.external_urls.spotify,
            })
            .collect())
    }

    pub async fn fetch_related_artists(
        &self,
        external_id: &str,
    ) -> Result<Vec<RelatedArtistInfo>, AppError> {
        let url = format!("{}/artists/{}/related-artists", self.api_url, external_id);
        let res: RelatedArtistsResponse = self.get_json(&url, &[]).await?;

        Ok(res
            .artists
            .into_iter()
            .map(|a| RelatedArtistInfo {
                image_url: first_image(&a.images),
                name: a.name,
                spotify_url: a.external_urls.spotify,
                genres: a.genres,
            })
            .collect())
    }

    /// Resolves the artist's oldest album among its first 50 albums.
    pub async fn fetch_earliest_album(&self, external_id: &str) -> Result<EarliestAlbum, AppError> {
        let url = format!("{}/artists/{}/albums", self.api_url, external_id);
        let params = [
            ("include_groups", "album".to_string()),
            ("limit", EARLIEST_ALBUM_SCAN_LIMIT.to_string()),
        ];
        let res: AlbumsResponse = self.get_json(&url, &params).await?;
        Ok(earliest_album(&res.items))
    }

    // Best-effort variants used while enriching. A failure is logged and
    // becomes `None`, so callers cannot forget to degrade the field.

    pub async fn top_tracks_or_none(&self, external_id: &str) -> Option<Vec<TrackInfo>> {
        best_effort("top tracks", external_id, self.fetch_top_tracks(external_id).await)
    }

    pub async fn albums_or_none(&self, external_id: &str) -> Option<Vec<AlbumInfo>> {
        best_effort("albums", external_id, self.fetch_albums(external_id).await)
    }

    pub async fn related_or_none(&self, external_id: &str) -> Option<Vec<RelatedArtistInfo>> {
        best_effort(
            "related artists",
            external_id,
            self.fetch_related_artists(external_id).await,
        )
    }

    pub async fn earliest_album_or_none(&self, external_id: &str) -> Option<EarliestAlbum> {
        best_effort(
            "earliest album",
            external_id,
            self.fetch_earliest_album(external_id).await,
        )
    }

    /// Fills the detail lists of `detail` from the upstream, best effort.
    pub async fn enrich_detail(&self, detail: &mut ArtistDetail) {
        let id = detail.artist.external_id.clone();
        let (tracks, albums, related) = tokio::join!(
            self.top_tracks_or_none(&id),
            self.albums_or_none(&id),
            self.related_or_none(&id),
        );
        detail.top_tracks = tracks.unwrap_or_default();
        detail.albums = albums.unwrap_or_default();
        detail.related_artists = related.unwrap_or_default();
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        let token = self.tokens.ensure_valid_token().await?;
        let mut response = self.send(url, params, &token.value).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warning!("Spotify rejected the access token, re-authenticating once");
            self.tokens.invalidate(&token.value).await;
            let token = self.tokens.ensure_valid_token().await?;
            response = self.send(url, params, &token.value).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::upstream(
                    Some(StatusCode::UNAUTHORIZED.as_u16()),
                    format!("still unauthorized after re-authentication: {}", body),
                ));
            }
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        Ok(response.json::<T>().await?)
    }

    async fn send(
        &self,
        url: &str,
        params: &[(&str, String)],
        token: &str,
    ) -> Result<Response, AppError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }

        // check for retry-after header
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        match retry_after {
            Some(secs) if secs <= MAX_RETRY_AFTER_SECS => {
                sleep(Duration::from_secs(secs)).await;
                Ok(self
                    .http
                    .get(url)
                    .query(params)
                    .bearer_auth(token)
                    .send()
                    .await?)
            }
            other => {
                warning!(
                    "Spotify rate limit hit, retry after {} seconds; giving up on this request",
                    other.map_or_else(|| "?".to_string(), |s| s.to_string())
                );
                Ok(response)
            }
        }
    }
}

fn best_effort<T>(what: &str, external_id: &str, result: Result<T, AppError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warning!("Could not fetch {} for {}: {}", what, external_id, e);
            None
        }
    }
}
