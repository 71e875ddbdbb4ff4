use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{
    config::Settings,
    error::AppError,
    groupie::{GroupieClient, group_locations},
    info,
    management::aggregate::{Aggregator, SeedPlan},
    spotify::SpotifyClient,
    success,
    types::{Artist, ArtistDetail, MapLocation, UpstreamArtist},
    warning,
};

/// One aggregated snapshot and the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    artists: Vec<Artist>,
    fetched_at: Instant,
}

/// Outcome of resolving a well-known artist name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtist {
    pub name: String,
    pub external_id: String,
    /// Set when the artist is part of the current snapshot.
    pub local_id: Option<u32>,
}

/// The long-lived catalog service handed to every request handler.
///
/// It owns the upstream clients and the single cached artist snapshot.
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    spotify: SpotifyClient,
    groupie: GroupieClient,
    plan: SeedPlan,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
    refresh_gate: Mutex<()>,
    aggregations: AtomicUsize,
    /// Finished aggregation passes, successful or not.
    completed: AtomicUsize,
    /// Error of the last finished pass, `None` when it succeeded.
    last_error: Mutex<Option<AppError>>,
}

impl Catalog {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        Self::with_plan(settings, SeedPlan::default())
    }

    pub fn with_plan(settings: &Settings, plan: SeedPlan) -> Result<Self, AppError> {
        Ok(Catalog {
            inner: Arc::new(CatalogInner {
                spotify: SpotifyClient::new(settings)?,
                groupie: GroupieClient::new(settings)?,
                plan,
                ttl: settings.cache_ttl,
                entry: Mutex::new(None),
                refresh_gate: Mutex::new(()),
                aggregations: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                last_error: Mutex::new(None),
            }),
        })
    }

    pub fn spotify(&self) -> &SpotifyClient {
        &self.inner.spotify
    }

    /// Returns the cached artist list, aggregating a new one when stale.
    ///
    /// A snapshot younger than the TTL is copied out under the lock. On a miss
    /// the aggregation runs without holding the snapshot lock; concurrent
    /// misses queue on a refresh gate and receive the outcome of the pass that
    /// finished while they waited, error included, so one aggregation runs per
    /// stale period.
    ///
    /// The aggregation runs on its own task and completes even if the caller
    /// goes away.
    ///
    /// # Errors
    ///
    /// Propagates the aggregation error. The previous snapshot, if any, is
    /// left untouched in that case.
    pub async fn get_artists(&self) -> Result<Vec<Artist>, AppError> {
        if let Some(artists) = self.inner.fresh_snapshot().await {
            return Ok(artists);
        }

        let seen = self.inner.completed.load(Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.refresh(seen).await })
            .await
            .map_err(|e| AppError::upstream(None, format!("aggregation task failed: {}", e)))?
    }

    /// The current snapshot without triggering a refresh, fresh or not.
    pub async fn snapshot(&self) -> Option<Vec<Artist>> {
        self.inner
            .entry
            .lock()
            .await
            .as_ref()
            .map(|e| e.artists.clone())
    }

    /// Age of the current snapshot, if there is one.
    pub async fn snapshot_age(&self) -> Option<Duration> {
        self.inner
            .entry
            .lock()
            .await
            .as_ref()
            .map(|e| e.fetched_at.elapsed())
    }

    /// Drops the snapshot so the next read aggregates again.
    pub async fn invalidate(&self) {
        *self.inner.entry.lock().await = None;
    }

    /// How many aggregation passes ran since start.
    pub fn aggregation_count(&self) -> usize {
        self.inner.aggregations.load(Ordering::SeqCst)
    }

    /// Builds the detail view of the artist with local ID `local_id`.
    ///
    /// The ID is resolved against the cached snapshot, then the profile is
    /// fetched fresh; a failure there is returned. Top tracks, albums and
    /// related artists are fetched best effort and left empty on failure.
    /// Nothing of the detail is cached.
    pub async fn get_artist_detail(&self, local_id: u32) -> Result<ArtistDetail, AppError> {
        let artists = self.get_artists().await?;
        let mut artist = artists
            .into_iter()
            .find(|a| a.id == local_id)
            .ok_or_else(|| AppError::NotFound(format!("artist {}", local_id)))?;

        let full = self
            .inner
            .spotify
            .fetch_full_profile(&artist.external_id)
            .await?;

        if !full.images.is_empty() {
            artist.image_url = full.images[0].url.clone();
        }
        if !full.external_urls.spotify.is_empty() {
            artist.external_url = full.external_urls.spotify.clone();
        }
        artist.genres = full.genres;
        artist.popularity = full.popularity;
        artist.followers = full.followers.total;

        let mut detail = ArtistDetail {
            artist,
            ..ArtistDetail::default()
        };
        self.inner.spotify.enrich_detail(&mut detail).await;

        Ok(detail)
    }

    /// Free-text search straight against the upstream.
    ///
    /// Results that are part of the current snapshot carry their local ID;
    /// the others get ID 0 and are only reachable through their profile URL.
    pub async fn search_upstream(&self, query: &str, limit: u32) -> Result<Vec<Artist>, AppError> {
        let found = self.inner.spotify.search_artists(query, limit).await?;
        let snapshot = self.snapshot().await.unwrap_or_default();

        Ok(found
            .into_iter()
            .map(|a| to_search_result(a, &snapshot))
            .collect())
    }

    /// Resolves the first of `variants` the upstream knows about.
    ///
    /// Returns `None` when no spelling variant matches.
    pub async fn resolve_artist_name(&self, variants: &[&str]) -> Option<ResolvedArtist> {
        for variant in variants {
            match self.inner.spotify.find_artist_by_name(variant).await {
                Ok(found) => {
                    let local_id = self
                        .get_artists()
                        .await
                        .ok()
                        .and_then(|all| all.into_iter().find(|a| a.external_id == found.id))
                        .map(|a| a.id);
                    return Some(ResolvedArtist {
                        name: found.name,
                        external_id: found.id,
                        local_id,
                    });
                }
                Err(e) => warning!("Could not resolve {:?}: {}", variant, e),
            }
        }
        None
    }

    /// Concert locations from the Groupie API, or an empty list on failure.
    pub async fn map_locations(&self) -> Vec<MapLocation> {
        let groupie = &self.inner.groupie;
        match tokio::try_join!(groupie.fetch_artists(), groupie.fetch_relations()) {
            Ok((artists, relations)) => group_locations(&artists, &relations),
            Err(e) => {
                warning!("Could not load concert locations: {}", e);
                Vec::new()
            }
        }
    }
}

impl CatalogInner {
    async fn fresh_snapshot(&self) -> Option<Vec<Artist>> {
        let entry = self.entry.lock().await;
        entry
            .as_ref()
            .filter(|e| !e.artists.is_empty() && e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.artists.clone())
    }

    /// Runs one aggregation pass unless another one finished since the
    /// caller saw `seen` completed passes, in which case its outcome is shared.
    async fn refresh(&self, seen: usize) -> Result<Vec<Artist>, AppError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(artists) = self.fresh_snapshot().await {
            return Ok(artists);
        }
        if self.completed.load(Ordering::SeqCst) != seen {
            if let Some(err) = self.last_error.lock().await.clone() {
                return Err(err);
            }
            if let Some(entry) = self.entry.lock().await.as_ref() {
                return Ok(entry.artists.clone());
            }
        }

        info!("Artist cache is stale, aggregating");
        self.aggregations.fetch_add(1, Ordering::SeqCst);
        let result = Aggregator::new(&self.spotify, &self.plan).fetch_all().await;

        match &result {
            Ok(artists) => {
                *self.entry.lock().await = Some(CacheEntry {
                    artists: artists.clone(),
                    fetched_at: Instant::now(),
                });
                *self.last_error.lock().await = None;
                success!("Cached {} artists", artists.len());
            }
            Err(e) => *self.last_error.lock().await = Some(e.clone()),
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        result
    }
}

fn to_search_result(upstream: UpstreamArtist, snapshot: &[Artist]) -> Artist {
    if let Some(known) = snapshot.iter().find(|a| a.external_id == upstream.id) {
        return known.clone();
    }
    Artist {
        id: 0,
        image_url: upstream.first_image(),
        external_url: format!("https://open.spotify.com/artist/{}", upstream.id),
        external_id: upstream.id,
        name: upstream.name,
        genres: upstream.genres,
        ..Artist::default()
    }
}
