use std::collections::HashSet;

use futures::{StreamExt, stream};

use crate::{
    error::AppError,
    info,
    spotify::SpotifyClient,
    types::{Artist, UpstreamArtist},
    warning,
};

/// How many earliest-album lookups run at the same time.
const ENRICH_CONCURRENCY: usize = 8;

/// The fixed battery of queries one aggregation pass runs.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    /// Genre, decade and trending tags, run first and in order.
    pub queries: Vec<String>,
    pub per_query_limit: u32,
    /// Seed queries stop once this many distinct artists were found.
    pub target_total: usize,
    /// Below this count the well-known names are searched as well.
    pub min_threshold: usize,
    pub names: Vec<String>,
    pub per_name_limit: u32,
    /// Below this count the generic fallback query runs.
    pub floor: usize,
    pub fallback_query: String,
    pub fallback_limit: u32,
}

impl Default for SeedPlan {
    fn default() -> Self {
        let genres = [
            "rock", "pop", "hip-hop", "rap", "jazz", "electronic", "indie", "metal", "r&b",
            "soul", "reggae", "country", "french", "k-pop",
        ];
        let decades = [
            "year:1970-1979",
            "year:1980-1989",
            "year:1990-1999",
            "year:2000-2009",
            "year:2010-2019",
            "year:2020-2029",
        ];
        let trending = ["tag:new", "tag:hipster"];
        let names = [
            "Daft Punk",
            "Queen",
            "Coldplay",
            "Beyoncé",
            "Drake",
            "Adele",
            "Metallica",
            "Stromae",
            "Rihanna",
            "Kendrick Lamar",
            "Radiohead",
            "Gorillaz",
        ];

        SeedPlan {
            queries: genres
                .iter()
                .chain(decades.iter())
                .chain(trending.iter())
                .map(|q| q.to_string())
                .collect(),
            per_query_limit: 15,
            target_total: 120,
            min_threshold: 50,
            names: names.iter().map(|n| n.to_string()).collect(),
            per_name_limit: 5,
            floor: 20,
            fallback_query: "artist".to_string(),
            fallback_limit: 50,
        }
    }
}

/// Runs one aggregation pass against the Spotify search endpoint.
pub struct Aggregator<'a> {
    client: &'a SpotifyClient,
    plan: &'a SeedPlan,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a SpotifyClient, plan: &'a SeedPlan) -> Self {
        Aggregator { client, plan }
    }

    /// Builds a fresh, de-duplicated artist list.
    ///
    /// Artists keep the order in which they were first discovered across the
    /// ordered query list and get `id = position + 1`. Failing seed queries
    /// are skipped; the pass only fails when authentication fails, or when no
    /// artist at all was found and the generic fallback query failed or came
    /// back empty.
    ///
    /// Each artist is then enriched with its first album, best effort.
    pub async fn fetch_all(&self) -> Result<Vec<Artist>, AppError> {
        // authentication is on the critical path, seed queries are not
        self.client.tokens().ensure_valid_token().await?;

        let mut found = Discovered::default();

        for query in &self.plan.queries {
            if found.len() >= self.plan.target_total {
                break;
            }
            self.run_seed(query, self.plan.per_query_limit, &mut found)
                .await;
        }

        if found.len() < self.plan.min_threshold {
            for name in &self.plan.names {
                self.run_seed(name, self.plan.per_name_limit, &mut found)
                    .await;
            }
        }

        if found.len() < self.plan.floor {
            match self
                .client
                .search_artists(&self.plan.fallback_query, self.plan.fallback_limit)
                .await
            {
                Ok(artists) => found.extend(artists),
                Err(e) if found.is_empty() => {
                    return Err(AppError::upstream(
                        e.upstream_status(),
                        format!("no artists could be fetched: {}", e),
                    ));
                }
                Err(e) => warning!("Fallback query failed: {}", e),
            }
        }

        if found.is_empty() {
            return Err(AppError::upstream(
                None,
                "no artists could be fetched: every query came back empty",
            ));
        }

        let artists = assign_local_ids(found.into_inner());
        info!("Aggregated {} artists, resolving first albums", artists.len());

        Ok(self.enrich(artists).await)
    }

    async fn run_seed(&self, query: &str, limit: u32, found: &mut Discovered) {
        match self.client.search_artists(query, limit).await {
            Ok(artists) => found.extend(artists),
            Err(e) => warning!("Seed query {:?} failed: {}", query, e),
        }
    }

    async fn enrich(&self, artists: Vec<Artist>) -> Vec<Artist> {
        let lookups: Vec<_> = artists
            .into_iter()
            .map(|artist| with_first_album(self.client, artist))
            .collect();

        stream::iter(lookups)
            .buffered(ENRICH_CONCURRENCY)
            .collect()
            .await
    }
}

async fn with_first_album(client: &SpotifyClient, mut artist: Artist) -> Artist {
    if let Some(album) = client.earliest_album_or_none(&artist.external_id).await {
        artist.first_album_name = album.name;
        artist.first_album_date = album.release_date;
        artist.first_album_year = album.year;
    }
    artist
}

/// Insertion-ordered set of upstream artists keyed by their Spotify ID.
#[derive(Default)]
struct Discovered {
    seen: HashSet<String>,
    artists: Vec<UpstreamArtist>,
}

impl Discovered {
    fn extend(&mut self, artists: Vec<UpstreamArtist>) {
        for artist in artists {
            if self.seen.insert(artist.id.clone()) {
                self.artists.push(artist);
            }
        }
    }

    fn len(&self) -> usize {
        self.artists.len()
    }

    fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    fn into_inner(self) -> Vec<UpstreamArtist> {
        self.artists
    }
}

/// De-duplicates by Spotify ID and numbers the result from 1.
///
/// The first occurrence of an ID wins; later duplicates are dropped.
pub fn dedupe_and_number(batches: Vec<Vec<UpstreamArtist>>) -> Vec<Artist> {
    let mut found = Discovered::default();
    for batch in batches {
        found.extend(batch);
    }
    assign_local_ids(found.into_inner())
}

fn assign_local_ids(upstream: Vec<UpstreamArtist>) -> Vec<Artist> {
    upstream
        .into_iter()
        .enumerate()
        .map(|(i, a)| Artist {
            id: (i + 1) as u32,
            image_url: a.first_image(),
            external_url: format!("https://open.spotify.com/artist/{}", a.id),
            external_id: a.id,
            name: a.name,
            genres: a.genres,
            ..Artist::default()
        })
        .collect()
}
