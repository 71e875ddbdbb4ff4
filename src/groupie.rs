//! Client for the Groupie artists/relations API.
//!
//! The Groupie API is public and unauthenticated. It provides the concert
//! dates-by-location map shown on the map view.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    config::Settings,
    error::AppError,
    types::{GroupieArtist, MapLocation, Relation, RelationIndex},
};

pub struct GroupieClient {
    http: Client,
    base_url: String,
}

impl GroupieClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(settings.groupie_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(GroupieClient {
            http,
            base_url: settings.groupie_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_artists(&self) -> Result<Vec<GroupieArtist>, AppError> {
        self.get_json("artists").await
    }

    pub async fn fetch_relations(&self) -> Result<Vec<Relation>, AppError> {
        let index: RelationIndex = self.get_json("relation").await?;
        Ok(index.index)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                Some(status.as_u16()),
                format!("groupie {}: {}", path, body),
            ));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Groups concert dates and performing artists by location.
///
/// Locations are returned in alphabetical order with their dates in the order
/// the relations listed them. Relations whose ID has no matching artist still
/// contribute their dates.
pub fn group_locations(artists: &[GroupieArtist], relations: &[Relation]) -> Vec<MapLocation> {
    let names: BTreeMap<u32, &str> = artists.iter().map(|a| (a.id, a.name.as_str())).collect();
    let mut by_location: BTreeMap<String, MapLocation> = BTreeMap::new();

    for relation in relations {
        for (location, dates) in &relation.dates_locations {
            let entry = by_location
                .entry(location.clone())
                .or_insert_with(|| MapLocation {
                    location: location.clone(),
                    ..MapLocation::default()
                });
            entry.dates.extend(dates.iter().cloned());
            if let Some(name) = names.get(&relation.id) {
                if !entry.artists.iter().any(|a| a == name) {
                    entry.artists.push(name.to_string());
                }
            }
        }
    }

    by_location.into_values().collect()
}
