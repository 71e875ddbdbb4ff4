use serde::{Deserialize, Serialize};
use tabled::Tabled;

// --- Spotify wire records -------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

/// Raw artist as returned by `/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamArtist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl UpstreamArtist {
    pub fn first_image(&self) -> String {
        first_image(&self.images)
    }
}

/// Artist as returned by `/artists/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamArtistFull {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub artists: ArtistPage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistPage {
    #[serde(default)]
    pub items: Vec<UpstreamArtist>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<UpstreamTrack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamTrack {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub album: TrackAlbum,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumsResponse {
    #[serde(default)]
    pub items: Vec<UpstreamAlbum>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamAlbum {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub total_tracks: u32,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default)]
    pub artists: Vec<UpstreamRelatedArtist>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamRelatedArtist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

// --- Local domain records -------------------------------------------------

/// An artist of the aggregated catalog.
///
/// `id` is the 1-based position in the snapshot it was taken from and is only
/// meaningful while that snapshot is cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u32,
    pub external_id: String,
    pub name: String,
    pub image_url: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    pub first_album_name: String,
    pub first_album_date: String,
    /// 0 when unknown.
    pub first_album_year: i32,
    pub external_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub album_name: String,
    pub duration_ms: u64,
    pub preview_url: String,
    pub spotify_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub name: String,
    pub release_date: String,
    pub image_url: String,
    pub total_tracks: u32,
    pub spotify_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedArtistInfo {
    pub name: String,
    pub image_url: String,
    pub spotify_url: String,
    pub genres: Vec<String>,
}

/// An artist together with the data fetched fresh for its detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub top_tracks: Vec<TrackInfo>,
    pub albums: Vec<AlbumInfo>,
    pub related_artists: Vec<RelatedArtistInfo>,
}

/// Result of the earliest-album scan over an artist's discography.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarliestAlbum {
    pub name: String,
    pub release_date: String,
    /// 0 when no album carried a parseable year.
    pub year: i32,
}

// --- Groupie wire records -------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupieArtist {
    pub id: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub creation_date: i32,
    #[serde(default)]
    pub first_album: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: u32,
    #[serde(default)]
    pub dates_locations: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationIndex {
    #[serde(default)]
    pub index: Vec<Relation>,
}

/// One concert location on the map view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub location: String,
    pub dates: Vec<String>,
    pub artists: Vec<String>,
}

// --- Console output -------------------------------------------------------

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub id: u32,
    pub name: String,
    pub genres: String,
    pub first_album: String,
}

pub(crate) fn first_image(images: &[Image]) -> String {
    images.first().map(|i| i.url.clone()).unwrap_or_default()
}
