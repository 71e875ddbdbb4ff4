mod common;

use std::{collections::HashMap, time::Duration};

use common::{FakeConfig, FakeUpstream, album_json, artist_json, profile_json};
use groupie_tracker::{error::AppError, spotify::SpotifyClient};
use serde_json::json;

fn searches(query: &str, items: Vec<serde_json::Value>) -> HashMap<String, Vec<serde_json::Value>> {
    HashMap::from([(query.to_string(), items)])
}

#[tokio::test]
async fn test_single_unauthorized_answer_is_retried_once() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches("rock", vec![artist_json("a1", "Foo", &["rock"])]),
        unauthorized: 1,
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let found = client.search_artists("rock", 10).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Foo");
    assert_eq!(fake.token_calls(), 2);
    assert_eq!(fake.search_calls(), 2);
}

#[tokio::test]
async fn test_second_unauthorized_answer_is_an_upstream_error() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches("rock", vec![artist_json("a1", "Foo", &["rock"])]),
        unauthorized: 2,
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let err = client.search_artists("rock", 10).await.unwrap_err();

    assert!(matches!(err, AppError::Upstream { status: Some(401), .. }));
    assert_eq!(fake.token_calls(), 2);
    assert_eq!(fake.search_calls(), 2);
}

#[tokio::test]
async fn test_search_drops_entries_without_id_or_name() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches(
            "pop",
            vec![
                artist_json("a1", "Foo", &[]),
                json!({ "id": "", "name": "Nameless id" }),
                json!({ "id": "a3", "name": "" }),
                artist_json("a4", "Bar", &[]),
            ],
        ),
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let found = client.search_artists("pop", 10).await.unwrap();
    let names: Vec<&str> = found.iter().map(|a| a.name.as_str()).collect();

    assert_eq!(names, vec!["Foo", "Bar"]);
}

#[tokio::test]
async fn test_failing_search_reports_upstream_status() {
    let fake = FakeUpstream::start(FakeConfig {
        failing_queries: ["jazz".to_string()].into(),
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let err = client.search_artists("jazz", 10).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(500));
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let fake = FakeUpstream::start(FakeConfig::default()).await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let err = client.fetch_full_profile("missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = client.fetch_full_profile("  ").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_full_profile_is_decoded() {
    let fake = FakeUpstream::start(FakeConfig {
        profiles: HashMap::from([("g1".to_string(), profile_json("g1", "GIMS", 1_500))]),
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let profile = client.fetch_full_profile("g1").await.unwrap();

    assert_eq!(profile.name, "GIMS");
    assert_eq!(profile.popularity, 77);
    assert_eq!(profile.followers.total, 1_500);
}

#[tokio::test]
async fn test_earliest_album_is_resolved_from_discography() {
    let fake = FakeUpstream::start(FakeConfig {
        albums: HashMap::from([(
            "a1".to_string(),
            vec![
                album_json("Second", "1999-03-12"),
                album_json("Third", "2001"),
                album_json("First", "1998-11"),
            ],
        )]),
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let earliest = client.fetch_earliest_album("a1").await.unwrap();

    assert_eq!(earliest.name, "First");
    assert_eq!(earliest.release_date, "1998-11");
    assert_eq!(earliest.year, 1998);
}

#[tokio::test]
async fn test_best_effort_calls_become_none() {
    let fake = FakeUpstream::start(FakeConfig {
        detail_lists_fail: true,
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    assert!(client.top_tracks_or_none("a1").await.is_none());
    assert!(client.albums_or_none("a1").await.is_none());
    assert!(client.related_or_none("a1").await.is_none());
}

#[tokio::test]
async fn test_find_artist_by_name_without_match_is_not_found() {
    let fake = FakeUpstream::start(FakeConfig::default()).await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let err = client.find_artist_by_name("Nobody").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_short_rate_limit_is_waited_out_once() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches("rock", vec![artist_json("a1", "Foo", &["rock"])]),
        rate_limited: 1,
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let found = client.search_artists("rock", 10).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(fake.search_calls(), 2);
}

#[tokio::test]
async fn test_long_rate_limit_is_an_upstream_error() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches("rock", vec![artist_json("a1", "Foo", &["rock"])]),
        rate_limited: 1,
        retry_after: Some(30),
        ..FakeConfig::default()
    })
    .await;
    let client = SpotifyClient::new(&fake.settings()).unwrap();

    let err = client.search_artists("rock", 10).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(429));
    assert_eq!(fake.search_calls(), 1);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let fake = FakeUpstream::start(FakeConfig {
        search: searches("rock", vec![artist_json("a1", "Foo", &["rock"])]),
        search_delay: Some(Duration::from_millis(800)),
        ..FakeConfig::default()
    })
    .await;
    let settings = fake
        .settings()
        .with_http_timeout(Duration::from_millis(200));
    let client = SpotifyClient::new(&settings).unwrap();

    let err = client.search_artists("rock", 10).await.unwrap_err();

    assert!(matches!(err, AppError::Upstream { .. }));
    assert!(err.to_string().contains("timed out"), "{}", err);
}
