use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::Artist;

/// Longest accepted free-text query, in characters.
pub const MAX_QUERY_LEN: usize = 100;

/// Maximum number of autosuggest entries.
pub const MAX_SUGGESTIONS: usize = 10;

/// Member-count bucket meaning "five or more".
pub const LARGE_GROUP_BUCKET: u32 = 5;

/// Criteria of the artist list page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub member_counts: Vec<u32>,
    pub locations: Vec<String>,
    pub genres: Vec<String>,
    pub first_album_min: Option<String>,
    pub first_album_max: Option<String>,
}

impl FilterOptions {
    /// Reads the filters from decoded query-string pairs.
    ///
    /// `memberCount`, `location` and `genre` may repeat and are accepted with
    /// or without the `[]` suffix. Numbers that do not parse are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut options = FilterOptions::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim_end_matches("[]") {
                "minYear" => options.min_year = value.parse().ok().or(options.min_year),
                "maxYear" => options.max_year = value.parse().ok().or(options.max_year),
                "memberCount" => {
                    if let Ok(n) = value.parse() {
                        options.member_counts.push(n);
                    }
                }
                "location" => options.locations.push(value.to_string()),
                "genre" => options.genres.push(value.to_string()),
                "firstAlbumMin" => options.first_album_min = Some(value.to_string()),
                "firstAlbumMax" => options.first_album_max = Some(value.to_string()),
                _ => {}
            }
        }

        options
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterOptions::default()
    }
}

/// Keeps the artists that satisfy every criterion of `options`.
///
/// - The year range applies to the first-album year and skips artists whose
///   year is unknown.
/// - Member counts are estimated from the name, see [`estimate_member_count`].
/// - The first-album range excludes artists without a parseable album date.
/// - Locations match on the name and on genre keywords, see [`matches_location`].
/// - Genres keep artists carrying at least one of them, ignoring case.
pub fn filter_artists(artists: &[Artist], options: &FilterOptions) -> Vec<Artist> {
    let album_min = options.first_album_min.as_deref().and_then(parse_filter_date);
    let album_max = options.first_album_max.as_deref().and_then(parse_filter_date);
    let album_bounded = options.first_album_min.is_some() || options.first_album_max.is_some();
    let wanted_genres: HashSet<String> = options.genres.iter().map(|g| g.to_lowercase()).collect();

    artists
        .iter()
        .filter(|artist| {
            let year = artist.first_album_year;
            if year != 0 {
                if options.min_year.is_some_and(|min| min > 0 && year < min) {
                    return false;
                }
                if options.max_year.is_some_and(|max| max > 0 && year > max) {
                    return false;
                }
            }

            if !options.member_counts.is_empty() {
                let estimated = estimate_member_count(&artist.name);
                let matched = options.member_counts.iter().any(|bucket| {
                    if *bucket == LARGE_GROUP_BUCKET {
                        estimated >= LARGE_GROUP_BUCKET
                    } else {
                        estimated == *bucket
                    }
                });
                if !matched {
                    return false;
                }
            }

            if album_bounded {
                let Some(date) = parse_release_date(&artist.first_album_date) else {
                    return false;
                };
                if album_min.is_some_and(|min| date < min) {
                    return false;
                }
                if album_max.is_some_and(|max| date > max) {
                    return false;
                }
            }

            if !options.locations.is_empty()
                && !options
                    .locations
                    .iter()
                    .any(|location| matches_location(artist, location))
            {
                return false;
            }

            if !wanted_genres.is_empty()
                && !artist
                    .genres
                    .iter()
                    .any(|g| wanted_genres.contains(&g.to_lowercase()))
            {
                return false;
            }

            true
        })
        .cloned()
        .collect()
}

/// Guesses whether a name belongs to a group (2) or a solo artist (1).
///
/// The upstream does not report band members, so the guess relies on
/// collaboration separators, a leading "The " and words such as "band" or
/// "orchestra".
pub fn estimate_member_count(name: &str) -> u32 {
    const SEPARATORS: [&str; 9] = [
        " & ", " and ", " feat", " ft.", " feat.", " featuring", " vs ", " x ", " + ",
    ];
    const GROUP_WORDS: [&str; 7] = [
        " band",
        " group",
        " collective",
        " ensemble",
        " orchestra",
        " quartet",
        " trio",
    ];

    let lower = name.to_lowercase();
    let is_group = SEPARATORS.iter().any(|s| lower.contains(s))
        || (lower.starts_with("the ") && lower.len() > 4)
        || GROUP_WORDS.iter().any(|w| lower.contains(w));

    if is_group { 2 } else { 1 }
}

/// Approximates whether `artist` comes from `location`.
///
/// True when the name contains the location, or when the name or a genre
/// contains one of the location's keywords (e.g. "french" for Paris).
pub fn matches_location(artist: &Artist, location: &str) -> bool {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return false;
    }

    let name = artist.name.to_lowercase();
    if name.contains(&location) {
        return true;
    }

    let Some(keywords) = location_keywords(&location) else {
        return false;
    };
    let genres: Vec<String> = artist.genres.iter().map(|g| g.to_lowercase()).collect();

    keywords
        .iter()
        .any(|k| name.contains(k) || genres.iter().any(|g| g.contains(k)))
}

fn location_keywords(location: &str) -> Option<&'static [&'static str]> {
    let keywords: &'static [&'static str] = match location {
        "paris" => &["french", "france", "français", "paris"],
        "lyon" | "marseille" => &["french", "france", "français"],
        "london" => &["british", "uk", "england", "english"],
        "manchester" => &["british", "uk", "england"],
        "new york" => &["american", "usa", "us", "hip-hop", "rap"],
        "los angeles" => &["american", "usa", "us", "california"],
        "berlin" => &["german", "germany", "deutschland", "electronic"],
        "madrid" => &["spanish", "spain", "español"],
        "barcelona" => &["spanish", "spain", "catalan"],
        "rome" => &["italian", "italy", "italia"],
        "milan" => &["italian", "italy"],
        "amsterdam" => &["dutch", "netherlands", "holland"],
        "tokyo" => &["japanese", "japan", "j-pop"],
        "seoul" => &["korean", "korea", "k-pop"],
        _ => return None,
    };
    Some(keywords)
}

/// Artists whose name or genres mention `location`, for the location page.
pub fn artists_for_location(artists: &[Artist], location: &str) -> Vec<Artist> {
    let needle = location.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    artists
        .iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle)
                || a.genres.iter().any(|g| g.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Parses a Spotify release date (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
///
/// Missing month or day default to the first.
pub fn parse_release_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    match date.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", date), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d").ok(),
        n if n >= 10 => NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Parses a filter bound given as `DD-MM-YYYY`, `YYYY-MM-DD` or `YYYY`.
pub fn parse_filter_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            if date.len() == 4 {
                parse_release_date(date)
            } else {
                None
            }
        })
}

/// Case-insensitive name search over the catalog.
pub fn search_artists(artists: &[Artist], query: &str) -> Vec<Artist> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return artists.to_vec();
    }
    artists
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Names for the search box autosuggest, de-duplicated and capped.
pub fn suggestions(artists: &[Artist], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen_names = HashSet::new();
    artists
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&needle))
        .filter(|a| seen_names.insert(a.name.clone()))
        .map(|a| a.name.clone())
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Sorted, de-duplicated genres of the catalog.
pub fn unique_genres(artists: &[Artist]) -> Vec<String> {
    artists
        .iter()
        .flat_map(|a| a.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Locations offered by the list page's filter form.
pub fn popular_locations() -> Vec<&'static str> {
    vec![
        "Paris",
        "Lyon",
        "Marseille",
        "Toulouse",
        "Nice",
        "Bordeaux",
        "Lille",
        "London",
        "Manchester",
        "Liverpool",
        "Glasgow",
        "New York",
        "Los Angeles",
        "Chicago",
        "Berlin",
        "Munich",
        "Hamburg",
        "Madrid",
        "Barcelona",
        "Rome",
        "Milan",
        "Amsterdam",
        "Brussels",
        "Vienna",
        "Zurich",
        "Stockholm",
        "Oslo",
        "Copenhagen",
        "Warsaw",
        "Prague",
        "Tokyo",
        "Seoul",
        "Sydney",
        "Toronto",
        "Montreal",
        "Mexico City",
        "São Paulo",
        "Buenos Aires",
    ]
}

/// Formats milliseconds as `m:ss`.
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Formats a count with a `K`/`M` suffix above a thousand.
pub fn format_number(n: u64) -> String {
    if n < 1_000 {
        n.to_string()
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    }
}

/// Validates a free-text query: trimmed, non-empty and at most
/// [`MAX_QUERY_LEN`] characters.
pub fn validate_query(query: &str) -> Result<&str, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("empty search query".to_string());
    }
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(format!(
            "search query must be 1-{} characters long",
            MAX_QUERY_LEN
        ));
    }
    Ok(query)
}
