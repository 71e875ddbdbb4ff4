use crate::types::{EarliestAlbum, UpstreamAlbum};

/// Upper bound of albums inspected when looking for an artist's first album.
pub const EARLIEST_ALBUM_SCAN_LIMIT: usize = 50;

/// Extracts the year of a Spotify release date.
///
/// Spotify reports release dates as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
/// depending on their precision, so the leading four characters are the year
/// in every case.
///
/// # Example
///
/// ```
/// assert_eq!(release_year("1998-11"), Some(1998));
/// assert_eq!(release_year("n/a"), None);
/// ```
pub fn release_year(release_date: &str) -> Option<i32> {
    let head = release_date.trim().get(..4)?;
    if !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    head.parse::<i32>().ok().filter(|y| *y > 0)
}

/// Picks the oldest album among the first [`EARLIEST_ALBUM_SCAN_LIMIT`] entries.
///
/// The first album with the minimum year wins ties. When no album carries a
/// parseable year the first album is reported with year 0, and an empty
/// discography yields the default (empty) value.
pub fn earliest_album(albums: &[UpstreamAlbum]) -> EarliestAlbum {
    let scanned = &albums[..albums.len().min(EARLIEST_ALBUM_SCAN_LIMIT)];

    let mut best: Option<(&UpstreamAlbum, i32)> = None;
    for album in scanned {
        let Some(year) = release_year(&album.release_date) else {
            continue;
        };
        match best {
            Some((_, best_year)) if best_year <= year => {}
            _ => best = Some((album, year)),
        }
    }

    match (best, scanned.first()) {
        (Some((album, year)), _) => EarliestAlbum {
            name: album.name.clone(),
            release_date: album.release_date.clone(),
            year,
        },
        (None, Some(first)) => EarliestAlbum {
            name: first.name.clone(),
            release_date: first.release_date.clone(),
            year: 0,
        },
        (None, None) => EarliestAlbum::default(),
    }
}
