use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings, error, management::Catalog, success, types::ArtistTableRow, utils, warning,
};

/// Aggregates the catalog once and prints it, optionally narrowed by `search`.
pub async fn list_artists(search: Option<String>) {
    let settings = Settings::from_env();
    let catalog = match Catalog::new(&settings) {
        Ok(c) => c,
        Err(e) => error!("Cannot set up the catalog. Err: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message("Aggregating artists from Spotify...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = catalog.get_artists().await;
    pb.finish_and_clear();

    let artists = match result {
        Ok(a) => a,
        Err(e) => error!("Cannot load artists. Err: {}", e),
    };

    let shown = match search {
        Some(q) => utils::search_artists(&artists, &q),
        None => artists,
    };
    if shown.is_empty() {
        warning!("No artist matches.");
        return;
    }

    let rows: Vec<ArtistTableRow> = shown
        .iter()
        .map(|a| ArtistTableRow {
            id: a.id,
            name: a.name.clone(),
            genres: a.genres.iter().take(3).cloned().collect::<Vec<_>>().join(","),
            first_album: if a.first_album_year > 0 {
                format!("{} ({})", a.first_album_name, a.first_album_year)
            } else {
                "-".to_string()
            },
        })
        .collect();

    println!("{}", Table::new(rows));
    success!("{} artists listed", shown.len());
}
