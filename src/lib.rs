//! Groupie Tracker Library
//!
//! This library powers a web catalog of music artists. It aggregates artists
//! from the Spotify Web API behind a short-lived in-memory cache, enriches them
//! with album data, and serves list, search, detail and concert-location pages
//! through an Axum application.
//!
//! # Modules
//!
//! - `api` - HTTP handlers and the page renderer seam
//! - `cli` - Command-line entry points (serve, list)
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy and its HTTP status mapping
//! - `groupie` - Groupie artists/relations client
//! - `management` - Artist aggregation and the result cache
//! - `server` - Router and listener
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Filtering, search and display helpers
//!
//! # Example
//!
//! ```
//! use groupie_tracker::{config::Settings, management::Catalog};
//!
//! #[tokio::main]
//! async fn main() -> groupie_tracker::Res<()> {
//!     let catalog = Catalog::new(&Settings::from_env())?;
//!     let artists = catalog.get_artists().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod groupie;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the binary and server glue, where any error ends up printed.
/// The catalog core returns [`error::AppError`] instead.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use groupie_tracker::Res;
///
/// async fn load() -> Res<usize> {
///     Ok(0)
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Starting server on {}", addr);
/// info!("Aggregated {} artists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Cached {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Only used during startup; request
/// handling never calls it.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Cannot set up the catalog. Err: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator. Used for
/// recoverable problems, such as a best-effort upstream call that failed and
/// left a field empty.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Seed query {:?} failed: {}", query, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
