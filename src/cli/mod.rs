//! # CLI Module
//!
//! Command implementations behind the `groupie-tracker` binary.
//!
//! - [`serve`] - Starts the web application
//! - [`list_artists`] - Aggregates the catalog once and prints it as a table
//!
//! Both commands build their [`crate::management::Catalog`] from
//! [`crate::config::Settings::from_env`]. Fatal problems (missing credentials,
//! an unusable server address) end the process through the `error!` macro;
//! everything else is reported and the command carries on where it can.

mod artists;
mod serve;

pub use artists::list_artists;
pub use serve::serve;
