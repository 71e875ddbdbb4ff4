mod aggregate;
mod catalog;

pub use aggregate::{Aggregator, SeedPlan, dedupe_and_number};
pub use catalog::{Catalog, ResolvedArtist};
