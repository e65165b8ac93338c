//! ViewStats "channelytics" scraper used by the enrichment pass.

pub mod client;
pub mod error;
pub mod handle;
pub mod parse;
pub(crate) mod rate_limit;
pub mod types;

pub use client::ViewStatsClient;
pub use error::ViewStatsError;
pub use handle::{extract_username_from_channel_url, resolve_handle};
pub use parse::parse_channel_page;
pub use types::{EnrichmentOutcome, OutcomeStatus, PageOutcome, ScrapedStats};
