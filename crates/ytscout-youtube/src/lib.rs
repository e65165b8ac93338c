//! Client for the subset of the YouTube Data API v3 used by channel discovery.

pub mod client;
pub mod error;
pub mod normalize;
pub mod quota;
pub(crate) mod retry;
pub mod types;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use normalize::normalize_channel;
pub use quota::{estimate_discovery_quota, QuotaLedger, QuotaUsage};
pub use types::{ChannelItem, SearchItem, SearchResponse};
