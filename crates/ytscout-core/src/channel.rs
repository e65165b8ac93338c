//! The channel record persisted in the CSV table, plus the intermediate
//! shapes the two pipelines produce before touching a row.

use serde::{Deserialize, Deserializer, Serialize};

use crate::niche::merge_niche;

/// Placeholder used by the API normalizer when a channel has no country.
pub const UNKNOWN: &str = "Unknown";

/// Legacy "not processed" marker some hand-edited tables carry in the
/// profile URL column.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers in the order they are written.
pub const ALL_COLUMNS: [&str; 15] = [
    "Username",
    "Subscribers",
    "Total Views",
    "Video Count",
    "Avg Views Per Video",
    "Country",
    "Channel URL",
    "Search Niche",
    "Channel_Image_URL",
    "Views_Last_28_Days",
    "Subs_Last_28_Days",
    "Estimated_Rev_Last_28_Days",
    "Long_Views",
    "Short_Views",
    "ViewStats_Profile_URL",
];

/// One row of the channel table.
///
/// Field order matches [`ALL_COLUMNS`]; the CSV writer relies on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRecord {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Subscribers", deserialize_with = "lenient_u64")]
    pub subscribers: u64,
    #[serde(rename = "Total Views", deserialize_with = "lenient_u64")]
    pub total_views: u64,
    #[serde(rename = "Video Count", deserialize_with = "lenient_u64")]
    pub video_count: u64,
    #[serde(rename = "Avg Views Per Video", deserialize_with = "lenient_f64")]
    pub avg_views_per_video: f64,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Channel URL")]
    pub channel_url: String,
    #[serde(rename = "Search Niche")]
    pub search_niche: String,
    #[serde(rename = "Channel_Image_URL")]
    pub channel_image_url: String,
    #[serde(rename = "Views_Last_28_Days")]
    pub views_last_28_days: String,
    #[serde(rename = "Subs_Last_28_Days")]
    pub subs_last_28_days: String,
    #[serde(rename = "Estimated_Rev_Last_28_Days")]
    pub estimated_rev_last_28_days: String,
    #[serde(rename = "Long_Views")]
    pub long_views: String,
    #[serde(rename = "Short_Views")]
    pub short_views: String,
    #[serde(rename = "ViewStats_Profile_URL")]
    pub viewstats_profile_url: String,
}

/// Channel data normalized from the YouTube Data API, before it becomes a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDetails {
    pub channel_id: String,
    pub username: String,
    pub subscribers: u64,
    pub total_views: u64,
    pub video_count: u64,
    pub channel_url: String,
    pub channel_image_url: String,
    pub country: String,
}

/// Result of one enrichment attempt, written over the analytics columns.
///
/// On failure `profile_url` holds an outcome marker and the remaining
/// fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAnalytics {
    pub profile_url: String,
    pub views_last_28_days: String,
    pub subs_last_28_days: String,
    pub estimated_rev_last_28_days: String,
    pub long_views: String,
    pub short_views: String,
}

impl ChannelAnalytics {
    /// Analytics with only a failure marker set.
    #[must_use]
    pub fn marker(marker: &str) -> Self {
        Self {
            profile_url: marker.to_owned(),
            ..Self::default()
        }
    }
}

impl ChannelRecord {
    /// Build a fresh row from discovery data. Analytics columns start empty.
    #[must_use]
    pub fn from_discovery(details: &ChannelDetails, niche: &str) -> Self {
        Self {
            username: details.username.clone(),
            subscribers: details.subscribers,
            total_views: details.total_views,
            video_count: details.video_count,
            avg_views_per_video: average_views(details.total_views, details.video_count),
            country: details.country.clone(),
            channel_url: details.channel_url.clone(),
            search_niche: niche.to_owned(),
            channel_image_url: details.channel_image_url.clone(),
            ..Self::default()
        }
    }

    /// `true` when this row is the same channel as `username`/`channel_url`.
    ///
    /// Usernames compare ignoring case (Unicode lowercase, so display titles
    /// like "École" match too); URLs compare exactly. Either match is enough.
    #[must_use]
    pub fn matches(&self, username: &str, channel_url: &str) -> bool {
        self.channel_url == channel_url || self.username.to_lowercase() == username.to_lowercase()
    }

    /// `true` while the enrichment pass has not touched this row.
    #[must_use]
    pub fn needs_enrichment(&self) -> bool {
        let url = self.viewstats_profile_url.trim();
        url.is_empty() || url == NOT_AVAILABLE
    }

    /// Merge `niche` into the row's niche field. Returns `true` if it changed.
    pub fn add_niche(&mut self, niche: &str) -> bool {
        let merged = merge_niche(&self.search_niche, niche);
        if merged == self.search_niche {
            return false;
        }
        self.search_niche = merged;
        true
    }

    pub fn apply_analytics(&mut self, analytics: ChannelAnalytics) {
        self.viewstats_profile_url = analytics.profile_url;
        self.views_last_28_days = analytics.views_last_28_days;
        self.subs_last_28_days = analytics.subs_last_28_days;
        self.estimated_rev_last_28_days = analytics.estimated_rev_last_28_days;
        self.long_views = analytics.long_views;
        self.short_views = analytics.short_views;
    }
}

/// Views per video rounded to two decimals; zero for channels with no uploads.
#[allow(clippy::cast_precision_loss)]
fn average_views(total_views: u64, video_count: u64) -> f64 {
    if video_count == 0 {
        return 0.0;
    }
    let avg = total_views as f64 / video_count as f64;
    (avg * 100.0).round() / 100.0
}

/// Tables written by spreadsheet tools often carry `1234.0` or empty cells
/// in count columns.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Ok(f.trunc() as u64),
        _ => Err(serde::de::Error::custom(format!(
            "expected a non-negative count, got {trimmed:?}"
        ))),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|e| serde::de::Error::custom(format!("{trimmed:?}: {e}")))
}
