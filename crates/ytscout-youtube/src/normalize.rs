//! Conversion of raw `channels.list` items into [`ChannelDetails`].

use ytscout_core::{ChannelDetails, UNKNOWN};

use crate::error::YoutubeError;
use crate::types::{ChannelItem, Thumbnails};

const CHANNEL_BASE: &str = "https://www.youtube.com";

/// Normalize one `channels.list` item.
///
/// # Errors
///
/// Returns [`YoutubeError::Normalization`] when the item has no snippet or a
/// statistics field is not a non-negative integer. Missing statistics count
/// as zero (channels that hide their subscriber count omit it).
pub fn normalize_channel(item: &ChannelItem) -> Result<ChannelDetails, YoutubeError> {
    let snippet = item
        .snippet
        .as_ref()
        .ok_or_else(|| YoutubeError::Normalization {
            channel_id: item.id.clone(),
            reason: "missing snippet".to_owned(),
        })?;

    let stats = item.statistics.as_ref();
    let count = |field: &str, raw: Option<&String>| -> Result<u64, YoutubeError> {
        raw.map_or(Ok(0), |s| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| YoutubeError::Normalization {
                    channel_id: item.id.clone(),
                    reason: format!("{field} {s:?}: {e}"),
                })
        })
    };
    let subscribers = count("subscriberCount", stats.and_then(|s| s.subscriber_count.as_ref()))?;
    let total_views = count("viewCount", stats.and_then(|s| s.view_count.as_ref()))?;
    let video_count = count("videoCount", stats.and_then(|s| s.video_count.as_ref()))?;

    let handle = snippet
        .custom_url
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let username = match handle {
        Some(h) if h.starts_with('@') => h.to_owned(),
        Some(h) => format!("@{h}"),
        None => snippet.title.clone().unwrap_or_default(),
    };

    let channel_url = match handle {
        Some(h) => format!("{CHANNEL_BASE}/@{}", h.trim_start_matches('@')),
        None => format!("{CHANNEL_BASE}/channel/{}", item.id),
    };

    let channel_image_url = snippet
        .thumbnails
        .as_ref()
        .and_then(best_thumbnail)
        .unwrap_or_default();

    let country = snippet
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN)
        .to_owned();

    Ok(ChannelDetails {
        channel_id: item.id.clone(),
        username,
        subscribers,
        total_views,
        video_count,
        channel_url,
        channel_image_url,
        country,
    })
}

/// Highest resolution thumbnail available: high, then medium, then default.
fn best_thumbnail(thumbnails: &Thumbnails) -> Option<String> {
    [&thumbnails.high, &thumbnails.medium, &thumbnails.default]
        .into_iter()
        .find_map(|t| t.as_ref().map(|t| t.url.clone()))
}
