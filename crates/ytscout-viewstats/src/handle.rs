//! Resolving the ViewStats handle for a table row.

use ytscout_core::UNKNOWN;

/// Pull a handle or legacy custom name out of a YouTube channel URL.
///
/// `/@name`, `/c/name` and `/user/name` forms yield `name`; `/channel/<id>`
/// URLs yield `None` because ViewStats cannot look channels up by id.
#[must_use]
pub fn extract_username_from_channel_url(channel_url: &str) -> Option<String> {
    let url = channel_url.trim();
    if url.is_empty() {
        return None;
    }

    let segment_after = |marker: &str| -> Option<String> {
        let (_, rest) = url.split_once(marker)?;
        let name = rest.split(['/', '?', '#']).next()?;
        (!name.is_empty()).then(|| name.to_owned())
    };

    if url.contains('@') {
        segment_after("@")
    } else if url.contains("/channel/") {
        None
    } else if url.contains("/c/") {
        segment_after("/c/")
    } else if url.contains("/user/") {
        segment_after("/user/")
    } else {
        None
    }
}

/// Pick the handle to look up on ViewStats for a row.
///
/// An `@handle` username is used as is. A missing, `Unknown`, or display
/// title username falls back to the handle in the channel URL; a display
/// title with nothing better available is used verbatim.
#[must_use]
pub fn resolve_handle(username: &str, channel_url: &str) -> Option<String> {
    let username = username.trim();
    if username.starts_with('@') && username.len() > 1 {
        return Some(username.to_owned());
    }

    if let Some(from_url) = extract_username_from_channel_url(channel_url) {
        return Some(if channel_url.contains('@') {
            format!("@{from_url}")
        } else {
            from_url
        });
    }

    if username.is_empty() || username == UNKNOWN {
        None
    } else {
        Some(username.to_owned())
    }
}
