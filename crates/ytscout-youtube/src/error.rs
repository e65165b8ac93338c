use thiserror::Error;

/// Errors returned by the YouTube Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status and an error body.
    #[error("YouTube API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The project's daily quota is spent. Nothing will succeed until it resets.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The per-run budget would be overrun by the next call; no request was sent.
    #[error("quota budget reached: {used} of {limit} units used")]
    BudgetExceeded { used: u32, limit: u32 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot normalize channel {channel_id}: {reason}")]
    Normalization { channel_id: String, reason: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
