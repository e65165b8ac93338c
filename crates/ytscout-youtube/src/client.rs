//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with API key handling, quota accounting, retry on
//! transient failures, and typed decoding of both success and error bodies.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::quota::{CallKind, QuotaLedger, QuotaUsage};
use crate::retry::retry_with_backoff;
use crate::types::{ChannelItem, ChannelListResponse, ErrorEnvelope, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_USER_AGENT: &str = "ytscout/0.1 (channel-discovery)";

/// Results per `search.list` page; the API maximum.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Ids per `channels.list` call; the API maximum.
pub const CHANNEL_BATCH_SIZE: usize = 50;

const BATCH_PAUSE: Duration = Duration::from_millis(100);

/// Client for the YouTube Data API.
///
/// Every call is charged against the client's [`QuotaLedger`] before it is
/// sent. Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    user_agent: String,
    ledger: QuotaLedger,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        quota_budget: Option<u32>,
    ) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, quota_budget, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        quota_budget: Option<u32>,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash, so `join("search")` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            ledger: QuotaLedger::new(quota_budget),
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    /// Override the retry policy. `max_retries = 0` disables retries.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_owned();
        self
    }

    /// Quota spent by this client so far.
    #[must_use]
    pub fn usage(&self) -> QuotaUsage {
        self.ledger.usage()
    }

    #[must_use]
    pub fn quota_budget(&self) -> Option<u32> {
        self.ledger.budget()
    }

    /// Searches channels by keyword, one page of up to 50 results.
    ///
    /// Costs 100 quota units.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::BudgetExceeded`] if the run budget cannot cover the call.
    /// - [`YoutubeError::QuotaExceeded`] if the project quota is exhausted.
    /// - [`YoutubeError::Api`] / [`YoutubeError::Http`] on request failure.
    /// - [`YoutubeError::Deserialize`] if the body has an unexpected shape.
    pub async fn search_channels(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchResponse, YoutubeError> {
        let page_size = SEARCH_PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "channel"),
            ("maxResults", page_size.as_str()),
            ("order", "relevance"),
            ("relevanceLanguage", "en"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("search", &params)?;
        self.get_json(&url, CallKind::Search, &format!("search(q={query})"))
            .await
    }

    /// Fetches snippet and statistics for the given channel ids.
    ///
    /// Ids are sent in batches of 50 with a short pause between batches;
    /// each batch costs 1 quota unit. Ids the API does not know are simply
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::search_channels`]. A failure in any batch
    /// aborts the whole call.
    pub async fn get_channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>, YoutubeError> {
        let mut channels = Vec::with_capacity(ids.len());
        let batches: Vec<&[String]> = ids.chunks(CHANNEL_BATCH_SIZE).collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let joined = batch.join(",");
            let url = self.build_url(
                "channels",
                &[("part", "snippet,statistics"), ("id", joined.as_str())],
            )?;
            let response: ChannelListResponse = self
                .get_json(&url, CallKind::ChannelsList, &format!("channels(batch={})", i + 1))
                .await?;
            channels.extend(response.items);

            if i + 1 < batch_count {
                tokio::time::sleep(BATCH_PAUSE).await;
            }
        }

        Ok(channels)
    }

    /// Builds the endpoint URL with the API key and percent-encoded parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Reserves quota, sends a GET (with retry), and decodes the JSON body.
    ///
    /// Every attempt is charged, since the API bills failed requests too.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        kind: CallKind,
        context: &str,
    ) -> Result<T, YoutubeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            self.ledger.reserve(kind)?;
            let response = self
                .client
                .get(url.clone())
                .header(reqwest::header::USER_AGENT, &self.user_agent)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                return Err(Self::decode_error(status.as_u16(), &body));
            }

            serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }

    /// Maps an error body to a typed error. Quota exhaustion is signalled by
    /// the `reason` of the first error entry, not by the HTTP status.
    fn decode_error(status: u16, body: &str) -> YoutubeError {
        let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
            return YoutubeError::Api {
                status,
                message: body.chars().take(200).collect(),
            };
        };

        let quota_hit = envelope
            .error
            .errors
            .iter()
            .any(|e| matches!(e.reason.as_str(), "quotaExceeded" | "dailyLimitExceeded"));

        if quota_hit {
            YoutubeError::QuotaExceeded(envelope.error.message)
        } else {
            YoutubeError::Api {
                status,
                message: envelope.error.message,
            }
        }
    }
}
