//! HTTP client for ViewStats channel pages.
//!
//! The pages are rendered client-side, so production runs normally go
//! through a Browserless-compatible `/content` endpoint that returns the
//! rendered DOM. Without one, the page is fetched directly.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::ViewStatsError;
use crate::handle::resolve_handle;
use crate::parse::parse_channel_page;
use crate::rate_limit::retry_with_backoff;
use crate::types::{EnrichmentOutcome, OutcomeStatus, PageOutcome};

pub(crate) const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Characters left as-is in a handle path segment.
const HANDLE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@');

#[derive(Debug, Clone)]
struct Renderer {
    url: String,
    token: Option<String>,
}

pub struct ViewStatsClient {
    client: Client,
    base_url: String,
    renderer: Option<Renderer>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ViewStatsClient {
    /// Creates a client that fetches pages directly from `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewStatsError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ViewStatsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(BROWSER_UA)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            renderer: None,
            max_retries: 2,
            backoff_base_ms: 2_000,
        })
    }

    /// Route page fetches through a Browserless-style `/content` endpoint.
    #[must_use]
    pub fn with_renderer(mut self, url: &str, token: Option<&str>) -> Self {
        self.renderer = Some(Renderer {
            url: url.trim_end_matches('/').to_owned(),
            token: token.map(str::to_owned),
        });
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// `{base}/{handle}/channelytics`, with the handle percent-encoded.
    #[must_use]
    pub fn profile_url(&self, handle: &str) -> String {
        let segment = utf8_percent_encode(handle, HANDLE_SEGMENT);
        format!("{}/{segment}/channelytics", self.base_url)
    }

    /// Fetch the HTML at `url`. `Ok(None)` means the page does not exist (404).
    ///
    /// # Errors
    ///
    /// - [`ViewStatsError::RateLimited`] after retries are exhausted on 429.
    /// - [`ViewStatsError::UnexpectedStatus`] for other non-2xx responses.
    /// - [`ViewStatsError::Render`] if the render endpoint fails.
    /// - [`ViewStatsError::Http`] on network failure.
    pub async fn fetch_page(&self, url: &str) -> Result<Option<String>, ViewStatsError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            match &self.renderer {
                Some(renderer) => self.fetch_rendered(renderer, url).await,
                None => self.fetch_direct(url).await,
            }
        })
        .await
    }

    async fn fetch_direct(&self, url: &str) -> Result<Option<String>, ViewStatsError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ViewStatsError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ViewStatsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(Some(response.text().await?))
    }

    async fn fetch_rendered(
        &self,
        renderer: &Renderer,
        url: &str,
    ) -> Result<Option<String>, ViewStatsError> {
        let mut endpoint = reqwest::Url::parse(&format!("{}/content", renderer.url)).map_err(|e| {
            ViewStatsError::InvalidUrl {
                url: renderer.url.clone(),
                reason: e.to_string(),
            }
        })?;
        if let Some(token) = &renderer.token {
            endpoint.query_pairs_mut().append_pair("token", token);
        }

        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ViewStatsError::Render {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.text().await?))
    }

    /// Run one full enrichment attempt for a table row.
    ///
    /// Never fails: every problem is folded into the returned outcome so the
    /// caller can record it and move on to the next channel.
    pub async fn scrape_channel(&self, username: &str, channel_url: &str) -> EnrichmentOutcome {
        let Some(handle) = resolve_handle(username, channel_url) else {
            tracing::warn!(username, channel_url, "cannot resolve a ViewStats handle");
            return EnrichmentOutcome::failed(OutcomeStatus::NoUsername);
        };

        let profile_url = self.profile_url(&handle);
        tracing::debug!(%profile_url, "fetching ViewStats page");

        let html = match self.fetch_page(&profile_url).await {
            Ok(Some(html)) => html,
            Ok(None) => {
                tracing::info!(%handle, "ViewStats page not found");
                return EnrichmentOutcome::failed(OutcomeStatus::NotTracked);
            }
            Err(ViewStatsError::InvalidUrl { url, reason }) => {
                tracing::error!(%url, %reason, "invalid ViewStats URL");
                return EnrichmentOutcome::failed(OutcomeStatus::Error);
            }
            Err(e) => {
                tracing::warn!(%handle, error = %e, "ViewStats fetch failed");
                return EnrichmentOutcome::failed(OutcomeStatus::FetchError);
            }
        };

        match parse_channel_page(&html) {
            PageOutcome::NotTracked { reason } => {
                tracing::info!(%handle, %reason, "channel not tracked");
                EnrichmentOutcome::failed(OutcomeStatus::NotTracked)
            }
            PageOutcome::NoData => {
                tracing::info!(%handle, "no views card on page");
                EnrichmentOutcome::failed(OutcomeStatus::NoData)
            }
            PageOutcome::Stats(stats) => {
                tracing::info!(
                    %handle,
                    views = %stats.views_last_28_days,
                    subs = %stats.subs_last_28_days,
                    "ViewStats data collected"
                );
                EnrichmentOutcome::succeeded(profile_url, stats)
            }
        }
    }
}
