use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub database_csv: PathBuf,
    pub youtube_api_key: Option<String>,
    pub youtube_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Quota units a single discovery run may spend.
    pub quota_budget: u32,
    pub max_search_pages: u32,
    pub viewstats_base_url: String,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub enrich_delay_min_ms: u64,
    pub enrich_delay_max_ms: u64,
    pub enrich_save_every: usize,
}

impl AppConfig {
    /// The YouTube API key, for commands that cannot run without it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `YOUTUBE_API_KEY` is unset or blank.
    pub fn require_youtube_api_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_owned()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_csv", &self.database_csv)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_base_url", &self.youtube_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("quota_budget", &self.quota_budget)
            .field("max_search_pages", &self.max_search_pages)
            .field("viewstats_base_url", &self.viewstats_base_url)
            .field("browserless_url", &self.browserless_url)
            .field(
                "browserless_token",
                &self.browserless_token.as_ref().map(|_| "[redacted]"),
            )
            .field("enrich_delay_min_ms", &self.enrich_delay_min_ms)
            .field("enrich_delay_max_ms", &self.enrich_delay_max_ms)
            .field("enrich_save_every", &self.enrich_save_every)
            .finish()
    }
}
