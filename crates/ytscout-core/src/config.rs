use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_DATABASE_CSV: &str = "youtube_channels_database.csv";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
pub const DEFAULT_VIEWSTATS_BASE_URL: &str = "https://www.viewstats.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave keys blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("YTSCOUT_ENV", "development"))?;
    let log_level = or_default("YTSCOUT_LOG_LEVEL", "info");
    let database_csv = PathBuf::from(or_default("YTSCOUT_DATABASE_CSV", DEFAULT_DATABASE_CSV));

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let youtube_base_url = or_default("YTSCOUT_YOUTUBE_BASE_URL", DEFAULT_YOUTUBE_BASE_URL);

    let request_timeout_secs = parse_u64("YTSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("YTSCOUT_USER_AGENT", "ytscout/0.1 (channel-discovery)");
    let max_retries = parse_u32("YTSCOUT_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("YTSCOUT_RETRY_BACKOFF_BASE_MS", "1000")?;
    let quota_budget = parse_u32("YTSCOUT_QUOTA_BUDGET", "10000")?;

    let max_search_pages = parse_u32("YTSCOUT_MAX_SEARCH_PAGES", "15")?;
    if max_search_pages == 0 {
        return Err(invalid(
            "YTSCOUT_MAX_SEARCH_PAGES",
            "must be at least 1".to_string(),
        ));
    }

    let viewstats_base_url = or_default("VIEWSTATS_BASE_URL", DEFAULT_VIEWSTATS_BASE_URL);
    let browserless_url = optional("VIEWSTATS_BROWSERLESS_URL");
    let browserless_token = optional("VIEWSTATS_BROWSERLESS_TOKEN");

    let enrich_delay_min_ms = parse_u64("YTSCOUT_ENRICH_DELAY_MIN_MS", "1000")?;
    let enrich_delay_max_ms = parse_u64("YTSCOUT_ENRICH_DELAY_MAX_MS", "3000")?;
    if enrich_delay_min_ms > enrich_delay_max_ms {
        return Err(invalid(
            "YTSCOUT_ENRICH_DELAY_MIN_MS",
            format!("{enrich_delay_min_ms} exceeds YTSCOUT_ENRICH_DELAY_MAX_MS ({enrich_delay_max_ms})"),
        ));
    }

    let enrich_save_every = parse_usize("YTSCOUT_ENRICH_SAVE_EVERY", "10")?;
    if enrich_save_every == 0 {
        return Err(invalid(
            "YTSCOUT_ENRICH_SAVE_EVERY",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        database_csv,
        youtube_api_key,
        youtube_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        quota_budget,
        max_search_pages,
        viewstats_base_url,
        browserless_url,
        browserless_token,
        enrich_delay_min_ms,
        enrich_delay_max_ms,
        enrich_save_every,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "YTSCOUT_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
