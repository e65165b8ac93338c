use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "YTSCOUT_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.database_csv, PathBuf::from(DEFAULT_DATABASE_CSV));
    assert!(cfg.youtube_api_key.is_none());
    assert_eq!(cfg.youtube_base_url, DEFAULT_YOUTUBE_BASE_URL);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "ytscout/0.1 (channel-discovery)");
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
    assert_eq!(cfg.quota_budget, 10_000);
    assert_eq!(cfg.max_search_pages, 15);
    assert_eq!(cfg.viewstats_base_url, DEFAULT_VIEWSTATS_BASE_URL);
    assert!(cfg.browserless_url.is_none());
    assert_eq!(cfg.enrich_delay_min_ms, 1000);
    assert_eq!(cfg.enrich_delay_max_ms, 3000);
    assert_eq!(cfg.enrich_save_every, 10);
}

#[test]
fn blank_api_key_counts_as_unset() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.youtube_api_key.is_none());
    let err = cfg.require_youtube_api_key().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "YOUTUBE_API_KEY"));
}

#[test]
fn overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "abc123");
    map.insert("YTSCOUT_DATABASE_CSV", "/tmp/channels.csv");
    map.insert("YTSCOUT_QUOTA_BUDGET", "2500");
    map.insert("YTSCOUT_MAX_SEARCH_PAGES", "4");
    map.insert("VIEWSTATS_BROWSERLESS_URL", "http://localhost:3000");
    map.insert("VIEWSTATS_BROWSERLESS_TOKEN", "tok");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.youtube_api_key.as_deref(), Some("abc123"));
    assert_eq!(cfg.require_youtube_api_key().unwrap(), "abc123");
    assert_eq!(cfg.database_csv, PathBuf::from("/tmp/channels.csv"));
    assert_eq!(cfg.quota_budget, 2500);
    assert_eq!(cfg.max_search_pages, 4);
    assert_eq!(cfg.browserless_url.as_deref(), Some("http://localhost:3000"));
    assert_eq!(cfg.browserless_token.as_deref(), Some("tok"));
}

#[test]
fn invalid_quota_budget_is_rejected() {
    let mut map = HashMap::new();
    map.insert("YTSCOUT_QUOTA_BUDGET", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTSCOUT_QUOTA_BUDGET"),
        "expected InvalidEnvVar(YTSCOUT_QUOTA_BUDGET), got: {result:?}"
    );
}

#[test]
fn zero_search_pages_is_rejected() {
    let mut map = HashMap::new();
    map.insert("YTSCOUT_MAX_SEARCH_PAGES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTSCOUT_MAX_SEARCH_PAGES"),
        "expected InvalidEnvVar(YTSCOUT_MAX_SEARCH_PAGES), got: {result:?}"
    );
}

#[test]
fn inverted_delay_window_is_rejected() {
    let mut map = HashMap::new();
    map.insert("YTSCOUT_ENRICH_DELAY_MIN_MS", "5000");
    map.insert("YTSCOUT_ENRICH_DELAY_MAX_MS", "1000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTSCOUT_ENRICH_DELAY_MIN_MS"),
        "expected InvalidEnvVar(YTSCOUT_ENRICH_DELAY_MIN_MS), got: {result:?}"
    );
}

#[test]
fn zero_save_interval_is_rejected() {
    let mut map = HashMap::new();
    map.insert("YTSCOUT_ENRICH_SAVE_EVERY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTSCOUT_ENRICH_SAVE_EVERY"),
        "expected InvalidEnvVar(YTSCOUT_ENRICH_SAVE_EVERY), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "super-secret-key");
    map.insert("VIEWSTATS_BROWSERLESS_TOKEN", "super-secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
