//! Shared types and configuration for the `ytscout` workspace.

pub mod app_config;
pub mod channel;
pub mod config;
pub mod error;
pub mod niche;

pub use app_config::{AppConfig, Environment};
pub use channel::{
    ChannelAnalytics, ChannelDetails, ChannelRecord, ALL_COLUMNS, NOT_AVAILABLE, UNKNOWN,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use niche::merge_niche;
