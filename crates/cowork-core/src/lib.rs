pub mod app_config;
pub mod config;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, DEFAULT_LISTING_URL, DEFAULT_OUTPUT_FILE, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    is_available, or_not_available, CombinedRecord, DetailRecord, ListingEntry, NOT_AVAILABLE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
