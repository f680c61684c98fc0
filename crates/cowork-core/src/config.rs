use std::path::PathBuf;

use crate::app_config::{AppConfig, DEFAULT_LISTING_URL, DEFAULT_OUTPUT_FILE, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
/// Every variable is optional; the defaults reproduce a plain run against the
/// Barcelona directory.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
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
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let listing_url = or_default("COWORK_LISTING_URL", DEFAULT_LISTING_URL);
    if listing_url.trim().is_empty() {
        return Err(invalid("COWORK_LISTING_URL", "must not be empty".to_string()));
    }

    let output_dir = PathBuf::from(or_default("COWORK_OUTPUT_DIR", "."));
    let output_file = or_default("COWORK_OUTPUT_FILE", DEFAULT_OUTPUT_FILE);
    let log_level = or_default("COWORK_LOG_LEVEL", "info");

    let checkpoint_every = parse_usize("COWORK_CHECKPOINT_EVERY", "10")?;
    if checkpoint_every == 0 {
        return Err(invalid(
            "COWORK_CHECKPOINT_EVERY",
            "must be at least 1".to_string(),
        ));
    }

    let inter_request_delay_ms = parse_u64("COWORK_INTER_REQUEST_DELAY_MS", "2000")?;
    let max_pagination_clicks = parse_usize("COWORK_MAX_PAGINATION_CLICKS", "150")?;
    let user_agent = or_default("COWORK_USER_AGENT", DEFAULT_USER_AGENT);
    let headless = parse_bool("COWORK_HEADLESS", &or_default("COWORK_HEADLESS", "true"))?;
    let window_width = parse_u32("COWORK_WINDOW_WIDTH", "1920")?;
    let window_height = parse_u32("COWORK_WINDOW_HEIGHT", "1080")?;
    let chrome_executable = lookup("COWORK_CHROME_EXECUTABLE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let page_load_timeout_secs = parse_u64("COWORK_PAGE_LOAD_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        listing_url,
        output_dir,
        output_file,
        log_level,
        checkpoint_every,
        inter_request_delay_ms,
        max_pagination_clicks,
        user_agent,
        headless,
        window_width,
        window_height,
        chrome_executable,
        page_load_timeout_secs,
    })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
