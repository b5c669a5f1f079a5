//! Configuration and settings management
//!
//! Loads settings from environment variables and defines process constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram application identifier
    pub api_id: String,

    /// Telegram application secret
    pub api_hash: String,

    /// Telegram Bot API token
    pub bot_token: String,

    /// Netscape cookies file content, materialized to [`COOKIES_FILE`] at
    /// startup. Needed for stories and private content.
    pub cookies_content: Option<String>,
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a required value is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables directly
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback: the config crate can miss direct env vars depending on
        // shell casing, so check them explicitly before giving up
        if settings.cookies_content.is_none() {
            if let Ok(val) = std::env::var("COOKIES_CONTENT") {
                if !val.is_empty() {
                    settings.cookies_content = Some(val);
                }
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Tests run sequentially to avoid environment variable race conditions
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("API_ID", "12345");
        env::set_var("API_HASH", "abcdef");
        env::set_var("BOT_TOKEN", "dummy_token");

        let settings = Settings::new()?;
        assert_eq!(settings.api_id, "12345");
        assert_eq!(settings.bot_token, "dummy_token");
        assert_eq!(settings.cookies_content, None);

        // Empty env var is treated as unset
        env::set_var("COOKIES_CONTENT", "");
        let settings = Settings::new()?;
        assert_eq!(settings.cookies_content, None);

        env::set_var("COOKIES_CONTENT", "# Netscape HTTP Cookie File");
        let settings = Settings::new()?;
        assert_eq!(
            settings.cookies_content,
            Some("# Netscape HTTP Cookie File".to_string())
        );

        env::remove_var("API_ID");
        env::remove_var("API_HASH");
        env::remove_var("BOT_TOKEN");
        env::remove_var("COOKIES_CONTENT");

        // Missing required values fail the load
        assert!(Settings::new().is_err());
        Ok(())
    }
}

/// Directory for transient downloaded media, created at startup
pub const DOWNLOAD_DIR: &str = "downloads";

/// Cookies file path used by the extractor when present on disk
pub const COOKIES_FILE: &str = "cookies.txt";

/// Maximum total size of one request's artifacts (2 GiB, the practical
/// Telegram upload ceiling)
pub const MAX_TOTAL_SIZE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Maximum characters of a raw extractor diagnostic shown to the user
pub const MAX_ERROR_DISPLAY_CHARS: usize = 100;

/// Hard timeout for one yt-dlp run
pub const EXTRACTION_TIMEOUT_SECS: u64 = 300;

/// Maximum yt-dlp processes running at once
pub const MAX_CONCURRENT_EXTRACTIONS: usize = 4;

/// Browser identity sent to Instagram; some image variants are only served
/// to a desktop user agent
pub const EXTRACTOR_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referer header for outbound extraction requests
pub const EXTRACTOR_REFERER: &str = "https://www.instagram.com/";

// Telegram API retry configuration
/// Max attempts for retryable Telegram operations
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff delay in milliseconds
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff delay in milliseconds
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
