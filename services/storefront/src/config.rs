//! services/storefront/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use reqwest::Url;
use tracing::Level;

/// The public demo API the storefront talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com/";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Always ends in `/` so relative paths join beneath it.
    pub api_base_url: Url,
    pub data_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let base_url_str = std::env::var("MARKETHUB_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&base_url_str).map_err(|e| {
            ConfigError::InvalidValue("MARKETHUB_API_BASE_URL".to_string(), e)
        })?;

        let data_dir = std::env::var("MARKETHUB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.markethub"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            data_dir,
            log_level,
        })
    }

    /// Configuration for a given API base URL and data directory, with INFO logging.
    pub fn new(api_base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(api_base_url)
            .map_err(|e| ConfigError::InvalidValue("api_base_url".to_string(), e))?;
        Ok(Self {
            api_base_url,
            data_dir: data_dir.into(),
            log_level: Level::INFO,
        })
    }
}

/// Parses an http(s) URL and guarantees a trailing slash on its path.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
