//! Application configuration, read once at startup.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file by [`load_env_file`]. Missing required keys and malformed
//! numbers are configuration errors; the binary refuses to start on either.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::provider::DEFAULT_FACT_API;
use crate::rendering::decoration::DEFAULT_IMAGE_URL;
use crate::{DisplayConfig, Error, Result};

/// Load the nearest `.env` into the process environment. Returns the file
/// used, or `None` when there is none.
pub fn load_env_file() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::ConfigError(format!("Failed to read .env: {}", e))),
    }
}

/// Like [`load_env_file`] for an explicit path.
pub fn load_env_file_at(path: &Path) -> Result<Option<PathBuf>> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::ConfigError(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Keys that must be present for the process to start
pub const REQUIRED_KEYS: &[&str] = &["TRMNL_API_KEY", "TRMNL_PLUGIN_UUID"];

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Seconds between device refreshes
    pub refresh_interval: u64,
    pub trmnl_api_key: Option<String>,
    pub trmnl_plugin_uuid: Option<String>,
    pub display: DisplayConfig,
    /// Seconds a fetched fact stays valid
    pub cache_timeout: u64,
    pub font_path: Option<PathBuf>,
    pub fact_api_url: String,
    /// Decorative image location; `None` disables the image
    pub image_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            debug: false,
            refresh_interval: 3600,
            trmnl_api_key: None,
            trmnl_plugin_uuid: None,
            display: DisplayConfig::default(),
            cache_timeout: 3600,
            font_path: None,
            fact_api_url: DEFAULT_FACT_API.to_string(),
            image_url: Some(DEFAULT_IMAGE_URL.to_string()),
        }
    }
}

impl AppConfig {
    /// Read the process environment. Call [`load_env_file`] first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_empty = |key: &str| get(key).filter(|v| !v.is_empty());

        let display = DisplayConfig {
            width: parse_or(&get, "DISPLAY_WIDTH", defaults.display.width)?,
            height: parse_or(&get, "DISPLAY_HEIGHT", defaults.display.height)?,
        };
        if display.width == 0 || display.height == 0 {
            return Err(Error::ConfigError(format!(
                "Display size must be non-zero, got {}x{}",
                display.width, display.height
            )));
        }

        let image_url = match get("IMAGE_URL") {
            Some(v) if v.is_empty() => None,
            Some(v) => Some(v),
            None => defaults.image_url,
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
            debug: get("DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.debug),
            refresh_interval: parse_or(&get, "REFRESH_INTERVAL", defaults.refresh_interval)?,
            trmnl_api_key: non_empty("TRMNL_API_KEY"),
            trmnl_plugin_uuid: non_empty("TRMNL_PLUGIN_UUID"),
            display,
            cache_timeout: parse_or(&get, "CACHE_TIMEOUT", defaults.cache_timeout)?,
            font_path: non_empty("FONT_PATH").map(PathBuf::from),
            fact_api_url: non_empty("FACT_API_URL").unwrap_or(defaults.fact_api_url),
            image_url,
        })
    }

    /// Check that every required key is present.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| match *key {
                "TRMNL_API_KEY" => self.trmnl_api_key.is_none(),
                "TRMNL_PLUGIN_UUID" => self.trmnl_plugin_uuid.is_none(),
                _ => false,
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigError(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_timeout)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e| Error::ConfigError(format!("{} must be a number, got {:?}: {}", key, v, e))),
    }
}
