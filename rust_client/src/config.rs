//! Client configuration from environment variables or a TOML file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.aurorax.space";

/// How the job id is read out of the submission's `Location` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobIdExtraction {
    /// Last path segment of the header value, query and fragment ignored.
    /// A trailing `/` leaves the segment empty and yields no id.
    #[default]
    PathSegment,
    /// Trailing fixed-width window of the header value (UUID length).
    FixedWidth,
}

impl FromStr for JobIdExtraction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path_segment" | "path" | "" => Ok(Self::PathSegment),
            "fixed_width" | "fixed" => Ok(Self::FixedWidth),
            other => Err(format!(
                "Unsupported job id extraction '{}'. Use path_segment or fixed_width.",
                other
            )),
        }
    }
}

/// Settings for talking to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.aurorax.space`
    pub base_url: String,
    /// Sent as `x-aurorax-api-key` when set
    pub api_key: Option<String>,
    /// Sent as the `User-Agent` of every request
    pub client_version: String,
    /// Per-request connection timeout
    pub connect_timeout_secs: u64,
    /// Per-request overall timeout; unbounded when `None`
    pub request_timeout_secs: Option<u64>,
    pub job_id_extraction: JobIdExtraction,
    /// Default delay between job status queries
    pub poll_interval_secs: f64,
}

fn default_client_version() -> String {
    format!("aurorax-rust/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_poll_interval() -> f64 {
    1.0
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            client_version: default_client_version(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: None,
            job_id_extraction: JobIdExtraction::default(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `AURORAX_BASE_URL` (optional, default: `https://api.aurorax.space`)
    /// - `AURORAX_API_KEY` (optional)
    /// - `AURORAX_CLIENT_VERSION` (optional): overrides the `User-Agent`
    /// - `AURORAX_CONNECT_TIMEOUT` (optional, default: 10): seconds
    /// - `AURORAX_REQUEST_TIMEOUT` (optional): seconds
    /// - `AURORAX_JOB_ID_EXTRACTION` (optional): `path_segment` | `fixed_width`
    /// - `AURORAX_POLL_INTERVAL` (optional, default: 1.0): seconds
    ///
    /// # Errors
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, SearchError> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("AURORAX_BASE_URL") {
            config.base_url = base_url;
        }
        config.api_key = env::var("AURORAX_API_KEY").ok().filter(|k| !k.is_empty());
        if let Ok(version) = env::var("AURORAX_CLIENT_VERSION") {
            config.client_version = version;
        }
        if let Ok(timeout) = env::var("AURORAX_CONNECT_TIMEOUT") {
            config.connect_timeout_secs = timeout.parse().map_err(|_| {
                SearchError::Configuration(
                    "AURORAX_CONNECT_TIMEOUT must be a whole number of seconds".to_string(),
                )
            })?;
        }
        if let Ok(timeout) = env::var("AURORAX_REQUEST_TIMEOUT") {
            config.request_timeout_secs = Some(timeout.parse().map_err(|_| {
                SearchError::Configuration(
                    "AURORAX_REQUEST_TIMEOUT must be a whole number of seconds".to_string(),
                )
            })?);
        }
        if let Ok(extraction) = env::var("AURORAX_JOB_ID_EXTRACTION") {
            config.job_id_extraction = extraction.parse().map_err(SearchError::Configuration)?;
        }
        if let Ok(interval) = env::var("AURORAX_POLL_INTERVAL") {
            config.poll_interval_secs = interval.parse().map_err(|_| {
                SearchError::Configuration("AURORAX_POLL_INTERVAL must be a number".to_string())
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` if successful
    /// * `Err(SearchError::Configuration)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SearchError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SearchError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            SearchError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        let config = file.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `aurorax.toml` in:
    /// 1. Current directory
    /// 2. `rust_client/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, SearchError> {
        let search_paths = [
            PathBuf::from("aurorax.toml"),
            PathBuf::from("rust_client/aurorax.toml"),
            PathBuf::from("../aurorax.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SearchError::Configuration(
            "No aurorax.toml found in standard locations".to_string(),
        ))
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.base_url.trim().is_empty() {
            return Err(SearchError::Configuration("base_url must not be empty".to_string()));
        }
        if Duration::try_from_secs_f64(self.poll_interval_secs).is_err() {
            return Err(SearchError::Configuration(format!(
                "poll_interval must be a non-negative number of seconds, got {}",
                self.poll_interval_secs
            )));
        }
        Ok(())
    }
}

/// On-disk layout of `aurorax.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiSettings {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_client_version")]
    client_version: String,
    #[serde(default = "default_connect_timeout")]
    connect_timeout: u64,
    #[serde(default)]
    request_timeout: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            client_version: default_client_version(),
            connect_timeout: default_connect_timeout(),
            request_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchSettings {
    #[serde(default)]
    job_id_extraction: JobIdExtraction,
    #[serde(default = "default_poll_interval")]
    poll_interval: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            job_id_extraction: JobIdExtraction::default(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url,
            api_key: self.api.api_key.filter(|k| !k.is_empty()),
            client_version: self.api.client_version,
            connect_timeout_secs: self.api.connect_timeout,
            request_timeout_secs: self.api.request_timeout,
            job_id_extraction: self.search.job_id_extraction,
            poll_interval_secs: self.search.poll_interval,
        }
    }
}
