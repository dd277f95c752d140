//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid with `ARXIV_QUERY_*` environment
//! variables (nested keys use `__`, e.g. `ARXIV_QUERY_DOWNLOADS__DIRECTORY=papers`).
//!
//! ```toml
//! [api]
//! base_url = "http://export.arxiv.org/api/query"
//! user_agent = "arxiv-query/0.1.0"
//! timeout_secs = 60
//!
//! [downloads]
//! directory = "pdfs"
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sources::ARXIV_API_URL;
use crate::utils::DEFAULT_USER_AGENT;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "arxiv-query.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ARXIV_QUERY";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Download settings
    #[serde(default)]
    pub downloads: DownloadConfig,
}

/// Search endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Overall request timeout; requests never time out when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    ARXIV_API_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Download configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory PDFs are written into, relative to the working directory
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,

    /// Whether linked PDFs are downloaded at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
            enabled: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("pdfs")
}

fn default_true() -> bool {
    true
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    load_config_with_env(path, environment())
}

/// `ARXIV_QUERY_*` variables, with `__` between nested keys
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn load_config_with_env(
    path: Option<&Path>,
    env: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder.add_source(env).build()?;

    settings.try_deserialize()
}

/// Look for a config file in the working directory, then in the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("arxiv-query").join("config.toml"))
        .filter(|path| path.is_file())
}
