//! Configuration types for vaultpost.
//!
//! Follows a builder pattern for complex configuration with validation.
//! Settings are passed explicitly into the resolver, client and publisher;
//! nothing reads them from global state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum asset size read from the vault (10MB)
pub const DEFAULT_MAX_ASSET_SIZE: u64 = 10 * 1024 * 1024;

/// Which JSON field of an upload response carries the asset URL.
///
/// Forum versions disagree: some return an absolute `url`, others only an
/// `upload://` style `short_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlField {
    /// Only `url`
    Url,
    /// Only `short_url`
    ShortUrl,
    /// `url`, falling back to `short_url`
    #[default]
    Either,
}

impl UrlField {
    /// Pull the configured URL field out of an upload response
    pub fn extract(self, response: &serde_json::Value) -> Option<String> {
        let field = |name: &str| {
            response
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        match self {
            Self::Url => field("url"),
            Self::ShortUrl => field("short_url"),
            Self::Either => field("url").or_else(|| field("short_url")),
        }
    }

    /// Field names searched, for diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::ShortUrl => "short_url",
            Self::Either => "url or short_url",
        }
    }
}

impl std::str::FromStr for UrlField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(Self::Url),
            "short_url" => Ok(Self::ShortUrl),
            "either" => Ok(Self::Either),
            other => Err(Error::config_error(format!(
                "Unknown url_field '{}'. Valid options: url, short_url, either",
                other
            ))),
        }
    }
}

fn default_excluded_paths() -> HashSet<String> {
    [".obsidian", ".git", ".trash", ".DS_Store", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_asset_size() -> u64 {
    DEFAULT_MAX_ASSET_SIZE
}

fn default_category() -> u64 {
    1
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for the local vault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Path to the vault directory
    pub path: PathBuf,
    /// Folder or file names never searched when resolving embeds
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: HashSet<String>,
    /// Largest asset, in bytes, that will be read for upload
    #[serde(default = "default_max_asset_size")]
    pub max_asset_size: u64,
}

impl VaultConfig {
    /// Create a new vault config with builder
    pub fn builder(path: impl Into<PathBuf>) -> VaultConfigBuilder {
        VaultConfigBuilder::new(path)
    }

    /// Validate the vault configuration
    pub fn validate(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(Error::config_error(format!(
                "Vault path does not exist: {}",
                self.path.display()
            )));
        }

        if !self.path.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                self.path.display()
            )));
        }

        if self.max_asset_size == 0 {
            return Err(Error::config_error("max_asset_size must be greater than 0"));
        }

        Ok(())
    }
}

/// Builder for VaultConfig
pub struct VaultConfigBuilder {
    path: PathBuf,
    excluded_paths: HashSet<String>,
    max_asset_size: u64,
}

impl VaultConfigBuilder {
    /// Create a new builder
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            excluded_paths: default_excluded_paths(),
            max_asset_size: DEFAULT_MAX_ASSET_SIZE,
        }
    }

    /// Add a folder or file name to skip during resolution
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded_paths.insert(name.into());
        self
    }

    /// Set max_asset_size
    pub fn max_asset_size(mut self, bytes: u64) -> Self {
        self.max_asset_size = bytes;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<VaultConfig> {
        let config = VaultConfig {
            path: self.path,
            excluded_paths: self.excluded_paths,
            max_asset_size: self.max_asset_size,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Connection settings for the forum server
#[derive(Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    /// Base URL of the forum, without trailing slash
    pub base_url: String,
    /// User-created API key
    pub api_key: String,
    /// Username the API key acts as
    pub api_username: String,
    /// Category new topics are posted to
    #[serde(default = "default_category")]
    pub category: u64,
    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Which field of the upload response carries the URL
    #[serde(default)]
    pub url_field: UrlField,
}

impl ForumConfig {
    /// Create a new forum config with builder
    pub fn builder(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_username: impl Into<String>,
    ) -> ForumConfigBuilder {
        ForumConfigBuilder::new(base_url, api_key, api_username)
    }

    /// Validate the forum configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config_error("Forum base_url cannot be empty"));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config_error(format!(
                "Forum base_url must start with http:// or https://: {}",
                self.base_url
            )));
        }

        if self.api_key.is_empty() {
            return Err(Error::config_error("Forum api_key cannot be empty"));
        }

        if self.api_username.is_empty() {
            return Err(Error::config_error("Forum api_username cannot be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::config_error(
                "request_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join an API path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ForumConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForumConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_username", &self.api_username)
            .field("category", &self.category)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("url_field", &self.url_field)
            .finish()
    }
}

/// Builder for ForumConfig
pub struct ForumConfigBuilder {
    base_url: String,
    api_key: String,
    api_username: String,
    category: u64,
    request_timeout_secs: u64,
    url_field: UrlField,
}

impl ForumConfigBuilder {
    /// Create a new builder
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_username: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_username: api_username.into(),
            category: default_category(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            url_field: UrlField::default(),
        }
    }

    /// Set the target category
    pub fn category(mut self, category: u64) -> Self {
        self.category = category;
        self
    }

    /// Set request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the upload response URL field
    pub fn url_field(mut self, field: UrlField) -> Self {
        self.url_field = field;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<ForumConfig> {
        let config = ForumConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
            api_username: self.api_username,
            category: self.category,
            request_timeout_secs: self.request_timeout_secs,
            url_field: self.url_field,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub vault: VaultConfig,
    pub forum: ForumConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl SyncConfig {
    /// Create configuration from its parts
    pub fn new(vault: VaultConfig, forum: ForumConfig) -> Self {
        Self {
            vault,
            forum,
            log_level: default_log_level(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.vault.validate()?;
        self.forum.validate()
    }

    /// Placeholder configuration written by `config init`
    pub fn template() -> Self {
        Self {
            vault: VaultConfig {
                path: PathBuf::from("."),
                excluded_paths: default_excluded_paths(),
                max_asset_size: DEFAULT_MAX_ASSET_SIZE,
            },
            forum: ForumConfig {
                base_url: "https://forum.example.com".to_string(),
                api_key: "apikey".to_string(),
                api_username: "username".to_string(),
                category: default_category(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                url_field: UrlField::default(),
            },
            log_level: default_log_level(),
        }
    }

    /// Save configuration to a YAML file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, yaml).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to save config to {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration from a YAML file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
