use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{GateError, Result};

/// Process-wide settings, read once at start-up and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Notification channel address; empty disables alerting
    pub alert_channel: String,
    /// Suffix of object keys that get validated (case-insensitive)
    pub extension: String,
    pub schema: SchemaConfig,
    pub storage: StorageConfig,
    pub http_timeout_seconds: u64,
}

/// Column names of the required header set.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    pub identifier: String,
    pub contact_address: String,
    pub enrollment_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Local directory holding one sub-directory per container
    pub root: Option<String>,
    /// Base URL of an S3-compatible endpoint, objects at `<base_url>/<container>/<key>`
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alert_channel: String::new(),
            extension: constants::DEFAULT_EXTENSION.to_string(),
            schema: SchemaConfig::default(),
            storage: StorageConfig::default(),
            http_timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            identifier: constants::IDENTIFIER_COLUMN.to_string(),
            contact_address: constants::CONTACT_ADDRESS_COLUMN.to_string(),
            enrollment_date: constants::ENROLLMENT_DATE_COLUMN.to_string(),
        }
    }
}

impl Config {
    /// Load the optional TOML file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let explicit = std::env::var("CSV_GATE_CONFIG").ok();
        let path = explicit
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(GateError::Config(format!("config file '{}' does not exist", path)));
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("Failed to read config file '{}': {}", path, e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay values from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(channel) = lookup("ALERT_CHANNEL").or_else(|| lookup("SNS_TOPIC_ARN")) {
            self.alert_channel = channel.trim().to_string();
        }
        if let Some(ext) = lookup("CSV_EXTENSION") {
            self.extension = ext;
        }
        if let Some(root) = lookup("STORAGE_ROOT") {
            self.storage.root = Some(root);
        }
        if let Some(url) = lookup("STORAGE_BASE_URL") {
            self.storage.base_url = Some(url);
        }
        if let Some(token) = lookup("STORAGE_TOKEN") {
            self.storage.token = Some(token);
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECONDS") {
            self.http_timeout_seconds = secs.parse().map_err(|_| {
                GateError::Config(format!("HTTP_TIMEOUT_SECONDS must be an integer, got '{}'", secs))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extension.trim().is_empty() {
            return Err(GateError::Config("extension must not be empty".to_string()));
        }
        let columns = [
            &self.schema.identifier,
            &self.schema.contact_address,
            &self.schema.enrollment_date,
        ];
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(GateError::Config("schema column names must not be empty".to_string()));
        }
        if self.storage.root.is_some() && self.storage.base_url.is_some() {
            return Err(GateError::Config(
                "configure either storage.root or storage.base_url, not both".to_string(),
            ));
        }
        if self.http_timeout_seconds == 0 {
            return Err(GateError::Config("http_timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }

    pub fn alerting_enabled(&self) -> bool {
        !self.alert_channel.is_empty()
    }
}
