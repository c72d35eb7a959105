//! Bot configuration.
//!
//! The configuration file is TOML:
//!
//! ```toml
//! qask_address = "127.0.0.1"
//! qask_port = "8080"
//! log_level = "debug"
//! log_file = "./logs/qask_telegram.log"
//! request_timeout_secs = 10
//! max_concurrent_updates = 64
//! ```
//!
//! The bot token never lives in the file; it is read from `TG_BOT_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{BotError, Result};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./configs/qask_telegram.conf";

/// Environment variable holding the Telegram bot token.
pub const TOKEN_ENV: &str = "TG_BOT_TOKEN";

/// Bot configuration loaded from the TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Host of the qask backend.
    pub qask_address: String,
    /// Port of the qask backend. Accepts both `8080` and `"8080"`.
    #[serde(deserialize_with = "deserialize_port")]
    pub qask_port: u16,
    /// Log level used when no `-v` flag is given.
    pub log_level: String,
    /// Optional log file; logs go to stdout when unset.
    pub log_file: Option<PathBuf>,
    /// Upper bound for a single backend request.
    pub request_timeout_secs: u64,
    /// How many updates may be handled at the same time.
    pub max_concurrent_updates: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            qask_address: "127.0.0.1".to_string(),
            qask_port: 8080,
            log_level: "info".to_string(),
            log_file: None,
            request_timeout_secs: 10,
            max_concurrent_updates: 64,
        }
    }
}

impl BotConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.qask_address.trim().is_empty() {
            return Err(BotError::Config("qask_address is empty".to_string()));
        }
        if self.max_concurrent_updates == 0 {
            return Err(BotError::Config(
                "max_concurrent_updates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the backend host and port.
    pub fn with_backend(mut self, address: impl Into<String>, port: u16) -> Self {
        self.qask_address = address.into();
        self.qask_port = port;
        self
    }

    /// Sets the backend request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the concurrency bound for update handling.
    pub fn with_max_concurrent_updates(mut self, max: usize) -> Self {
        self.max_concurrent_updates = max;
        self
    }

    /// Returns the base URL of the qask backend.
    pub fn backend_url(&self) -> String {
        format!("http://{}:{}/", self.qask_address, self.qask_port)
    }

    /// Returns the backend request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reads the bot token from the environment.
pub fn bot_token() -> Result<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or(BotError::NoToken)
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
