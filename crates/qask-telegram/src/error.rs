//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TG_BOT_TOKEN environment variable.")]
    NoToken,

    /// A route was registered with an empty path.
    #[error("Route path must not be empty")]
    EmptyRoute,

    /// A private handler ran without a session.
    #[error("No session for chat {0}")]
    MissingSession(i64),

    /// The qask backend rejected a request or could not be reached.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Sending or editing a Telegram message failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid or unreadable configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        BotError::Backend(e.to_string())
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(e: teloxide::RequestError) -> Self {
        BotError::Transport(e.to_string())
    }
}

impl From<url::ParseError> for BotError {
    fn from(e: url::ParseError) -> Self {
        BotError::Config(format!("invalid backend url: {}", e))
    }
}
