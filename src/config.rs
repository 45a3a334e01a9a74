//! Configuration from environment variables

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CHAT_URL: &str = "http://localhost:3000/api/chat";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_RELAY_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is set but empty")]
    Empty { var: &'static str },
    #[error("{var}={value:?} is not a valid port")]
    InvalidPort { var: &'static str, value: String },
}

/// Configuration for the terminal client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Completion endpoint
    pub chat_url: String,
    /// JSON topic catalog replacing the built-in one
    pub topics_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chat_url = non_empty(&var, "INFRABOT_CHAT_URL")?
            .unwrap_or_else(|| DEFAULT_CHAT_URL.to_string());
        let topics_file = non_empty(&var, "INFRABOT_TOPICS")?.map(PathBuf::from);
        let log_file = non_empty(&var, "INFRABOT_LOG_FILE")?.map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.infrabot/chat.log"))
            },
            PathBuf::from,
        );

        Ok(Self {
            chat_url,
            topics_file,
            log_file,
        })
    }
}

/// Configuration for the relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    /// Completion backend base URL
    pub backend_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match non_empty(&var, "INFRABOT_PORT")? {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                var: "INFRABOT_PORT",
                value,
            })?,
            None => DEFAULT_RELAY_PORT,
        };

        let backend_url = match non_empty(&var, "INFRABOT_BACKEND_URL")? {
            Some(url) => url,
            // Name used by the web frontend deployment
            None => var("NEXT_PUBLIC_API_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
        };

        Ok(Self { port, backend_url })
    }
}

fn non_empty(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match var(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var: key }),
        other => Ok(other),
    }
}
