//! Configuration errors

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Stable error code for CLI output
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "ANCHORFRAME_CONFIG_IO",
            ConfigError::Parse(_) => "ANCHORFRAME_CONFIG_PARSE",
            ConfigError::Invalid(_) => "ANCHORFRAME_CONFIG_INVALID",
        }
    }
}
