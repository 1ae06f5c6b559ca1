//! Error types for rotalog

use std::path::PathBuf;

/// rotalog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Destination not found: {0}")]
    DestinationNotFound(String),

    #[error("No free backup name for {base} after {attempts} attempts")]
    NamingCollision { base: PathBuf, attempts: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for rotalog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    /// True for errors raised by the filesystem
    pub fn is_io(&self) -> bool {
        matches!(self, Error::IoError(_))
    }
}
