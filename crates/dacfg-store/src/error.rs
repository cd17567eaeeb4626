use std::fmt;

use dacfg_core::{ConfigError, SetupError};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Config(ConfigError),
    Setup(SetupError),
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Toml(e) => write!(f, "TOML error: {e}"),
            StoreError::Json(e) => write!(f, "JSON error: {e}"),
            StoreError::Config(e) => write!(f, "invalid configuration: {e}"),
            StoreError::Setup(e) => write!(f, "invalid setup: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Toml(e) => Some(e),
            StoreError::Json(e) => Some(e),
            StoreError::Config(e) => Some(e),
            StoreError::Setup(e) => Some(e),
            StoreError::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Toml(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        StoreError::Config(e)
    }
}

impl From<SetupError> for StoreError {
    fn from(e: SetupError) -> Self {
        StoreError::Setup(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
