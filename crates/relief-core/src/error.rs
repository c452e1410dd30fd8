//! Error types for Relief

use thiserror::Error;

/// The main error type for Relief operations
#[derive(Debug, Error)]
pub enum ReliefError {
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: f64 },

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl ReliefError {
    pub fn invalid_parameter(name: &str, value: impl Into<f64>) -> Self {
        ReliefError::InvalidParameter {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Result type alias for Relief operations
pub type Result<T> = std::result::Result<T, ReliefError>;

impl From<toml::de::Error> for ReliefError {
    fn from(err: toml::de::Error) -> Self {
        ReliefError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ReliefError {
    fn from(err: toml::ser::Error) -> Self {
        ReliefError::TomlSerError(err.to_string())
    }
}

/// Reject NaN and infinite values for a named parameter
pub fn ensure_finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ReliefError::invalid_parameter(name, value))
    }
}
