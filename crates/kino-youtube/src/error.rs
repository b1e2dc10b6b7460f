//! Error types for Kino YouTube
//!
//! Playback operations never fail: a missing embed or an unknown duration is
//! a silent no-op. Errors only surface while loading configuration.

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Returns the error code for host-side reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "CONFIG_PARSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::config("src missing").error_code(), "INVALID_CONFIG");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).error_code(), "CONFIG_PARSE");
    }

    #[test]
    fn test_error_display() {
        let err = Error::config("src must not be empty");
        assert_eq!(err.to_string(), "Invalid configuration: src must not be empty");
    }
}
