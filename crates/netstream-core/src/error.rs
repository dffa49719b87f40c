//! Error types for Netstream Core

use thiserror::Error;

/// Result type alias for console and adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Console error types
#[derive(Error, Debug)]
pub enum Error {
    // User input errors
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    MalformedDrm(String),

    // Reachability errors
    #[error("Stream test failed: {0}")]
    Probe(String),

    // Widget errors
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Player widget call failed: {0}")]
    Widget(String),

    // Host errors
    #[error("Platform call failed: {0}")]
    Platform(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a ClearKey parse error with the message shown to the user
    pub fn malformed_clearkey() -> Self {
        Error::MalformedDrm("Invalid ClearKey JSON format".to_string())
    }

    /// Returns true if this error belongs to the user-visible taxonomy
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::MalformedDrm(_) | Error::Probe(_) | Error::Playback(_)
        )
    }

    /// Returns the error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::MalformedDrm(_) => "MALFORMED_DRM",
            Error::Probe(_) => "PROBE",
            Error::Playback(_) => "PLAYBACK",
            Error::Widget(_) => "WIDGET",
            Error::Platform(_) => "PLATFORM",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        let err = Error::malformed_clearkey();
        assert_eq!(err.to_string(), "Invalid ClearKey JSON format");
        assert!(err.is_user_facing());

        let err = Error::Probe("HTTP error! status: 404".into());
        assert_eq!(err.to_string(), "Stream test failed: HTTP error! status: 404");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Validation(String::new()).error_code(), "VALIDATION");
        assert_eq!(Error::Widget("boom".into()).error_code(), "WIDGET");
        assert!(!Error::Platform("denied".into()).is_user_facing());
    }
}
