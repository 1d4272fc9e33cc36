//! Error types for the tmdtop-core library.
//!
//! Telemetry queries never surface these to their callers; they exist so the
//! command layer can tell a missing tool from a tool that simply had nothing
//! to report, and log the difference.

use thiserror::Error;

/// Result type alias for tmdtop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting telemetry or loading configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The command could not be started at all.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// The command ran but exited unsuccessfully.
    #[error("Command `{program}` exited with status {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    NonZeroExit { program: String, code: Option<i32> },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_display() {
        let err = Error::NonZeroExit {
            program: "netstat".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "Command `netstat` exited with status 1");

        let err = Error::NonZeroExit {
            program: "ss".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("signal"));
    }
}
