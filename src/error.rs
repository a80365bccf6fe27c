//! Error types for aider-ralph
//!
//! Centralized error handling using thiserror. Configuration errors are fatal
//! and stop the run before the loop starts; everything the loop itself can hit
//! is recoverable and surfaced as a warning by the controller.

use std::path::PathBuf;
use thiserror::Error;

/// All error types that can occur while driving the loop
#[derive(Debug, Error)]
pub enum RalphError {
    /// Invalid or incomplete run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The prompt template file could not be read
    #[error("Failed to read prompt file {path}: {source}")]
    PromptRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specs file could not be read
    #[error("Failed to read specs file {path}: {source}")]
    SpecsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The agent subprocess could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Reading the agent's merged output failed mid-iteration
    #[error("Output stream error: {0}")]
    OutputStream(String),

    /// Appending to the notes file failed
    #[error("Failed to append notes to {path}: {source}")]
    NotesAppend {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for aider-ralph operations
pub type Result<T> = std::result::Result<T, RalphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = RalphError::Config("no prompt provided".to_string());
        assert_eq!(err.to_string(), "Configuration error: no prompt provided");
    }

    #[test]
    fn test_spawn_error_display() {
        let err = RalphError::Spawn {
            program: "aider".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("aider"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RalphError = io.into();
        assert!(matches!(err, RalphError::Io(_)));
    }

    #[test]
    fn test_output_stream_error_display() {
        let err = RalphError::OutputStream("line exceeded 1 MiB".to_string());
        assert_eq!(err.to_string(), "Output stream error: line exceeded 1 MiB");
    }
}
