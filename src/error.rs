//! Error types for the verification code extractor.
//!
//! Extraction itself is infallible for well-typed input: malformed messages
//! are skipped and logged by the orchestrator. The variants here cover the
//! few places where a caller can actually get something wrong.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for extractor operations.
pub type ExtractorResult<T> = Result<T, ExtractorError>;

/// Error type for all extractor operations.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// A custom regex or keyword table failed to compile
    #[error("Pattern error for '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// Caller violated the input contract (e.g. batch is not a list)
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// A single message could not be adapted into a `RawMessage`
    #[error("Malformed message '{message_id}': {reason}")]
    MalformedMessage { message_id: String, reason: String },

    /// Configuration value out of range
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON decoding or encoding failed
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ExtractorError {
    /// Convenience constructor for malformed-message errors.
    pub fn malformed(message_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message_id: message_id.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

impl From<regex::Error> for ExtractorError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern {
            pattern: "<unknown>".to_string(),
            reason: err.to_string(),
        }
    }
}
