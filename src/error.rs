//! # Extraction Error Handling
//!
//! This module defines the ExtractError enum, which represents the failures
//! that can surface from the vw1871-rs crate. Ambiguous or damaged envelope
//! content is never an error; it is reported through
//! [`ExtractionReport`](crate::frame::ExtractionReport) instead.

use crate::util::hex::HexError;
use thiserror::Error;

/// Represents the different error types that can occur in the crate.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Notification text is not valid hexadecimal (non-hex character or odd length).
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] HexError),

    /// Non-empty buffer shorter than the smallest envelope marker.
    ///
    /// The normalizer never produces such a buffer from concentrator output,
    /// so this indicates a caller bug rather than bad device data.
    #[error("Buffer of {len} bytes is shorter than the smallest marker ({min} bytes)")]
    ShortBuffer { len: usize, min: usize },

    /// Configuration is internally inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A capture log record could not be decoded.
    #[error("Capture record on line {line}: {source}")]
    Capture {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Reading configuration or streams failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Whether the error stems from the notification content itself.
    ///
    /// Input errors are counted and skipped by the pipeline; everything else
    /// is propagated to the caller.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExtractError::MalformedInput(_) | ExtractError::ShortBuffer { .. } | ExtractError::Capture { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::ShortBuffer { len: 2, min: 4 };
        assert_eq!(
            err.to_string(),
            "Buffer of 2 bytes is shorter than the smallest marker (4 bytes)"
        );

        let err: ExtractError = HexError::OddLength(3).into();
        assert!(err.to_string().contains("Odd number of hex characters"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(ExtractError::MalformedInput(HexError::InvalidCharacter('Z')).is_input_error());
        assert!(ExtractError::ShortBuffer { len: 1, min: 4 }.is_input_error());
        assert!(!ExtractError::Config("bad".into()).is_input_error());
    }
}
