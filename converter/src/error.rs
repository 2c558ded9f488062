//! Error types for the CSV to JSON conversion pipeline.
//!
//! - [`ConvertError`] - conversion core (detection, parsing, projection, serialization)
//! - [`PipelineError`] - core errors plus reading and decoding the input
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors raised by the pure conversion core.
///
/// Every variant is terminal for a single conversion: no partial JSON is
/// produced when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The text contains neither a semicolon nor a comma.
    #[error("Unable to detect CSV delimiter (no ';' or ',' found)")]
    NoDelimiterDetected,

    /// Quoting is broken (unterminated quote, garbage after a closing quote).
    #[error("Malformed CSV at line {line}: {reason}")]
    MalformedCsv { line: usize, reason: String },

    /// There is no header row at all.
    #[error("CSV document is empty, nothing to convert")]
    EmptyDocument,

    /// A header name is blank after trimming (1-based column).
    #[error("Header name is missing in column {column}")]
    InvalidHeader { column: usize },

    /// Two header names collide under case-insensitive comparison.
    #[error("Header contains a duplicate name: '{name}'")]
    DuplicateHeader { name: String },

    /// Explicit delimiter outside the supported set.
    #[error("Unsupported delimiter: {0:?}")]
    UnsupportedDelimiter(char),

    /// JSON rendering failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Serialization(err.to_string())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Errors from the file/bytes entry points.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Conversion error.
    #[error("{0}")]
    Convert(#[from] ConvertError),

    /// Failed to read the input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ConvertError> for ServerError {
    fn from(err: ConvertError) -> Self {
        ServerError::Pipeline(PipelineError::Convert(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let pipeline_err: PipelineError = ConvertError::EmptyDocument.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let server_err: ServerError = ConvertError::NoDelimiterDetected.into();
        assert!(server_err.to_string().contains("delimiter"));
    }

    #[test]
    fn test_malformed_csv_format() {
        let err = ConvertError::MalformedCsv {
            line: 3,
            reason: "unterminated quoted field".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("unterminated"));
    }
}
