//! Error types for AT reply decoding

use thiserror::Error;

/// Errors that can occur while postprocessing an accumulated reply line
///
/// Decoders never surface these to the transport; they fold them into the
/// completion status and validity flag of their result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not contain the number of fields the grammar requires
    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// A field that must be numeric could not be parsed
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// A bulk operator line did not match `"<mccmnc>","<name>"`
    #[error("invalid operator line: {0:?}")]
    InvalidOperatorLine(String),
}
