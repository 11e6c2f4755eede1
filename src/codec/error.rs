//! Selection token decode errors
//!
//! Any of these means the submitted token was not produced by the codec, or was
//! altered on the way back. Target resolution drops such tokens instead of
//! failing the whole operation.

use thiserror::Error;

/// Reasons a selection token cannot be decoded
#[derive(Debug, Error)]
pub enum CodecError {
    /// Token is not valid standard base64
    #[error("Token is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8
    #[error("Token payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload is not a JSON object
    #[error("Malformed token payload: {0}")]
    MalformedPayload(String),

    /// Payload object has the wrong number of fields
    #[error("Token payload has {found} field(s), expected {expected}")]
    InvalidArity { expected: usize, found: usize },

    /// A required field is absent
    #[error("Token payload is missing field '{0}'")]
    MissingField(&'static str),

    /// A field holds something other than a string
    #[error("Token payload field '{0}' is not a string")]
    InvalidField(&'static str),

    /// Payload decodes but is not the canonical encoding of its identifier
    #[error("Token payload is not in canonical form")]
    NonCanonical,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
