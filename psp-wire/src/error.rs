//! Errors raised while parsing a framed message.

use thiserror::Error;

/// Failure while parsing bytes into a message, or while building a
/// message that violates an invariant of the wire format.
#[derive(Debug, Error)]
pub enum WireError {
    /// The input ended before the expected field could be read.
    #[error("input ended before the expected field could be read")]
    Truncated,

    /// A field violated a width or value invariant of the wire format
    /// (wrong width, duplicate header, unknown mandatory header, oversized
    /// identifier, nonce of the wrong length, and so on).
    #[error("malformed field: {0}")]
    Malformed(String),

    /// The message type code is out of range or has no registered parser.
    #[error("unsupported message type {0}")]
    UnsupportedType(u16),
}
