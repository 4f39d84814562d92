//! Errors raised by the authorization and replay-store layers.

use thiserror::Error;

/// Failure constructing or using a [`crate::SharedSecret`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// The supplied base64 did not decode to exactly 64 bytes.
    #[error("shared secret must decode to exactly 64 raw bytes")]
    InvalidSecret,
}

/// Failure in the replay store's insertion path. This is the `Unavailable`
/// outcome surfaced at the authorization boundary: a store I/O failure
/// that the caller may treat as transient.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The underlying store (persistent storage, lock, etc.) failed.
    #[error("replay store unavailable: {0}")]
    Unavailable(String),
}
