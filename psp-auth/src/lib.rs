//! # psp-auth
//!
//! HMAC-SHA-512 authorization for the pubsub protocol: canonical
//! to-sign encoding per operation, token formatting and verification,
//! and the replay-resistance store (none, reentrant, persistent).

#![warn(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod config;
mod error;
pub mod operation;
pub mod replay;
mod secret;
mod sign;
mod token;

pub use config::HmacAuthConfig;
pub use error::{AuthError, ReplayError};
pub use replay::{MarkOutcome, ReplayStore};
pub use secret::SharedSecret;
pub use sign::{Decision, HmacAuth};
pub use token::{make_nonce, TokenInfo};
