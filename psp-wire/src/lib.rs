//! # psp-wire
//!
//! Framed message codec for the pubsub wire protocol: primitive encoding
//! helpers, header framing (minimal and expanded), and the per-message
//! parsers/serializers for every subscriber<->broadcaster message kind,
//! plus the direction-specific dispatch tables used to turn a type code
//! and a byte reader into a concrete [`message::S2BMessage`] or
//! [`message::B2SMessage`].

#![warn(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod dispatch;
mod error;
mod flags;
mod header;
pub mod message;
mod primitives;
mod reader;
pub mod types;

pub use dispatch::{parse_b2s, parse_s2b};
pub use error::WireError;
pub use flags::MessageFlags;
pub use primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
pub use reader::Reader;
