//! Subscribe/unsubscribe, exact and glob, in both directions.
//!
//! All four operations share one wire shape: an optional authorization
//! token and either an opaque topic or a glob pattern. The confirmation
//! variants echo the same fields back from the broadcaster.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, serialize_simple_message};
use crate::reader::Reader;

const EXACT_HEADERS: [&str; 2] = ["x-authorization", "x-topic"];
const GLOB_HEADERS: [&str; 2] = ["x-authorization", "x-glob"];

fn authorization_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

fn authorization_to_bytes(authorization: &Option<String>) -> Vec<u8> {
    authorization.as_ref().map(|s| s.as_bytes().to_vec()).unwrap_or_default()
}

/// `SUBSCRIBE_EXACT` / `UNSUBSCRIBE_EXACT` / their confirmations: subscribe
/// to (or unsubscribe from) an exact, opaque topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exact {
    /// Authorization token, or absent for anonymous subscriptions.
    pub authorization: Option<String>,
    /// The exact topic bytes.
    pub topic: Vec<u8>,
}

impl Exact {
    /// Parses the common `{authorization, topic}` payload shape.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &EXACT_HEADERS)?;
        let authorization = authorization_from_bytes(
            headers.get(EXACT_HEADERS[0]).expect("required header read above"),
        );
        let topic = headers.get(EXACT_HEADERS[1]).expect("required header read above").clone();
        Ok(Self { authorization, topic })
    }

    /// Serializes this message under `msg_type` (shared by subscribe,
    /// unsubscribe, and their confirmations, which all carry this shape).
    pub fn try_build(&self, msg_type: u16, minimal_headers: bool) -> Vec<u8> {
        let auth = authorization_to_bytes(&self.authorization);
        let values: [&[u8]; 2] = [&auth, &self.topic];
        serialize_simple_message(msg_type, &EXACT_HEADERS, &values, &[], minimal_headers)
    }
}

/// `SUBSCRIBE_GLOB` / `UNSUBSCRIBE_GLOB` / their confirmations: subscribe
/// to (or unsubscribe from) a glob pattern over topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    /// Authorization token, or absent for anonymous subscriptions.
    pub authorization: Option<String>,
    /// The glob pattern, matched against topics broadcaster-side.
    pub glob: String,
}

impl Glob {
    /// Parses the common `{authorization, glob}` payload shape.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &GLOB_HEADERS)?;
        let authorization = authorization_from_bytes(
            headers.get(GLOB_HEADERS[0]).expect("required header read above"),
        );
        let glob_bytes = headers.get(GLOB_HEADERS[1]).expect("required header read above");
        let glob = String::from_utf8(glob_bytes.clone())
            .map_err(|_| WireError::Malformed("x-glob must be valid UTF-8".into()))?;
        Ok(Self { authorization, glob })
    }

    /// Serializes this message under `msg_type`.
    pub fn try_build(&self, msg_type: u16, minimal_headers: bool) -> Vec<u8> {
        let auth = authorization_to_bytes(&self.authorization);
        let glob_bytes = self.glob.as_bytes();
        let values: [&[u8]; 2] = [&auth, glob_bytes];
        serialize_simple_message(msg_type, &GLOB_HEADERS, &values, &[], minimal_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{b2s, s2b};

    #[test]
    fn exact_round_trip_with_and_without_authorization() {
        for authorization in [None, Some("X-HMAC 0:n:AA==".to_string())] {
            let msg = Exact {
                authorization,
                topic: b"orders.created".to_vec(),
            };
            for minimal in [true, false] {
                let bytes = msg.try_build(s2b::SUBSCRIBE_EXACT, minimal);
                let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
                let mut reader = Reader::new(&bytes[4..]);
                assert_eq!(Exact::try_parse(flags, &mut reader).unwrap(), msg);
            }
        }
    }

    #[test]
    fn glob_round_trip() {
        let msg = Glob {
            authorization: Some("X-HMAC 0:n:AA==".to_string()),
            glob: "orders.*".to_string(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(b2s::CONFIRM_SUBSCRIBE_GLOB, minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(Glob::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }
}
