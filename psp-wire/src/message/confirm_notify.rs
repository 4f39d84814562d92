//! `B2S_ConfirmNotify`: broadcaster reports how many subscribers a
//! `NOTIFY` (or `NOTIFY_STREAM`) reached.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, read_minimal_header_optional, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;
use crate::types::b2s;

use super::append_expanded_header;

const HEADERS: [&str; 1] = ["x-identifier"];
const SUBSCRIBERS_HEADER: &str = "x-subscribers";

/// Confirms delivery of the notification named by `identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmNotify {
    /// The notification (or stream) being confirmed.
    pub identifier: Vec<u8>,
    /// How many subscribers the notification reached, if the broadcaster
    /// chooses to report it.
    pub subscribers: Option<u64>,
}

impl ConfirmNotify {
    /// Parses the payload of a `CONFIRM_NOTIFY` message. `subscribers` is
    /// an optional trailing header: absent in minimal mode means the
    /// frame ends after `identifier`; absent in expanded mode means the
    /// `x-subscribers` header was not declared.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let identifier = headers.get(HEADERS[0]).expect("required header read above").clone();
        if identifier.len() > 64 {
            return Err(WireError::Malformed("identifier must be at most 64 bytes".into()));
        }
        let subscribers = if flags.minimal_headers() {
            match read_minimal_header_optional(reader)? {
                Some(bytes) => Some(read_minimal_unsigned(&bytes)?),
                None => None,
            }
        } else {
            match headers.get(SUBSCRIBERS_HEADER) {
                Some(bytes) => Some(read_minimal_unsigned(bytes)?),
                None => None,
            }
        };
        Ok(Self { identifier, subscribers })
    }

    /// Serializes this message.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let values: [&[u8]; 1] = [&self.identifier];
        let mut out =
            serialize_simple_message(b2s::CONFIRM_NOTIFY, &HEADERS, &values, &[], minimal_headers);
        if let Some(subscribers) = self.subscribers {
            let bytes = int_to_minimal_unsigned(subscribers);
            if minimal_headers {
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(&bytes);
            } else {
                append_expanded_header(&mut out, SUBSCRIBERS_HEADER, &bytes);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_with_count() {
        let msg = ConfirmNotify {
            identifier: b"req-1".to_vec(),
            subscribers: Some(3),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(ConfirmNotify::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn round_trip_without_count() {
        let msg = ConfirmNotify {
            identifier: b"req-2".to_vec(),
            subscribers: None,
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(ConfirmNotify::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }
}
