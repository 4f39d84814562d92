//! `S2B_ConfirmReceive`: subscriber acknowledges full receipt of a
//! notification (or stream) identified by `identifier`.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, serialize_simple_message};
use crate::reader::Reader;
use crate::types::s2b;

const HEADERS: [&str; 1] = ["x-identifier"];

/// Acknowledges receipt of the notification named by `identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmReceive {
    /// The notification (or stream) being acknowledged. At most 64 bytes.
    pub identifier: Vec<u8>,
}

impl ConfirmReceive {
    /// Parses the payload of a `CONFIRM_RECEIVE` message.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let identifier = headers.get(HEADERS[0]).expect("required header read above").clone();
        if identifier.len() > 64 {
            return Err(WireError::Malformed("identifier must be at most 64 bytes".into()));
        }
        Ok(Self { identifier })
    }

    /// Serializes this message.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let values: [&[u8]; 1] = [&self.identifier];
        serialize_simple_message(s2b::CONFIRM_RECEIVE, &HEADERS, &values, &[], minimal_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let msg = ConfirmReceive {
            identifier: b"req-1".to_vec(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(ConfirmReceive::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn oversized_identifier_is_malformed() {
        let msg = ConfirmReceive {
            identifier: vec![0u8; 65],
        };
        let bytes = msg.try_build(true);
        let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
        let mut reader = Reader::new(&bytes[4..]);
        assert!(ConfirmReceive::try_parse(flags, &mut reader).is_err());
    }
}
