//! `S2B_ContinueReceive` / `B2S_ContinueNotify`: per-part flow control for
//! a stream, acknowledging one `part_id` at a time.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;

const HEADERS: [&str; 2] = ["x-identifier", "x-part-id"];

/// Acknowledges one part of a stream named by `identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continue {
    /// The stream this acknowledgement belongs to.
    pub identifier: Vec<u8>,
    /// The part being acknowledged.
    pub part_id: u64,
}

impl Continue {
    /// Parses the common `{identifier, part_id}` payload shape.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let identifier = headers.get(HEADERS[0]).expect("required header read above").clone();
        if identifier.len() > 64 {
            return Err(WireError::Malformed("identifier must be at most 64 bytes".into()));
        }
        let part_id_bytes = headers.get(HEADERS[1]).expect("required header read above");
        if part_id_bytes.len() > 8 {
            return Err(WireError::Malformed("x-part-id max 8 bytes".into()));
        }
        let part_id = read_minimal_unsigned(part_id_bytes)?;
        Ok(Self { identifier, part_id })
    }

    /// Serializes this message under `msg_type` (shared by
    /// `CONTINUE_RECEIVE` and `CONTINUE_NOTIFY`, which carry this shape in
    /// opposite directions).
    pub fn try_build(&self, msg_type: u16, minimal_headers: bool) -> Vec<u8> {
        let part_id_bytes = int_to_minimal_unsigned(self.part_id);
        let values: [&[u8]; 2] = [&self.identifier, &part_id_bytes];
        serialize_simple_message(msg_type, &HEADERS, &values, &[], minimal_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{b2s, s2b};

    #[test]
    fn round_trip_both_directions() {
        let msg = Continue {
            identifier: b"stream-1".to_vec(),
            part_id: 5,
        };
        for msg_type in [s2b::CONTINUE_RECEIVE, b2s::CONTINUE_NOTIFY] {
            for minimal in [true, false] {
                let bytes = msg.try_build(msg_type, minimal);
                let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
                let mut reader = Reader::new(&bytes[4..]);
                assert_eq!(Continue::try_parse(flags, &mut reader).unwrap(), msg);
            }
        }
    }

    #[test]
    fn oversized_part_id_is_malformed() {
        let mut out = Vec::new();
        out.extend_from_slice(&2u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&9u16.to_be_bytes());
        out.extend_from_slice(&[0u8; 9]);
        let flags = MessageFlags::new(true);
        let mut reader = Reader::new(&out);
        assert!(Continue::try_parse(flags, &mut reader).is_err());
    }
}
