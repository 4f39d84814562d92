//! `S2B_NotifyStream`: a notification split across multiple frames.
//!
//! Shares `identifier` across all of a stream's frames. `part_id == 0`
//! carries the start frame's metadata; any other `part_id` carries only a
//! continuation chunk. The codec does not reassemble the stream; it only
//! exposes the parts in the shape the wire carries them.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, read_minimal_header, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;
use crate::types::s2b;

use super::append_expanded_header;

const HEADERS: [&str; 4] = ["x-authorization", "x-identifier", "x-part-id", "x-compressor-id"];
const TOPIC_HEADER: &str = "x-topic";
const LENGTH_HEADER: &str = "x-length";
const DECOMPRESSED_LENGTH_HEADER: &str = "x-decompressed-length";
const SHA512_HEADER: &str = "x-sha512";

/// One frame of a streamed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyStream {
    /// `part_id == 0`: opens the stream with its full metadata plus the
    /// first chunk of payload.
    Start {
        /// Authorization token, or absent for anonymous notification.
        authorization: Option<String>,
        /// Correlates this stream's frames and its eventual confirmation.
        identifier: Vec<u8>,
        /// The topic to publish to.
        topic: Vec<u8>,
        /// `0` for uncompressed, nonzero for the compressor in use.
        compressor_id: u64,
        /// Total size of the message in its wire encoding (compressed, if
        /// `compressor_id != 0`, else the plain message size).
        length: u64,
        /// Present only when `compressor_id != 0`: the size once
        /// decompressed.
        decompressed_length: Option<u64>,
        /// SHA-512 of the full message in its wire encoding.
        sha512: [u8; 64],
        /// The first chunk of payload.
        payload: Vec<u8>,
    },
    /// `part_id != 0`: a continuation chunk with no metadata.
    Continuation {
        /// Authorization token, or absent for anonymous notification.
        authorization: Option<String>,
        /// The stream this continuation belongs to.
        identifier: Vec<u8>,
        /// Strictly increasing within one stream.
        part_id: u64,
        /// The next chunk of payload.
        payload: Vec<u8>,
    },
}

impl NotifyStream {
    /// Parses one frame of a streamed notification.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let authorization = {
            let bytes = headers.get(HEADERS[0]).expect("required header read above");
            if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
        };
        let identifier = headers.get(HEADERS[1]).expect("required header read above").clone();
        let part_id = read_minimal_unsigned(headers.get(HEADERS[2]).expect("required header read above"))?;
        if part_id == 0 {
            let compressor_id =
                read_minimal_unsigned(headers.get(HEADERS[3]).expect("required header read above"))?;
            let topic = if flags.minimal_headers() {
                read_minimal_header(reader)?
            } else {
                headers
                    .get(TOPIC_HEADER)
                    .ok_or_else(|| WireError::Malformed("missing x-topic".into()))?
                    .clone()
            };
            let length = if flags.minimal_headers() {
                read_minimal_unsigned(&read_minimal_header(reader)?)?
            } else {
                read_minimal_unsigned(
                    headers
                        .get(LENGTH_HEADER)
                        .ok_or_else(|| WireError::Malformed("missing x-length".into()))?,
                )?
            };
            let decompressed_length = if compressor_id != 0 {
                Some(if flags.minimal_headers() {
                    read_minimal_unsigned(&read_minimal_header(reader)?)?
                } else {
                    read_minimal_unsigned(headers.get(DECOMPRESSED_LENGTH_HEADER).ok_or_else(
                        || WireError::Malformed("missing x-decompressed-length".into()),
                    )?)?
                })
            } else {
                None
            };
            let sha512_bytes = if flags.minimal_headers() {
                read_minimal_header(reader)?
            } else {
                headers
                    .get(SHA512_HEADER)
                    .ok_or_else(|| WireError::Malformed("missing x-sha512".into()))?
                    .clone()
            };
            let sha512: [u8; 64] = sha512_bytes
                .as_slice()
                .try_into()
                .map_err(|_| WireError::Malformed("sha-512 digest must be 64 bytes".into()))?;
            let payload = reader.read_remaining().to_vec();
            Ok(Self::Start {
                authorization,
                identifier,
                topic,
                compressor_id,
                length,
                decompressed_length,
                sha512,
                payload,
            })
        } else {
            let payload = reader.read_remaining().to_vec();
            Ok(Self::Continuation {
                authorization,
                identifier,
                part_id,
                payload,
            })
        }
    }

    /// Serializes this frame.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        match self {
            Self::Start {
                authorization,
                identifier,
                topic,
                compressor_id,
                length,
                decompressed_length,
                sha512,
                payload,
            } => {
                let auth = authorization.as_ref().map(|s| s.as_bytes().to_vec()).unwrap_or_default();
                let part_id_bytes = int_to_minimal_unsigned(0);
                let compressor_bytes = int_to_minimal_unsigned(*compressor_id);
                let values: [&[u8]; 4] = [&auth, identifier, &part_id_bytes, &compressor_bytes];
                let mut out =
                    serialize_simple_message(s2b::NOTIFY_STREAM, &HEADERS, &values, &[], minimal_headers);
                let length_bytes = int_to_minimal_unsigned(*length);
                write_tail_header(&mut out, minimal_headers, TOPIC_HEADER, topic);
                write_tail_header(&mut out, minimal_headers, LENGTH_HEADER, &length_bytes);
                if let Some(decompressed_length) = decompressed_length {
                    let bytes = int_to_minimal_unsigned(*decompressed_length);
                    write_tail_header(&mut out, minimal_headers, DECOMPRESSED_LENGTH_HEADER, &bytes);
                }
                write_tail_header(&mut out, minimal_headers, SHA512_HEADER, sha512);
                out.extend_from_slice(payload);
                out
            }
            Self::Continuation {
                authorization,
                identifier,
                part_id,
                payload,
            } => {
                let auth = authorization.as_ref().map(|s| s.as_bytes().to_vec()).unwrap_or_default();
                let part_id_bytes = int_to_minimal_unsigned(*part_id);
                let compressor_bytes = int_to_minimal_unsigned(0);
                let values: [&[u8]; 4] = [&auth, identifier, &part_id_bytes, &compressor_bytes];
                let mut out =
                    serialize_simple_message(s2b::NOTIFY_STREAM, &HEADERS, &values, &[], minimal_headers);
                out.extend_from_slice(payload);
                out
            }
        }
    }
}

fn write_tail_header(out: &mut Vec<u8>, minimal: bool, name: &str, value: &[u8]) {
    if minimal {
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value);
    } else {
        append_expanded_header(out, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_round_trip_uncompressed() {
        let msg = NotifyStream::Start {
            authorization: None,
            identifier: b"stream-1".to_vec(),
            topic: b"orders.created".to_vec(),
            compressor_id: 0,
            length: 4096,
            decompressed_length: None,
            sha512: [0x33; 64],
            payload: b"first chunk".to_vec(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(NotifyStream::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn start_round_trip_compressed() {
        let msg = NotifyStream::Start {
            authorization: Some("X-HMAC 0:n:AA==".to_string()),
            identifier: b"stream-2".to_vec(),
            topic: b"orders.created".to_vec(),
            compressor_id: 7,
            length: 1024,
            decompressed_length: Some(8192),
            sha512: [0x44; 64],
            payload: b"first compressed chunk".to_vec(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(NotifyStream::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn continuation_round_trip() {
        let msg = NotifyStream::Continuation {
            authorization: None,
            identifier: b"stream-1".to_vec(),
            part_id: 3,
            payload: b"third chunk".to_vec(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(NotifyStream::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }
}
