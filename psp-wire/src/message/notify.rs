//! `S2B_Notify`: a one-shot (or session) publish request.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, read_minimal_header, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;
use crate::types::s2b;

use super::append_expanded_header;

const HEADERS: [&str; 4] = ["x-authorization", "x-identifier", "x-topic", "x-compressor-id"];
const SHA512_HEADER: &str = "x-sha512";
const DECOMPRESSED_LENGTH_HEADER: &str = "x-decompressed-length";

fn sha512_from_slice(bytes: &[u8]) -> Result<[u8; 64], WireError> {
    bytes
        .try_into()
        .map_err(|_| WireError::Malformed("sha-512 digest must be 64 bytes".into()))
}

/// The two shapes a notification payload can take, discriminated on the
/// wire by whether `compressor_id` is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyBody {
    /// `compressor_id == 0`: the message travels uncompressed.
    Uncompressed {
        /// SHA-512 of `message`, computed by the sender and re-verified by
        /// the broadcaster.
        sha512: [u8; 64],
        /// The notification payload.
        message: Vec<u8>,
    },
    /// `compressor_id != 0`: the message is compressed with the named
    /// compressor.
    Compressed {
        /// Identifies which compressor (and, implicitly, dictionary) was
        /// used; opaque to this codec.
        compressor_id: u64,
        /// SHA-512 of the compressed bytes.
        sha512: [u8; 64],
        /// Size of the message once decompressed.
        decompressed_length: u64,
        /// The compressed notification payload.
        message: Vec<u8>,
    },
}

/// Requests that the broadcaster publish `message` to `topic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notify {
    /// Authorization token, or absent for anonymous notification.
    pub authorization: Option<String>,
    /// Caller-chosen id correlating this notify with its eventual
    /// `CONFIRM_NOTIFY` (and any `CONTINUE_RECEIVE` acks in between).
    pub identifier: Vec<u8>,
    /// The topic to publish to.
    pub topic: Vec<u8>,
    /// The message body, in one of its two compressed-or-not shapes.
    pub body: NotifyBody,
}

impl Notify {
    /// Parses the `NOTIFY` payload. `identifier` must be at most 64 bytes;
    /// `decompressed_length` is read as an optional trailing header,
    /// present only when `compressor_id != 0`.
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
        if identifier.len() > 64 {
            return Err(WireError::Malformed("identifier must be at most 64 bytes".into()));
        }
        let topic = headers.get(HEADERS[2]).expect("required header read above").clone();
        let compressor_id = read_minimal_unsigned(
            headers.get(HEADERS[3]).expect("required header read above"),
        )?;

        let body = if compressor_id == 0 {
            let sha512_bytes = if flags.minimal_headers() {
                read_minimal_header(reader)?
            } else {
                headers
                    .get(SHA512_HEADER)
                    .ok_or_else(|| WireError::Malformed("missing x-sha512".into()))?
                    .clone()
            };
            let message = reader.read_remaining().to_vec();
            NotifyBody::Uncompressed {
                sha512: sha512_from_slice(&sha512_bytes)?,
                message,
            }
        } else {
            let decompressed_length = if flags.minimal_headers() {
                let bytes = read_minimal_header(reader)?;
                read_minimal_unsigned(&bytes)?
            } else {
                let bytes = headers
                    .get(DECOMPRESSED_LENGTH_HEADER)
                    .ok_or_else(|| WireError::Malformed("missing x-decompressed-length".into()))?;
                read_minimal_unsigned(bytes)?
            };
            let sha512_bytes = if flags.minimal_headers() {
                read_minimal_header(reader)?
            } else {
                headers
                    .get(SHA512_HEADER)
                    .ok_or_else(|| WireError::Malformed("missing x-sha512".into()))?
                    .clone()
            };
            let message = reader.read_remaining().to_vec();
            NotifyBody::Compressed {
                compressor_id,
                sha512: sha512_from_slice(&sha512_bytes)?,
                decompressed_length,
                message,
            }
        };

        Ok(Self {
            authorization,
            identifier,
            topic,
            body,
        })
    }

    /// Serializes this message.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let auth = self
            .authorization
            .as_ref()
            .map(|s| s.as_bytes().to_vec())
            .unwrap_or_default();
        let (compressor_id, sha512, message): (u64, &[u8; 64], &[u8]) = match &self.body {
            NotifyBody::Uncompressed { sha512, message } => (0, sha512, message),
            NotifyBody::Compressed {
                compressor_id,
                sha512,
                message,
                ..
            } => (*compressor_id, sha512, message),
        };
        let compressor_bytes = int_to_minimal_unsigned(compressor_id);
        let values: [&[u8]; 4] = [&auth, &self.identifier, &self.topic, &compressor_bytes];
        let mut out = serialize_simple_message(s2b::NOTIFY, &HEADERS, &values, &[], minimal_headers);

        if let NotifyBody::Compressed {
            decompressed_length,
            ..
        } = &self.body
        {
            let len_bytes = int_to_minimal_unsigned(*decompressed_length);
            if minimal_headers {
                out.extend_from_slice(&(len_bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(&len_bytes);
            } else {
                append_expanded_header(&mut out, DECOMPRESSED_LENGTH_HEADER, &len_bytes);
            }
        }
        if minimal_headers {
            out.extend_from_slice(&(sha512.len() as u16).to_be_bytes());
            out.extend_from_slice(sha512);
        } else {
            append_expanded_header(&mut out, SHA512_HEADER, sha512);
        }
        out.extend_from_slice(message);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_round_trip() {
        let msg = Notify {
            authorization: Some("X-HMAC 0:n:AA==".to_string()),
            identifier: b"req-1".to_vec(),
            topic: b"orders.created".to_vec(),
            body: NotifyBody::Uncompressed {
                sha512: [0x11; 64],
                message: b"hello world".to_vec(),
            },
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(Notify::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn compressed_round_trip() {
        let msg = Notify {
            authorization: None,
            identifier: b"req-2".to_vec(),
            topic: b"orders.created".to_vec(),
            body: NotifyBody::Compressed {
                compressor_id: 1,
                sha512: [0x22; 64],
                decompressed_length: 4096,
                message: b"zstd-bytes".to_vec(),
            },
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(Notify::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn oversized_identifier_is_malformed() {
        let msg = Notify {
            authorization: None,
            identifier: vec![0u8; 65],
            topic: b"t".to_vec(),
            body: NotifyBody::Uncompressed {
                sha512: [0u8; 64],
                message: vec![],
            },
        };
        let bytes = msg.try_build(true);
        let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
        let mut reader = Reader::new(&bytes[4..]);
        assert!(Notify::try_parse(flags, &mut reader).is_err());
    }
}
