//! `S2B_Configure` / `B2S_ConfirmConfigure`: the session handshake pair.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, read_minimal_header_optional, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;
use crate::types::s2b;

const HEADERS: [&str; 3] = ["x-subscriber-nonce", "x-enable-zstd", "x-enable-training"];

/// Opens a stateful session: the subscriber's half of the nonce exchange
/// and its compression preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configure {
    /// 32 random bytes contributed by the subscriber toward the session
    /// nonce.
    pub subscriber_nonce: [u8; 32],
    /// Whether the subscriber accepts zstandard-compressed messages.
    pub enable_zstd: bool,
    /// Whether the subscriber accepts custom compression dictionaries.
    pub enable_training: bool,
    /// Preset dictionary id the subscriber suggests, or 0 for none. A
    /// value of 1 is reserved and treated as "no suggestion".
    pub initial_dict: u64,
}

impl Configure {
    /// Parses the payload of a `CONFIGURE` message. `initial_dict` is
    /// carried as an optional trailing minimal-mode header / an optional
    /// `x-initial-dict` expanded header, defaulting to 0 when absent in
    /// either mode.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let nonce_bytes = headers.get(HEADERS[0]).expect("required header read above");
        let subscriber_nonce: [u8; 32] = nonce_bytes
            .as_slice()
            .try_into()
            .map_err(|_| WireError::Malformed("x-subscriber-nonce must be 32 bytes".into()))?;

        let enable_zstd = headers.get(HEADERS[1]).map(|v| v.as_slice()) == Some(&[0x01]);
        let enable_training = headers.get(HEADERS[2]).map(|v| v.as_slice()) == Some(&[0x01]);

        let initial_dict = if flags.minimal_headers() {
            match read_minimal_header_optional(reader)? {
                Some(bytes) => read_minimal_unsigned(&bytes)?,
                None => 0,
            }
        } else {
            match headers.get("x-initial-dict") {
                Some(bytes) => {
                    if bytes.len() > 2 {
                        return Err(WireError::Malformed("x-initial-dict max 2 bytes".into()));
                    }
                    read_minimal_unsigned(bytes)?
                }
                None => 0,
            }
        };

        Ok(Self {
            subscriber_nonce,
            enable_zstd,
            enable_training,
            initial_dict,
        })
    }

    /// Serializes this message. `initial_dict` is only emitted in minimal
    /// mode: expanded mode's three declared header names drop it, matching
    /// the upstream protocol's asymmetry between the two header framings.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let zstd = if self.enable_zstd { [0x01] } else { [0x00] };
        let training = if self.enable_training { [0x01] } else { [0x00] };
        let values: [&[u8]; 3] = [&self.subscriber_nonce, &zstd, &training];
        let mut out = serialize_simple_message(s2b::CONFIGURE, &HEADERS, &values, &[], minimal_headers);
        if minimal_headers {
            let dict = int_to_minimal_unsigned(self.initial_dict);
            out.extend_from_slice(&(dict.len() as u16).to_be_bytes());
            out.extend_from_slice(&dict);
        }
        out
    }
}

/// Acknowledges [`Configure`] with the broadcaster's half of the nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmConfigure {
    /// 32 random bytes contributed by the broadcaster.
    pub broadcaster_nonce: [u8; 32],
}

impl ConfirmConfigure {
    const HEADERS: [&'static str; 1] = ["x-broadcaster-nonce"];

    /// Parses the payload of a `CONFIRM_CONFIGURE` message.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &Self::HEADERS)?;
        let nonce_bytes = headers
            .get(Self::HEADERS[0])
            .expect("required header read above");
        let broadcaster_nonce: [u8; 32] = nonce_bytes
            .as_slice()
            .try_into()
            .map_err(|_| WireError::Malformed("x-broadcaster-nonce must be 32 bytes".into()))?;
        Ok(Self { broadcaster_nonce })
    }

    /// Serializes this message.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let values: [&[u8]; 1] = [&self.broadcaster_nonce];
        serialize_simple_message(
            crate::types::b2s::CONFIRM_CONFIGURE,
            &Self::HEADERS,
            &values,
            &[],
            minimal_headers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configure_literal() -> Configure {
        Configure {
            subscriber_nonce: [0x01; 32],
            enable_zstd: true,
            enable_training: false,
            initial_dict: 0,
        }
    }

    #[test]
    fn configure_minimal_literal_bytes() {
        let built = configure_literal().try_build(true);
        let mut expected = vec![0x00, 0x01, 0x00, 0x01];
        expected.extend_from_slice(&0x0020u16.to_be_bytes());
        expected.extend_from_slice(&[0x01; 32]);
        expected.extend_from_slice(&0x0001u16.to_be_bytes());
        expected.push(0x01);
        expected.extend_from_slice(&0x0001u16.to_be_bytes());
        expected.push(0x00);
        expected.extend_from_slice(&0x0001u16.to_be_bytes());
        expected.push(0x00);
        assert_eq!(built, expected);
    }

    #[test]
    fn configure_round_trip_both_modes() {
        for minimal in [true, false] {
            let msg = configure_literal();
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            let parsed = Configure::try_parse(flags, &mut reader).unwrap();
            assert_eq!(parsed, msg);
        }
    }

    #[test]
    fn confirm_configure_rejects_short_nonce() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&31u16.to_be_bytes());
        payload.extend_from_slice(&[0u8; 31]);
        let flags = MessageFlags::new(true);
        let mut reader = Reader::new(&payload);
        assert!(ConfirmConfigure::try_parse(flags, &mut reader).is_err());
    }

    #[test]
    fn confirm_configure_round_trip() {
        let msg = ConfirmConfigure {
            broadcaster_nonce: [0x02; 32],
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            let parsed = ConfirmConfigure::try_parse(flags, &mut reader).unwrap();
            assert_eq!(parsed, msg);
        }
    }
}
