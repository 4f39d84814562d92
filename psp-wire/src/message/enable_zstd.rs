//! `B2S_EnableZstdPreset` / `B2S_EnableZstdCustom`: broadcaster-driven
//! compression negotiation for a session.

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::header::{parse_simple_headers, serialize_simple_message};
use crate::primitives::{int_to_minimal_unsigned, read_minimal_unsigned};
use crate::reader::Reader;
use crate::types::b2s;

const HEADERS: [&str; 4] = ["x-identifier", "x-compression-level", "x-min-size", "x-max-size"];

/// Shared negotiation parameters for both zstd-enabling messages. Note
/// `identifier` here is a small numeric id chosen by the broadcaster to
/// name this negotiation round, distinct from the up-to-64-byte
/// notification `identifier` used elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZstdParams {
    /// Numeric id for this negotiation, at most 8 bytes.
    pub identifier: u64,
    /// Requested zstd compression level, signed, in `[-32768, 22]`.
    pub compression_level: i16,
    /// Minimum message size worth compressing.
    pub min_size: u64,
    /// Maximum message size worth compressing.
    pub max_size: u64,
}

impl ZstdParams {
    fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let headers = parse_simple_headers(flags, reader, &HEADERS)?;
        let identifier_bytes = headers.get(HEADERS[0]).expect("required header read above");
        if identifier_bytes.len() > 8 {
            return Err(WireError::Malformed("x-identifier max 8 bytes".into()));
        }
        let identifier = read_minimal_unsigned(identifier_bytes)?;

        let level_bytes = headers.get(HEADERS[1]).expect("required header read above");
        if level_bytes.len() != 2 {
            return Err(WireError::Malformed("x-compression-level must be 2 bytes".into()));
        }
        let compression_level = i16::from_be_bytes([level_bytes[0], level_bytes[1]]);

        let min_size_bytes = headers.get(HEADERS[2]).expect("required header read above");
        let min_size = read_minimal_unsigned(min_size_bytes)?;

        let max_size_bytes = headers.get(HEADERS[3]).expect("required header read above");
        if max_size_bytes.len() > 8 {
            return Err(WireError::Malformed("x-max-size max 8 bytes".into()));
        }
        let max_size = read_minimal_unsigned(max_size_bytes)?;

        Ok(Self {
            identifier,
            compression_level,
            min_size,
            max_size,
        })
    }

    fn header_values(&self) -> [Vec<u8>; 4] {
        [
            int_to_minimal_unsigned(self.identifier),
            self.compression_level.to_be_bytes().to_vec(),
            int_to_minimal_unsigned(self.min_size),
            int_to_minimal_unsigned(self.max_size),
        ]
    }
}

/// Enables zstd compression using one of the broadcaster's preset
/// dictionaries (or no dictionary at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnableZstdPreset {
    /// The negotiation parameters.
    pub params: ZstdParams,
}

impl EnableZstdPreset {
    /// Parses the payload of an `ENABLE_ZSTD_PRESET` message.
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        Ok(Self {
            params: ZstdParams::try_parse(flags, reader)?,
        })
    }

    /// Serializes this message.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let values = self.params.header_values();
        let refs: [&[u8]; 4] = [&values[0], &values[1], &values[2], &values[3]];
        serialize_simple_message(b2s::ENABLE_ZSTD_PRESET, &HEADERS, &refs, &[], minimal_headers)
    }
}

/// Enables zstd compression using a broadcaster-supplied custom
/// dictionary carried as the message's trailing payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnableZstdCustom {
    /// The negotiation parameters.
    pub params: ZstdParams,
    /// The dictionary bytes: everything left in the frame after the
    /// headers.
    pub dictionary: Vec<u8>,
}

impl EnableZstdCustom {
    /// Parses the payload of an `ENABLE_ZSTD_CUSTOM` message. `dictionary`
    /// is read as all remaining bytes in the frame, which requires a
    /// reader that can report how much is left (see [`Reader::read_remaining`]).
    pub fn try_parse(flags: MessageFlags, reader: &mut Reader) -> Result<Self, WireError> {
        let params = ZstdParams::try_parse(flags, reader)?;
        let dictionary = reader.read_remaining().to_vec();
        Ok(Self { params, dictionary })
    }

    /// Serializes this message, appending `dictionary` as trailing
    /// payload.
    pub fn try_build(&self, minimal_headers: bool) -> Vec<u8> {
        let values = self.params.header_values();
        let refs: [&[u8]; 4] = [&values[0], &values[1], &values[2], &values[3]];
        serialize_simple_message(
            b2s::ENABLE_ZSTD_CUSTOM,
            &HEADERS,
            &refs,
            &self.dictionary,
            minimal_headers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ZstdParams {
        ZstdParams {
            identifier: 1,
            compression_level: 19,
            min_size: 128,
            max_size: 1 << 20,
        }
    }

    #[test]
    fn preset_round_trip() {
        let msg = EnableZstdPreset { params: params() };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(EnableZstdPreset::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn custom_round_trip_with_dictionary() {
        let msg = EnableZstdCustom {
            params: ZstdParams {
                compression_level: -1,
                ..params()
            },
            dictionary: b"dictionary bytes go here".to_vec(),
        };
        for minimal in [true, false] {
            let bytes = msg.try_build(minimal);
            let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
            let mut reader = Reader::new(&bytes[4..]);
            assert_eq!(EnableZstdCustom::try_parse(flags, &mut reader).unwrap(), msg);
        }
    }

    #[test]
    fn oversized_compression_level_is_malformed() {
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_be_bytes());
        out.push(0x01);
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&[0u8; 3]);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.push(0x00);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.push(0x00);
        let flags = MessageFlags::new(true);
        let mut reader = Reader::new(&out);
        assert!(EnableZstdPreset::try_parse(flags, &mut reader).is_err());
    }
}
