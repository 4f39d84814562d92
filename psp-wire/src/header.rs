//! Minimal and expanded header framing, shared by every per-message codec.
//!
//! Expanded headers are self-describing (count, then `(name, value)`
//! pairs); minimal headers carry only values at fixed positions implied by
//! the message type. Both encodings serialize the same logical header
//! set, selected by [`MessageFlags::minimal_headers`].

use std::collections::HashMap;

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::reader::Reader;

/// Writes the flags and type code that open every framed message.
pub fn serialize_prefix(out: &mut Vec<u8>, msg_type: u16, minimal_headers: bool) {
    out.extend_from_slice(&MessageFlags::new(minimal_headers).bits().to_be_bytes());
    out.extend_from_slice(&msg_type.to_be_bytes());
}

/// Writes header values with no names or count, in declaration order.
/// Can be called more than once to build up a message's headers
/// position by position.
pub fn serialize_minimal_headers(out: &mut Vec<u8>, values: &[&[u8]]) {
    for value in values {
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value);
    }
}

/// Writes a count-prefixed `(name, value)` sequence. `names` and `values`
/// must be the same length; names are expected to already be lowercase
/// ASCII.
pub fn serialize_expanded_headers(out: &mut Vec<u8>, names: &[&str], values: &[&[u8]]) {
    assert_eq!(names.len(), values.len());
    out.extend_from_slice(&(names.len() as u16).to_be_bytes());
    for (name, value) in names.iter().zip(values.iter()) {
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value);
    }
}

/// Writes the header section in whichever mode `minimal` selects.
pub fn serialize_simple_headers(out: &mut Vec<u8>, names: &[&str], values: &[&[u8]], minimal: bool) {
    if minimal {
        serialize_minimal_headers(out, values);
    } else {
        serialize_expanded_headers(out, names, values);
    }
}

/// Assembles flags, type, headers, and payload into one framed message.
pub fn serialize_simple_message(
    msg_type: u16,
    names: &[&str],
    values: &[&[u8]],
    payload: &[u8],
    minimal_headers: bool,
) -> Vec<u8> {
    let mut out = Vec::new();
    serialize_prefix(&mut out, msg_type, minimal_headers);
    serialize_simple_headers(&mut out, names, values, minimal_headers);
    out.extend_from_slice(payload);
    out
}

/// Reads one positional (minimal-mode) header value: a 2-byte length
/// followed by that many bytes. Truncation at either step is fatal.
pub fn read_minimal_header(reader: &mut Reader) -> Result<Vec<u8>, WireError> {
    let len = reader.read_u16()? as usize;
    Ok(reader.read_bytes(len)?.to_vec())
}

/// Reads an optional trailing positional header: `None` if the frame has
/// no bytes left, `Some` otherwise. Used for fields that are only sent in
/// some variants of a message (for example `CONFIGURE`'s `initial_dict`).
pub fn read_minimal_header_optional(reader: &mut Reader) -> Result<Option<Vec<u8>>, WireError> {
    if reader.remaining_len() == 0 {
        Ok(None)
    } else {
        Ok(Some(read_minimal_header(reader)?))
    }
}

/// The parsed expanded-header set: a name-to-value mapping. Names not in
/// the caller's known set are retained but otherwise ignored.
pub type HeaderMap = HashMap<String, Vec<u8>>;

/// Reads an expanded-mode header section: a count followed by that many
/// `(name, value)` pairs. A duplicate of a name in `known_names` is
/// `Malformed`; a duplicate unknown name simply overwrites the prior
/// value, satisfying the forward-compatible "preserved and ignored" rule.
pub fn parse_expanded_headers(
    reader: &mut Reader,
    known_names: &[&str],
) -> Result<HeaderMap, WireError> {
    let count = reader.read_u16()? as usize;
    let mut map = HeaderMap::with_capacity(count);
    for _ in 0..count {
        let name_len = reader.read_u16()? as usize;
        let name_bytes = reader.read_bytes(name_len)?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| WireError::Malformed("header name is not valid ASCII".into()))?
            .to_string();
        let value_len = reader.read_u16()? as usize;
        let value = reader.read_bytes(value_len)?.to_vec();
        if map.contains_key(&name) && known_names.contains(&name.as_str()) {
            return Err(WireError::Malformed(format!("duplicate header {name}")));
        }
        map.insert(name, value);
    }
    Ok(map)
}

/// Reads the fixed header set `names` in whichever mode `flags` selects.
/// In minimal mode, values are bound to names purely by position.
pub fn parse_simple_headers(
    flags: MessageFlags,
    reader: &mut Reader,
    names: &[&str],
) -> Result<HeaderMap, WireError> {
    if flags.minimal_headers() {
        let mut map = HeaderMap::with_capacity(names.len());
        for name in names {
            map.insert((*name).to_string(), read_minimal_header(reader)?);
        }
        Ok(map)
    } else {
        parse_expanded_headers(reader, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_round_trip() {
        let mut out = Vec::new();
        serialize_expanded_headers(&mut out, &["x-a", "x-b"], &[b"1".as_slice(), b"22".as_slice()]);
        let mut reader = Reader::new(&out);
        let map = parse_expanded_headers(&mut reader, &["x-a", "x-b"]).unwrap();
        assert_eq!(map.get("x-a").unwrap(), b"1");
        assert_eq!(map.get("x-b").unwrap(), b"22");
    }

    #[test]
    fn minimal_round_trip() {
        let mut out = Vec::new();
        serialize_minimal_headers(&mut out, &[b"1".as_slice(), b"22".as_slice()]);
        let mut reader = Reader::new(&out);
        assert_eq!(read_minimal_header(&mut reader).unwrap(), b"1");
        assert_eq!(read_minimal_header(&mut reader).unwrap(), b"22");
    }

    #[test]
    fn minimal_optional_trailing_header_absent() {
        let mut out = Vec::new();
        serialize_minimal_headers(&mut out, &[b"1".as_slice()]);
        let mut reader = Reader::new(&out);
        assert_eq!(read_minimal_header(&mut reader).unwrap(), b"1");
        assert_eq!(read_minimal_header_optional(&mut reader).unwrap(), None);
    }

    #[test]
    fn duplicate_known_header_is_malformed() {
        let mut out = Vec::new();
        out.extend_from_slice(&2u16.to_be_bytes());
        for _ in 0..2 {
            out.extend_from_slice(&3u16.to_be_bytes());
            out.extend_from_slice(b"x-a");
            out.extend_from_slice(&1u16.to_be_bytes());
            out.extend_from_slice(b"1");
        }
        let mut reader = Reader::new(&out);
        assert!(parse_expanded_headers(&mut reader, &["x-a"]).is_err());
    }
}
