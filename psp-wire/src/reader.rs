//! A cursor over a borrowed byte slice, the input side of the codec.
//!
//! Mirrors a synchronous readable-bytes source: every read either returns
//! exactly the requested number of bytes or fails with
//! [`WireError::Truncated`]. [`Reader::read_remaining`] additionally lets a
//! message take ownership of everything left in the frame, which the
//! custom-dictionary and stream-payload fields need.

use crate::error::WireError;

/// Cursor over a borrowed byte slice.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wraps `buf` for sequential reading starting at offset zero.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads exactly `n` bytes, or fails with [`WireError::Truncated`].
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining_len() < n {
            return Err(WireError::Truncated);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a 2-byte big-endian unsigned integer.
    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a 2-byte big-endian signed integer.
    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        let b = self.read_bytes(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    /// Consumes and returns every byte not yet read.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }
}
