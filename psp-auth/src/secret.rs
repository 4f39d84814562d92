//! The 64-byte shared secret, carried at the external boundary as
//! url-safe base64.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::AuthError;

/// A 64-byte HMAC-SHA-512 key shared between subscriber and broadcaster.
#[derive(Clone)]
pub struct SharedSecret([u8; 64]);

impl SharedSecret {
    /// Wraps 64 raw bytes directly.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Decodes a url-safe base64 secret. Padding is optional: trailing
    /// `=` characters are stripped before decoding, so both padded and
    /// unpadded encodings of the same 64 bytes are accepted.
    pub fn from_base64(encoded: &str) -> Result<Self, AuthError> {
        let trimmed = encoded.trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|_| AuthError::InvalidSecret)?;
        let array: [u8; 64] = bytes.try_into().map_err(|_| AuthError::InvalidSecret)?;
        Ok(Self(array))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_base64() {
        let bytes = [0x42u8; 64];
        let encoded = URL_SAFE_NO_PAD.encode(bytes);
        let secret = SharedSecret::from_base64(&encoded).unwrap();
        assert_eq!(secret.as_bytes(), &bytes);
    }

    #[test]
    fn accepts_padded_input_too() {
        let bytes = [0x01u8; 64];
        let mut encoded = URL_SAFE_NO_PAD.encode(bytes);
        encoded.push_str("==");
        let secret = SharedSecret::from_base64(&encoded).unwrap();
        assert_eq!(secret.as_bytes(), &bytes);
    }

    #[test]
    fn rejects_wrong_length() {
        let encoded = URL_SAFE_NO_PAD.encode([0u8; 32]);
        assert!(SharedSecret::from_base64(&encoded).is_err());
    }
}
