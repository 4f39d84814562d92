//! Token extraction (`"X-HMAC <ts>:<nonce>:<b64hmac>"`) and nonce
//! generation.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use rand::RngCore;

const PREFIX: &str = "X-HMAC ";

/// The outcome of extracting and time-bounding an authorization header,
/// before any signature is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInfo {
    /// No authorization header was supplied.
    Unauthorized,
    /// The header was present but malformed, expired, or too far in the
    /// future to accept.
    Forbidden,
    /// A well-formed, time-acceptable token.
    Found {
        /// The signed timestamp carried in the token.
        timestamp: i64,
        /// The nonce carried in the token.
        nonce: String,
        /// The claimed HMAC-SHA-512 digest, exactly 64 bytes.
        hmac: [u8; 64],
    },
}

/// Parses and time-bounds `authorization`. Verification of the digest
/// itself happens one layer up, in [`crate::sign::HmacAuth`], because it
/// needs the caller's operation parameters to reconstruct the canonical
/// to-sign buffer.
pub fn get_token(authorization: Option<&str>, now: i64, token_lifetime: i64) -> TokenInfo {
    let Some(authorization) = authorization else {
        return TokenInfo::Unauthorized;
    };
    let Some(rest) = authorization.strip_prefix(PREFIX) else {
        return TokenInfo::Forbidden;
    };
    let mut parts = rest.splitn(3, ':');
    let (Some(timestamp_str), Some(nonce), Some(hmac_b64)) = (parts.next(), parts.next(), parts.next())
    else {
        return TokenInfo::Forbidden;
    };
    let Ok(timestamp) = timestamp_str.parse::<i64>() else {
        return TokenInfo::Forbidden;
    };
    if (now - timestamp).unsigned_abs() > token_lifetime.unsigned_abs() {
        return TokenInfo::Forbidden;
    }
    let Ok(digest) = STANDARD.decode(hmac_b64) else {
        return TokenInfo::Forbidden;
    };
    let Ok(hmac) = <[u8; 64]>::try_from(digest) else {
        return TokenInfo::Forbidden;
    };
    TokenInfo::Found {
        timestamp,
        nonce: nonce.to_string(),
        hmac,
    }
}

/// Formats a signed token from its parts.
pub fn format_token(timestamp: i64, nonce: &str, digest: &[u8; 64]) -> String {
    format!("{PREFIX}{timestamp}:{nonce}:{}", STANDARD.encode(digest))
}

/// Generates a fresh nonce: `entropy_bytes` bytes of cryptographic
/// randomness, url-safe base64 encoded.
pub fn make_nonce(entropy_bytes: usize) -> String {
    let mut bytes = vec![0u8; entropy_bytes];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_is_unauthorized() {
        assert_eq!(get_token(None, 0, 60), TokenInfo::Unauthorized);
    }

    #[test]
    fn wrong_prefix_is_forbidden() {
        assert_eq!(get_token(Some("Bearer abc"), 0, 60), TokenInfo::Forbidden);
    }

    #[test]
    fn short_digest_is_forbidden() {
        assert_eq!(get_token(Some("X-HMAC 0:n:AA=="), 0, 60), TokenInfo::Forbidden);
    }

    #[test]
    fn expired_timestamp_is_forbidden() {
        assert_eq!(get_token(Some("X-HMAC 0:n:AA=="), 1000, 60), TokenInfo::Forbidden);
    }

    #[test]
    fn well_formed_token_is_found() {
        let digest = [0x09u8; 64];
        let token = format_token(42, "abc123", &digest);
        match get_token(Some(&token), 42, 60) {
            TokenInfo::Found { timestamp, nonce, hmac } => {
                assert_eq!(timestamp, 42);
                assert_eq!(nonce, "abc123");
                assert_eq!(hmac, digest);
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn nonce_has_no_padding_and_is_url_safe() {
        let nonce = make_nonce(4);
        assert!(nonce.len() >= 6);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn nonce_length_follows_entropy_bytes() {
        let nonce = make_nonce(8);
        assert_eq!(nonce.len(), URL_SAFE_NO_PAD.encode([0u8; 8]).len());
    }
}
