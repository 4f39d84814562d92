//! Construction-time configuration for [`crate::sign::HmacAuth`]. Loading
//! these values from a file or environment is a transport/deployment
//! concern and stays out of this crate.

use serde::{Deserialize, Serialize};

fn default_token_lifetime_secs() -> i64 {
    60
}

fn default_cleanup_batch_delay_secs() -> i64 {
    1
}

fn default_nonce_entropy_bytes() -> usize {
    4
}

/// Tunable parameters of the HMAC authorization layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmacAuthConfig {
    /// How many seconds a token remains acceptable on either side of
    /// `now`, and how long a replay-store entry lives once inserted.
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,

    /// Extra delay the persistent store's background reaper adds on top
    /// of `token_lifetime_secs` when deciding how long to sleep between
    /// expiry sweeps. Defaults to 1 second.
    #[serde(default = "default_cleanup_batch_delay_secs")]
    pub cleanup_batch_delay_secs: i64,

    /// Bytes of randomness used to generate a nonce.
    #[serde(default = "default_nonce_entropy_bytes")]
    pub nonce_entropy_bytes: usize,
}

impl Default for HmacAuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: default_token_lifetime_secs(),
            cleanup_batch_delay_secs: default_cleanup_batch_delay_secs(),
            nonce_entropy_bytes: default_nonce_entropy_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HmacAuthConfig::default();
        assert_eq!(config.token_lifetime_secs, 60);
        assert_eq!(config.cleanup_batch_delay_secs, 1);
        assert_eq!(config.nonce_entropy_bytes, 4);
    }
}
