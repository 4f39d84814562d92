//! Signs and verifies operation authorizations: one method pair per
//! operation in [`crate::operation`], built on top of the token and
//! replay-store layers.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::config::HmacAuthConfig;
use crate::error::AuthError;
use crate::operation;
use crate::replay::{MarkOutcome, ReplayStore};
use crate::secret::SharedSecret;
use crate::token::{format_token, get_token, make_nonce, TokenInfo};

type HmacSha512 = Hmac<Sha512>;

/// The outcome of checking whether a caller is authorized to perform
/// an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The token was valid, fresh, and not a replay.
    Ok,
    /// No authorization header was supplied.
    Unauthorized,
    /// A header was supplied but failed to verify: malformed, expired,
    /// signed with the wrong key, or a replay.
    Forbidden,
    /// The replay store could not be consulted.
    Unavailable(String),
}

/// Signs outgoing requests and verifies incoming ones against a shared
/// secret, subject to [`HmacAuthConfig`] and backed by a
/// [`ReplayStore`].
pub struct HmacAuth {
    secret: SharedSecret,
    config: HmacAuthConfig,
    replay: ReplayStore,
}

impl HmacAuth {
    /// Builds an authorizer from its three parts.
    pub fn new(secret: SharedSecret, config: HmacAuthConfig, replay: ReplayStore) -> Self {
        Self { secret, config, replay }
    }

    /// The configuration this authorizer was built with.
    pub fn config(&self) -> &HmacAuthConfig {
        &self.config
    }

    /// Starts the replay store's background work, if any.
    pub async fn setup(&self) -> Result<(), crate::error::ReplayError> {
        self.replay.setup().await
    }

    /// Stops the replay store's background work, if any.
    pub async fn teardown(&self) -> Result<(), crate::error::ReplayError> {
        self.replay.teardown().await
    }

    fn compute_hmac(&self, message: &[u8]) -> Result<[u8; 64], AuthError> {
        let mut mac =
            <HmacSha512 as Mac>::new_from_slice(self.secret.as_bytes()).map_err(|_| AuthError::InvalidSecret)?;
        mac.update(message);
        let digest = mac.finalize().into_bytes();
        let mut out = [0u8; 64];
        out.copy_from_slice(&digest);
        Ok(out)
    }

    fn verify_hmac(&self, message: &[u8], candidate: &[u8; 64]) -> Result<bool, AuthError> {
        let mut mac =
            <HmacSha512 as Mac>::new_from_slice(self.secret.as_bytes()).map_err(|_| AuthError::InvalidSecret)?;
        mac.update(message);
        Ok(mac.verify_slice(candidate).is_ok())
    }

    fn sign(&self, now: i64, to_sign_for: impl FnOnce(i64, &str) -> Vec<u8>) -> Result<String, AuthError> {
        let nonce = make_nonce(self.config.nonce_entropy_bytes);
        let to_sign = to_sign_for(now, &nonce);
        let digest = self.compute_hmac(&to_sign)?;
        Ok(format_token(now, &nonce, &digest))
    }

    async fn verify(&self, authorization: Option<&str>, now: i64, to_sign_for: impl FnOnce(i64, &str) -> Vec<u8>) -> Decision {
        match get_token(authorization, now, self.config.token_lifetime_secs) {
            TokenInfo::Unauthorized => Decision::Unauthorized,
            TokenInfo::Forbidden => Decision::Forbidden,
            TokenInfo::Found { timestamp, nonce, hmac } => {
                let to_sign = to_sign_for(timestamp, &nonce);
                match self.verify_hmac(&to_sign, &hmac) {
                    Ok(true) => match self.replay.mark_code_used(&hmac).await {
                        Ok(MarkOutcome::Ok) => Decision::Ok,
                        Ok(MarkOutcome::Conflict) => Decision::Forbidden,
                        Err(err) => Decision::Unavailable(err.to_string()),
                    },
                    Ok(false) => Decision::Forbidden,
                    Err(_) => Decision::Unavailable("invalid shared secret".to_string()),
                }
            }
        }
    }

    /// Signs a `SUBSCRIBE_EXACT` request.
    pub fn authorize_subscribe_exact(
        &self,
        now: i64,
        url: &str,
        recovery: Option<&str>,
        exact: &[u8],
    ) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::subscribe_exact(ts, nonce, url, recovery, exact))
    }

    /// Verifies a `SUBSCRIBE_EXACT` request.
    pub async fn is_subscribe_exact_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        url: &str,
        recovery: Option<&str>,
        exact: &[u8],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| {
            operation::subscribe_exact(ts, nonce, url, recovery, exact)
        })
        .await
    }

    /// Signs a `SUBSCRIBE_GLOB` request.
    pub fn authorize_subscribe_glob(
        &self,
        now: i64,
        url: &str,
        recovery: Option<&str>,
        glob: &str,
    ) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::subscribe_glob(ts, nonce, url, recovery, glob))
    }

    /// Verifies a `SUBSCRIBE_GLOB` request.
    pub async fn is_subscribe_glob_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        url: &str,
        recovery: Option<&str>,
        glob: &str,
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| {
            operation::subscribe_glob(ts, nonce, url, recovery, glob)
        })
        .await
    }

    /// Signs a `NOTIFY` request.
    pub fn authorize_notify(&self, now: i64, topic: &[u8], message_sha512: &[u8; 64]) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::notify(ts, nonce, topic, message_sha512))
    }

    /// Verifies a `NOTIFY` request.
    pub async fn is_notify_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        topic: &[u8],
        message_sha512: &[u8; 64],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| operation::notify(ts, nonce, topic, message_sha512))
            .await
    }

    /// Signs a `WEBSOCKET_CONFIGURE` request.
    #[allow(clippy::too_many_arguments)]
    pub fn authorize_websocket_configure(
        &self,
        now: i64,
        subscriber_nonce: &[u8; 32],
        enable_zstd: bool,
        enable_training: bool,
        initial_dict: u16,
    ) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| {
            operation::websocket_configure(ts, nonce, subscriber_nonce, enable_zstd, enable_training, initial_dict)
        })
    }

    /// Verifies a `WEBSOCKET_CONFIGURE` request.
    #[allow(clippy::too_many_arguments)]
    pub async fn is_websocket_configure_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        subscriber_nonce: &[u8; 32],
        enable_zstd: bool,
        enable_training: bool,
        initial_dict: u16,
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| {
            operation::websocket_configure(ts, nonce, subscriber_nonce, enable_zstd, enable_training, initial_dict)
        })
        .await
    }

    /// Signs a `CHECK_SUBSCRIPTIONS` request.
    pub fn authorize_check_subscriptions(&self, now: i64, url: &str) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::check_subscriptions(ts, nonce, url))
    }

    /// Verifies a `CHECK_SUBSCRIPTIONS` request.
    pub async fn is_check_subscriptions_allowed(&self, authorization: Option<&str>, now: i64, url: &str) -> Decision {
        self.verify(authorization, now, |ts, nonce| operation::check_subscriptions(ts, nonce, url))
            .await
    }

    /// Signs a `SET_SUBSCRIPTIONS` request.
    pub fn authorize_set_subscriptions(
        &self,
        now: i64,
        url: &str,
        etag_format: u8,
        etag: &[u8],
    ) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::set_subscriptions(ts, nonce, url, etag_format, etag))
    }

    /// Verifies a `SET_SUBSCRIPTIONS` request.
    pub async fn is_set_subscriptions_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        url: &str,
        etag_format: u8,
        etag: &[u8],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| {
            operation::set_subscriptions(ts, nonce, url, etag_format, etag)
        })
        .await
    }

    /// Signs a `RECEIVE` request.
    pub fn authorize_receive(&self, now: i64, url: &str, topic: &[u8], sha512: &[u8; 64]) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::receive(ts, nonce, url, topic, sha512))
    }

    /// Verifies a `RECEIVE` request.
    pub async fn is_receive_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        url: &str,
        topic: &[u8],
        sha512: &[u8; 64],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| operation::receive(ts, nonce, url, topic, sha512))
            .await
    }

    /// Signs a `MISSED` request.
    pub fn authorize_missed(&self, now: i64, recovery: &str, topic: &[u8]) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::missed(ts, nonce, recovery, topic))
    }

    /// Verifies a `MISSED` request.
    pub async fn is_missed_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        recovery: &str,
        topic: &[u8],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| operation::missed(ts, nonce, recovery, topic))
            .await
    }

    /// Signs a `WEBSOCKET_CONFIRM_CONFIGURE` request.
    pub fn authorize_websocket_confirm_configure(
        &self,
        now: i64,
        broadcaster_nonce: &[u8; 32],
    ) -> Result<String, AuthError> {
        self.sign(now, |ts, nonce| operation::websocket_confirm_configure(ts, nonce, broadcaster_nonce))
    }

    /// Verifies a `WEBSOCKET_CONFIRM_CONFIGURE` request.
    pub async fn is_websocket_confirm_configure_allowed(
        &self,
        authorization: Option<&str>,
        now: i64,
        broadcaster_nonce: &[u8; 32],
    ) -> Decision {
        self.verify(authorization, now, |ts, nonce| {
            operation::websocket_confirm_configure(ts, nonce, broadcaster_nonce)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> HmacAuth {
        HmacAuth::new(SharedSecret::from_bytes([0x5a; 64]), HmacAuthConfig::default(), ReplayStore::None)
    }

    #[tokio::test]
    async fn round_trip_is_ok() {
        let auth = auth();
        let token = auth.authorize_subscribe_exact(1000, "https://example.com", None, b"topic").unwrap();
        let decision = auth
            .is_subscribe_exact_allowed(Some(&token), 1000, "https://example.com", None, b"topic")
            .await;
        assert_eq!(decision, Decision::Ok);
    }

    #[tokio::test]
    async fn tampered_parameter_is_forbidden() {
        let auth = auth();
        let token = auth.authorize_notify(1000, b"topic-a", &[0u8; 64]).unwrap();
        let decision = auth.is_notify_allowed(Some(&token), 1000, b"topic-b", &[0u8; 64]).await;
        assert_eq!(decision, Decision::Forbidden);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let auth = auth();
        let decision = auth.is_check_subscriptions_allowed(None, 1000, "https://example.com").await;
        assert_eq!(decision, Decision::Unauthorized);
    }

    #[tokio::test]
    async fn replayed_token_is_forbidden_on_second_use() {
        let auth = HmacAuth::new(
            SharedSecret::from_bytes([0x11; 64]),
            HmacAuthConfig::default(),
            ReplayStore::Reentrant(std::sync::Arc::new(crate::replay::ReentrantReplayStore::new(ReplayStore::Persistent(
                std::sync::Arc::new(crate::replay::PersistentReplayStore::open(":memory:", 60, 5).unwrap()),
            )))),
        );
        let token = auth.authorize_missed(500, "https://example.com/recover", b"topic").unwrap();
        let first = auth.is_missed_allowed(Some(&token), 500, "https://example.com/recover", b"topic").await;
        let second = auth.is_missed_allowed(Some(&token), 500, "https://example.com/recover", b"topic").await;
        assert_eq!(first, Decision::Ok);
        assert_eq!(second, Decision::Forbidden);
    }
}
