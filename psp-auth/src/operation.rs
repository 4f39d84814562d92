//! Canonical to-sign byte encoding, one builder per authorized operation.
//!
//! Every buffer opens with the same three fields — a 1-byte operation
//! tag, an 8-byte signed timestamp, and a length-prefixed nonce — before
//! the operation's own fields. The tag is what keeps two operations'
//! encodings from ever colliding: a caller can sign `SUBSCRIBE_EXACT`
//! parameters and never produce bytes a `NOTIFY` verifier would accept,
//! no matter how the remaining fields line up.

/// The fixed 1-byte domain separator prefixed to every canonical to-sign
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationTag {
    /// Subscribing to an exact topic.
    SubscribeExact = 1,
    /// Subscribing to a glob pattern.
    SubscribeGlob = 2,
    /// Publishing a notification.
    Notify = 3,
    /// Opening a stateful session (`CONFIGURE`).
    WebsocketConfigure = 4,
    /// Checking the current subscription set.
    CheckSubscriptions = 5,
    /// Replacing the current subscription set.
    SetSubscriptions = 6,
    /// Accepting delivery of a notification (`RECEIVE_STREAM` family).
    Receive = 7,
    /// Reporting a gap in delivered notifications.
    Missed = 8,
    /// Acknowledging a stateful session (`CONFIRM_CONFIGURE`).
    WebsocketConfirmConfigure = 9,
}

fn u16_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn u8_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

fn prefix(tag: OperationTag, timestamp: i64, nonce: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(tag as u8);
    out.extend_from_slice(&timestamp.to_be_bytes());
    u8_len_prefixed(&mut out, nonce.as_bytes());
    out
}

/// Canonical encoding for `SUBSCRIBE_EXACT`.
pub fn subscribe_exact(
    timestamp: i64,
    nonce: &str,
    url: &str,
    recovery: Option<&str>,
    exact: &[u8],
) -> Vec<u8> {
    let mut out = prefix(OperationTag::SubscribeExact, timestamp, nonce);
    u16_len_prefixed(&mut out, url.as_bytes());
    u16_len_prefixed(&mut out, recovery.unwrap_or("").as_bytes());
    u16_len_prefixed(&mut out, exact);
    out
}

/// Canonical encoding for `SUBSCRIBE_GLOB`.
pub fn subscribe_glob(timestamp: i64, nonce: &str, url: &str, recovery: Option<&str>, glob: &str) -> Vec<u8> {
    let mut out = prefix(OperationTag::SubscribeGlob, timestamp, nonce);
    u16_len_prefixed(&mut out, url.as_bytes());
    u16_len_prefixed(&mut out, recovery.unwrap_or("").as_bytes());
    u16_len_prefixed(&mut out, glob.as_bytes());
    out
}

/// Canonical encoding for `NOTIFY`.
pub fn notify(timestamp: i64, nonce: &str, topic: &[u8], message_sha512: &[u8; 64]) -> Vec<u8> {
    let mut out = prefix(OperationTag::Notify, timestamp, nonce);
    u16_len_prefixed(&mut out, topic);
    out.extend_from_slice(message_sha512);
    out
}

/// Canonical encoding for `WEBSOCKET_CONFIGURE`.
pub fn websocket_configure(
    timestamp: i64,
    nonce: &str,
    subscriber_nonce: &[u8; 32],
    enable_zstd: bool,
    enable_training: bool,
    initial_dict: u16,
) -> Vec<u8> {
    let mut out = prefix(OperationTag::WebsocketConfigure, timestamp, nonce);
    u8_len_prefixed(&mut out, subscriber_nonce);
    out.push(enable_zstd as u8);
    out.push(enable_training as u8);
    out.extend_from_slice(&initial_dict.to_be_bytes());
    out
}

/// Canonical encoding for `CHECK_SUBSCRIPTIONS`.
pub fn check_subscriptions(timestamp: i64, nonce: &str, url: &str) -> Vec<u8> {
    let mut out = prefix(OperationTag::CheckSubscriptions, timestamp, nonce);
    u16_len_prefixed(&mut out, url.as_bytes());
    out
}

/// Canonical encoding for `SET_SUBSCRIPTIONS`. `etag_format` selects how
/// `etag` is interpreted by the caller; its width is fixed by that format
/// rather than carried as a separate length prefix.
pub fn set_subscriptions(timestamp: i64, nonce: &str, url: &str, etag_format: u8, etag: &[u8]) -> Vec<u8> {
    let mut out = prefix(OperationTag::SetSubscriptions, timestamp, nonce);
    u16_len_prefixed(&mut out, url.as_bytes());
    out.push(etag_format);
    out.extend_from_slice(etag);
    out
}

/// Canonical encoding for `RECEIVE`.
pub fn receive(timestamp: i64, nonce: &str, url: &str, topic: &[u8], sha512: &[u8; 64]) -> Vec<u8> {
    let mut out = prefix(OperationTag::Receive, timestamp, nonce);
    u16_len_prefixed(&mut out, url.as_bytes());
    u16_len_prefixed(&mut out, topic);
    out.extend_from_slice(sha512);
    out
}

/// Canonical encoding for `MISSED`.
pub fn missed(timestamp: i64, nonce: &str, recovery: &str, topic: &[u8]) -> Vec<u8> {
    let mut out = prefix(OperationTag::Missed, timestamp, nonce);
    u16_len_prefixed(&mut out, recovery.as_bytes());
    u16_len_prefixed(&mut out, topic);
    out
}

/// Canonical encoding for `WEBSOCKET_CONFIRM_CONFIGURE`.
pub fn websocket_confirm_configure(timestamp: i64, nonce: &str, broadcaster_nonce: &[u8; 32]) -> Vec<u8> {
    let mut out = prefix(OperationTag::WebsocketConfirmConfigure, timestamp, nonce);
    u8_len_prefixed(&mut out, broadcaster_nonce);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_exact_matches_literal_scenario() {
        let to_sign = subscribe_exact(0, "n", "u", None, b"t");
        let expected = [
            0x01, // tag
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // timestamp
            0x01, 0x6e, // nonce len + "n"
            0x00, 0x01, 0x75, // url len + "u"
            0x00, 0x00, // recovery len (absent)
            0x00, 0x01, 0x74, // exact len + "t"
        ];
        assert_eq!(to_sign, expected);
    }

    #[test]
    fn operation_tags_are_pairwise_distinct_prefixes() {
        let buffers = vec![
            subscribe_exact(0, "n", "u", None, b"t"),
            subscribe_glob(0, "n", "u", None, "g"),
            notify(0, "n", b"t", &[0u8; 64]),
            websocket_configure(0, "n", &[0u8; 32], true, false, 0),
            check_subscriptions(0, "n", "u"),
            set_subscriptions(0, "n", "u", 0, &[]),
            receive(0, "n", "u", b"t", &[0u8; 64]),
            missed(0, "n", "r", b"t"),
            websocket_confirm_configure(0, "n", &[0u8; 32]),
        ];
        for (i, a) in buffers.iter().enumerate() {
            for (j, b) in buffers.iter().enumerate() {
                if i != j {
                    assert_ne!(a[0], b[0], "operations {i} and {j} share a tag");
                }
            }
        }
    }
}
