//! Typed payloads for all 19 message kinds, grouped by shape, plus the
//! two direction-level discriminated unions dispatch hands back to the
//! caller.

mod confirm_notify;
mod confirm_receive;
mod configure;
mod continue_;
mod enable_zstd;
mod notify;
mod notify_stream;
mod receive_stream;
mod subscribe;

pub use confirm_notify::ConfirmNotify;
pub use confirm_receive::ConfirmReceive;
pub use configure::{Configure, ConfirmConfigure};
pub use continue_::Continue;
pub use enable_zstd::{EnableZstdCustom, EnableZstdPreset, ZstdParams};
pub use notify::{Notify, NotifyBody};
pub use notify_stream::NotifyStream;
pub use receive_stream::ReceiveStream;
pub use subscribe::{Exact, Glob};

use crate::types::{b2s, s2b};

/// Appends one `(name, value)` pair to an already-serialized expanded
/// header section, bumping the leading count in place. Used by messages
/// whose trailing headers are only present for some variants, where the
/// fixed-header count written up front does not yet account for them.
pub(crate) fn append_expanded_header(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    const COUNT_OFFSET: usize = 4;
    let count = u16::from_be_bytes([out[COUNT_OFFSET], out[COUNT_OFFSET + 1]]);
    out[COUNT_OFFSET..COUNT_OFFSET + 2].copy_from_slice(&(count + 1).to_be_bytes());
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
}

/// A subscriber-to-broadcaster message, discriminated by its wire type
/// code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S2BMessage {
    /// `CONFIGURE`
    Configure(Configure),
    /// `SUBSCRIBE_EXACT`
    SubscribeExact(Exact),
    /// `SUBSCRIBE_GLOB`
    SubscribeGlob(Glob),
    /// `UNSUBSCRIBE_EXACT`
    UnsubscribeExact(Exact),
    /// `UNSUBSCRIBE_GLOB`
    UnsubscribeGlob(Glob),
    /// `NOTIFY`
    Notify(Notify),
    /// `NOTIFY_STREAM`
    NotifyStream(NotifyStream),
    /// `CONFIRM_RECEIVE`
    ConfirmReceive(ConfirmReceive),
    /// `CONTINUE_RECEIVE`
    ContinueReceive(Continue),
}

impl S2BMessage {
    /// This message's wire type code.
    pub fn type_code(&self) -> u16 {
        match self {
            Self::Configure(_) => s2b::CONFIGURE,
            Self::SubscribeExact(_) => s2b::SUBSCRIBE_EXACT,
            Self::SubscribeGlob(_) => s2b::SUBSCRIBE_GLOB,
            Self::UnsubscribeExact(_) => s2b::UNSUBSCRIBE_EXACT,
            Self::UnsubscribeGlob(_) => s2b::UNSUBSCRIBE_GLOB,
            Self::Notify(_) => s2b::NOTIFY,
            Self::NotifyStream(_) => s2b::NOTIFY_STREAM,
            Self::ConfirmReceive(_) => s2b::CONFIRM_RECEIVE,
            Self::ContinueReceive(_) => s2b::CONTINUE_RECEIVE,
        }
    }

    /// Serializes this message, flags and all.
    pub fn serialize(&self, minimal_headers: bool) -> Vec<u8> {
        match self {
            Self::Configure(m) => m.try_build(minimal_headers),
            Self::SubscribeExact(m) => m.try_build(s2b::SUBSCRIBE_EXACT, minimal_headers),
            Self::SubscribeGlob(m) => m.try_build(s2b::SUBSCRIBE_GLOB, minimal_headers),
            Self::UnsubscribeExact(m) => m.try_build(s2b::UNSUBSCRIBE_EXACT, minimal_headers),
            Self::UnsubscribeGlob(m) => m.try_build(s2b::UNSUBSCRIBE_GLOB, minimal_headers),
            Self::Notify(m) => m.try_build(minimal_headers),
            Self::NotifyStream(m) => m.try_build(minimal_headers),
            Self::ConfirmReceive(m) => m.try_build(minimal_headers),
            Self::ContinueReceive(m) => m.try_build(s2b::CONTINUE_RECEIVE, minimal_headers),
        }
    }
}

/// A broadcaster-to-subscriber message, discriminated by its wire type
/// code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum B2SMessage {
    /// `CONFIRM_CONFIGURE`
    ConfirmConfigure(ConfirmConfigure),
    /// `CONFIRM_SUBSCRIBE_EXACT`
    ConfirmSubscribeExact(Exact),
    /// `CONFIRM_SUBSCRIBE_GLOB`
    ConfirmSubscribeGlob(Glob),
    /// `CONFIRM_UNSUBSCRIBE_EXACT`
    ConfirmUnsubscribeExact(Exact),
    /// `CONFIRM_UNSUBSCRIBE_GLOB`
    ConfirmUnsubscribeGlob(Glob),
    /// `CONFIRM_NOTIFY`
    ConfirmNotify(ConfirmNotify),
    /// `CONTINUE_NOTIFY`
    ContinueNotify(Continue),
    /// `ENABLE_ZSTD_PRESET`
    EnableZstdPreset(EnableZstdPreset),
    /// `ENABLE_ZSTD_CUSTOM`
    EnableZstdCustom(EnableZstdCustom),
    /// `RECEIVE_STREAM`
    ReceiveStream(ReceiveStream),
}

impl B2SMessage {
    /// This message's wire type code.
    pub fn type_code(&self) -> u16 {
        match self {
            Self::ConfirmConfigure(_) => b2s::CONFIRM_CONFIGURE,
            Self::ConfirmSubscribeExact(_) => b2s::CONFIRM_SUBSCRIBE_EXACT,
            Self::ConfirmSubscribeGlob(_) => b2s::CONFIRM_SUBSCRIBE_GLOB,
            Self::ConfirmUnsubscribeExact(_) => b2s::CONFIRM_UNSUBSCRIBE_EXACT,
            Self::ConfirmUnsubscribeGlob(_) => b2s::CONFIRM_UNSUBSCRIBE_GLOB,
            Self::ConfirmNotify(_) => b2s::CONFIRM_NOTIFY,
            Self::ContinueNotify(_) => b2s::CONTINUE_NOTIFY,
            Self::EnableZstdPreset(_) => b2s::ENABLE_ZSTD_PRESET,
            Self::EnableZstdCustom(_) => b2s::ENABLE_ZSTD_CUSTOM,
            Self::ReceiveStream(_) => b2s::RECEIVE_STREAM,
        }
    }

    /// Serializes this message, flags and all.
    pub fn serialize(&self, minimal_headers: bool) -> Vec<u8> {
        match self {
            Self::ConfirmConfigure(m) => m.try_build(minimal_headers),
            Self::ConfirmSubscribeExact(m) => m.try_build(b2s::CONFIRM_SUBSCRIBE_EXACT, minimal_headers),
            Self::ConfirmSubscribeGlob(m) => m.try_build(b2s::CONFIRM_SUBSCRIBE_GLOB, minimal_headers),
            Self::ConfirmUnsubscribeExact(m) => {
                m.try_build(b2s::CONFIRM_UNSUBSCRIBE_EXACT, minimal_headers)
            }
            Self::ConfirmUnsubscribeGlob(m) => {
                m.try_build(b2s::CONFIRM_UNSUBSCRIBE_GLOB, minimal_headers)
            }
            Self::ConfirmNotify(m) => m.try_build(minimal_headers),
            Self::ContinueNotify(m) => m.try_build(b2s::CONTINUE_NOTIFY, minimal_headers),
            Self::EnableZstdPreset(m) => m.try_build(minimal_headers),
            Self::EnableZstdCustom(m) => m.try_build(minimal_headers),
            Self::ReceiveStream(m) => m.try_build(minimal_headers),
        }
    }
}
