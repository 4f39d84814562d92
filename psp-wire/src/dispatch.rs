//! Direction-specific dense lookup tables indexed by message type code.
//!
//! Each table is built once, from the full list of `(type code, parser)`
//! registrations for its direction, validated for the density invariant
//! (the largest registered code must be less than twice the number of
//! registrations) and for duplicate-free registration. Both are
//! programmer errors if violated, since the registration list is fixed at
//! compile time.

use std::sync::OnceLock;

use log::warn;

use crate::error::WireError;
use crate::flags::MessageFlags;
use crate::message::{
    B2SMessage, Configure, ConfirmConfigure, ConfirmNotify, ConfirmReceive, Continue,
    EnableZstdCustom, EnableZstdPreset, Exact, Glob, Notify, NotifyStream, ReceiveStream,
    S2BMessage,
};
use crate::reader::Reader;
use crate::types::{b2s, s2b};

type S2BParser = fn(MessageFlags, &mut Reader) -> Result<S2BMessage, WireError>;
type B2SParser = fn(MessageFlags, &mut Reader) -> Result<B2SMessage, WireError>;

fn build_table<T>(entries: Vec<(u16, T)>) -> Vec<Option<T>> {
    let max = entries.iter().map(|(code, _)| *code).max().unwrap_or(0) as usize;
    assert!(
        max < 2 * entries.len(),
        "dispatch table is too sparse for a dense mapping (max code {max}, {} registrations)",
        entries.len()
    );
    let mut table: Vec<Option<T>> = (0..=max).map(|_| None).collect();
    for (code, parser) in entries {
        let slot = &mut table[code as usize];
        assert!(slot.is_none(), "duplicate dispatch registration for type code {code}");
        *slot = Some(parser);
    }
    table
}

fn s2b_registrations() -> Vec<(u16, S2BParser)> {
    vec![
        (s2b::CONFIGURE, (|f, r| Ok(S2BMessage::Configure(Configure::try_parse(f, r)?))) as S2BParser),
        (s2b::SUBSCRIBE_EXACT, |f, r| Ok(S2BMessage::SubscribeExact(Exact::try_parse(f, r)?))),
        (s2b::SUBSCRIBE_GLOB, |f, r| Ok(S2BMessage::SubscribeGlob(Glob::try_parse(f, r)?))),
        (s2b::UNSUBSCRIBE_EXACT, |f, r| Ok(S2BMessage::UnsubscribeExact(Exact::try_parse(f, r)?))),
        (s2b::UNSUBSCRIBE_GLOB, |f, r| Ok(S2BMessage::UnsubscribeGlob(Glob::try_parse(f, r)?))),
        (s2b::NOTIFY, |f, r| Ok(S2BMessage::Notify(Notify::try_parse(f, r)?))),
        (s2b::NOTIFY_STREAM, |f, r| Ok(S2BMessage::NotifyStream(NotifyStream::try_parse(f, r)?))),
        (s2b::CONFIRM_RECEIVE, |f, r| Ok(S2BMessage::ConfirmReceive(ConfirmReceive::try_parse(f, r)?))),
        (s2b::CONTINUE_RECEIVE, |f, r| Ok(S2BMessage::ContinueReceive(Continue::try_parse(f, r)?))),
    ]
}

fn b2s_registrations() -> Vec<(u16, B2SParser)> {
    vec![
        (
            b2s::CONFIRM_CONFIGURE,
            (|f, r| Ok(B2SMessage::ConfirmConfigure(ConfirmConfigure::try_parse(f, r)?))) as B2SParser,
        ),
        (b2s::CONFIRM_SUBSCRIBE_EXACT, |f, r| {
            Ok(B2SMessage::ConfirmSubscribeExact(Exact::try_parse(f, r)?))
        }),
        (b2s::CONFIRM_SUBSCRIBE_GLOB, |f, r| {
            Ok(B2SMessage::ConfirmSubscribeGlob(Glob::try_parse(f, r)?))
        }),
        (b2s::CONFIRM_UNSUBSCRIBE_EXACT, |f, r| {
            Ok(B2SMessage::ConfirmUnsubscribeExact(Exact::try_parse(f, r)?))
        }),
        (b2s::CONFIRM_UNSUBSCRIBE_GLOB, |f, r| {
            Ok(B2SMessage::ConfirmUnsubscribeGlob(Glob::try_parse(f, r)?))
        }),
        (b2s::CONFIRM_NOTIFY, |f, r| Ok(B2SMessage::ConfirmNotify(ConfirmNotify::try_parse(f, r)?))),
        (b2s::CONTINUE_NOTIFY, |f, r| Ok(B2SMessage::ContinueNotify(Continue::try_parse(f, r)?))),
        (b2s::ENABLE_ZSTD_PRESET, |f, r| {
            Ok(B2SMessage::EnableZstdPreset(EnableZstdPreset::try_parse(f, r)?))
        }),
        (b2s::ENABLE_ZSTD_CUSTOM, |f, r| {
            Ok(B2SMessage::EnableZstdCustom(EnableZstdCustom::try_parse(f, r)?))
        }),
        (b2s::RECEIVE_STREAM, |f, r| Ok(B2SMessage::ReceiveStream(ReceiveStream::try_parse(f, r)?))),
    ]
}

static S2B_TABLE: OnceLock<Vec<Option<S2BParser>>> = OnceLock::new();
static B2S_TABLE: OnceLock<Vec<Option<B2SParser>>> = OnceLock::new();

/// Parses a subscriber-to-broadcaster message. `type_code` out of range or
/// mapped to an empty slot is [`WireError::UnsupportedType`].
pub fn parse_s2b(flags: MessageFlags, type_code: u16, reader: &mut Reader) -> Result<S2BMessage, WireError> {
    let table = S2B_TABLE.get_or_init(|| build_table(s2b_registrations()));
    match table.get(type_code as usize) {
        Some(Some(parser)) => parser(flags, reader),
        _ => {
            warn!("Unknown S2B message type ignored: {type_code:#06x}");
            Err(WireError::UnsupportedType(type_code))
        }
    }
}

/// Parses a broadcaster-to-subscriber message. `type_code` out of range or
/// mapped to an empty slot is [`WireError::UnsupportedType`].
pub fn parse_b2s(flags: MessageFlags, type_code: u16, reader: &mut Reader) -> Result<B2SMessage, WireError> {
    let table = B2S_TABLE.get_or_init(|| build_table(b2s_registrations()));
    match table.get(type_code as usize) {
        Some(Some(parser)) => parser(flags, reader),
        _ => {
            warn!("Unknown B2S message type ignored: {type_code:#06x}");
            Err(WireError::UnsupportedType(type_code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_out_of_range() {
        let mut reader = Reader::new(&[]);
        let err = parse_s2b(MessageFlags::new(true), 9999, &mut reader).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedType(9999)));
    }

    #[test]
    fn dispatches_to_the_right_parser() {
        let msg = Configure {
            subscriber_nonce: [0x07; 32],
            enable_zstd: false,
            enable_training: true,
            initial_dict: 0,
        };
        let bytes = S2BMessage::Configure(msg.clone()).serialize(true);
        let flags = MessageFlags::from_bits(u16::from_be_bytes([bytes[0], bytes[1]]));
        let type_code = u16::from_be_bytes([bytes[2], bytes[3]]);
        let mut reader = Reader::new(&bytes[4..]);
        let parsed = parse_s2b(flags, type_code, &mut reader).unwrap();
        assert_eq!(parsed, S2BMessage::Configure(msg));
    }
}
