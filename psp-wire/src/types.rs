//! Message type codes, dense within each direction. Code `0` is reserved
//! and unused in both directions, matching the original protocol's
//! `IntFlag`-style numbering where real members start at `1`.

/// Subscriber-to-broadcaster message type codes.
pub mod s2b {
    /// `CONFIGURE`
    pub const CONFIGURE: u16 = 1;
    /// `SUBSCRIBE_EXACT`
    pub const SUBSCRIBE_EXACT: u16 = 2;
    /// `SUBSCRIBE_GLOB`
    pub const SUBSCRIBE_GLOB: u16 = 3;
    /// `UNSUBSCRIBE_EXACT`
    pub const UNSUBSCRIBE_EXACT: u16 = 4;
    /// `UNSUBSCRIBE_GLOB`
    pub const UNSUBSCRIBE_GLOB: u16 = 5;
    /// `NOTIFY`
    pub const NOTIFY: u16 = 6;
    /// `NOTIFY_STREAM`
    pub const NOTIFY_STREAM: u16 = 7;
    /// `CONFIRM_RECEIVE`
    pub const CONFIRM_RECEIVE: u16 = 8;
    /// `CONTINUE_RECEIVE`
    pub const CONTINUE_RECEIVE: u16 = 9;
}

/// Broadcaster-to-subscriber message type codes.
pub mod b2s {
    /// `CONFIRM_CONFIGURE`
    pub const CONFIRM_CONFIGURE: u16 = 1;
    /// `CONFIRM_SUBSCRIBE_EXACT`
    pub const CONFIRM_SUBSCRIBE_EXACT: u16 = 2;
    /// `CONFIRM_SUBSCRIBE_GLOB`
    pub const CONFIRM_SUBSCRIBE_GLOB: u16 = 3;
    /// `CONFIRM_UNSUBSCRIBE_EXACT`
    pub const CONFIRM_UNSUBSCRIBE_EXACT: u16 = 4;
    /// `CONFIRM_UNSUBSCRIBE_GLOB`
    pub const CONFIRM_UNSUBSCRIBE_GLOB: u16 = 5;
    /// `CONFIRM_NOTIFY`
    pub const CONFIRM_NOTIFY: u16 = 6;
    /// `CONTINUE_NOTIFY`
    pub const CONTINUE_NOTIFY: u16 = 7;
    /// `ENABLE_ZSTD_PRESET`
    pub const ENABLE_ZSTD_PRESET: u16 = 8;
    /// `ENABLE_ZSTD_CUSTOM`
    pub const ENABLE_ZSTD_CUSTOM: u16 = 9;
    /// `RECEIVE_STREAM`
    pub const RECEIVE_STREAM: u16 = 10;
}
