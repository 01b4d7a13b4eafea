//! HCI-over-UART (H4) framing constants.

pub const PACKET_TYPE_COMMAND: u8 = 0x01;
pub const PACKET_TYPE_ACL: u8 = 0x02;
pub const PACKET_TYPE_SCO: u8 = 0x03;
pub const PACKET_TYPE_EVENT: u8 = 0x04;
pub const PACKET_TYPE_ISO: u8 = 0x05;

/// Command sub-header: 2-byte LE opcode + 1-byte parameter total length.
pub const COMMAND_HEADER_LEN: usize = 3;
/// Event sub-header: 1-byte event code + 1-byte parameter total length.
pub const EVENT_HEADER_LEN: usize = 2;

/// OGF reserved for vendor-specific commands.
pub const VENDOR_OGF: u8 = 0x3F;
/// Event code reserved for vendor-specific events.
pub const VENDOR_EVENT_CODE: u8 = 0xFF;
/// Event code multiplexing LE subevents.
pub const LE_META_EVENT_CODE: u8 = 0x3E;
