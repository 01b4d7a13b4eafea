use std::fmt;

use super::layout;

/// Raw H4 packet indicator byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HciPacketType(u8);

impl HciPacketType {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_known(self) -> bool {
        matches!(
            self.0,
            layout::PACKET_TYPE_COMMAND
                | layout::PACKET_TYPE_ACL
                | layout::PACKET_TYPE_SCO
                | layout::PACKET_TYPE_EVENT
                | layout::PACKET_TYPE_ISO
        )
    }
}

impl fmt::Display for HciPacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// 16-bit HCI command opcode: OGF in bits 15..10, OCF in bits 9..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HciOpcode(u16);

impl HciOpcode {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn ogf(self) -> u8 {
        ((self.0 >> 10) & 0x3F) as u8
    }

    pub fn ocf(self) -> u16 {
        self.0 & 0x03FF
    }

    pub fn is_vendor_specific(self) -> bool {
        self.ogf() == layout::VENDOR_OGF
    }
}

impl fmt::Display for HciOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X} (OGF={}, OCF={})", self.0, self.ogf(), self.ocf())
    }
}

/// 8-bit HCI event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HciEventCode(u8);

impl HciEventCode {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_vendor_specific(self) -> bool {
        self.0 == layout::VENDOR_EVENT_CODE
    }
}

impl fmt::Display for HciEventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Command packet with its declared parameter bytes.
#[derive(Debug, Clone, Copy)]
pub struct HciCommandPacket<'a> {
    pub opcode: HciOpcode,
    pub parameters: &'a [u8],
}

/// Event packet with its declared parameter bytes.
#[derive(Debug, Clone, Copy)]
pub struct HciEventPacket<'a> {
    pub event_code: HciEventCode,
    pub parameters: &'a [u8],
}

/// Packet that failed classification; keeps the raw bytes for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct HciUnknownPacket<'a> {
    pub packet_type: HciPacketType,
    pub data: &'a [u8],
}

/// One classified H4 packet, borrowing from the record payload.
///
/// For `Command` and `Event` the parameter slice length always equals the
/// declared parameter total length; payloads violating that classify as
/// `Unknown` instead.
#[derive(Debug, Clone, Copy)]
pub enum HciPacket<'a> {
    Command(HciCommandPacket<'a>),
    Acl(&'a [u8]),
    Sco(&'a [u8]),
    Event(HciEventPacket<'a>),
    Iso(&'a [u8]),
    Unknown(HciUnknownPacket<'a>),
}

impl HciPacket<'_> {
    pub fn packet_type(&self) -> HciPacketType {
        match self {
            HciPacket::Command(_) => HciPacketType::new(layout::PACKET_TYPE_COMMAND),
            HciPacket::Acl(_) => HciPacketType::new(layout::PACKET_TYPE_ACL),
            HciPacket::Sco(_) => HciPacketType::new(layout::PACKET_TYPE_SCO),
            HciPacket::Event(_) => HciPacketType::new(layout::PACKET_TYPE_EVENT),
            HciPacket::Iso(_) => HciPacketType::new(layout::PACKET_TYPE_ISO),
            HciPacket::Unknown(unknown) => unknown.packet_type,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, HciPacket::Unknown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{HciEventCode, HciOpcode, HciPacketType};

    #[test]
    fn opcode_splits_ogf_and_ocf() {
        for value in 0..=u16::MAX {
            let opcode = HciOpcode::new(value);
            assert_eq!(opcode.ogf(), ((value >> 10) & 0x3F) as u8);
            assert_eq!(opcode.ocf(), value & 0x03FF);
            assert_eq!(opcode.is_vendor_specific(), opcode.ogf() == 0x3F);
        }
    }

    #[test]
    fn opcode_display_shows_fields() {
        let opcode = HciOpcode::new(0x0C03);
        assert_eq!(opcode.to_string(), "0x0C03 (OGF=3, OCF=3)");
    }

    #[test]
    fn event_code_vendor_bit() {
        assert!(HciEventCode::new(0xFF).is_vendor_specific());
        assert!(!HciEventCode::new(0x3E).is_vendor_specific());
        assert_eq!(HciEventCode::new(0x0E).to_string(), "0x0E");
    }

    #[test]
    fn packet_type_known_set() {
        for value in 0x01..=0x05u8 {
            assert!(HciPacketType::new(value).is_known());
        }
        assert!(!HciPacketType::new(0x00).is_known());
        assert!(!HciPacketType::new(0x06).is_known());
        assert_eq!(HciPacketType::new(0x06).to_string(), "0x06");
    }
}
