use super::layout;
use super::packet::{
    HciCommandPacket, HciEventCode, HciEventPacket, HciOpcode, HciPacket, HciPacketType,
    HciUnknownPacket,
};
use super::reader::HciReader;

/// Classify one record payload as an H4 packet.
///
/// Classification never fails hard: malformed payloads come back as
/// `HciPacket::Unknown` with the offending bytes retained, and the caller
/// moves on to the next record.
pub fn parse_packet(payload: &[u8]) -> HciPacket<'_> {
    let Some((&type_byte, rest)) = payload.split_first() else {
        return HciPacket::Unknown(HciUnknownPacket {
            packet_type: HciPacketType::new(0),
            data: &[],
        });
    };

    match type_byte {
        layout::PACKET_TYPE_COMMAND => parse_command(rest),
        layout::PACKET_TYPE_ACL => HciPacket::Acl(rest),
        layout::PACKET_TYPE_SCO => HciPacket::Sco(rest),
        layout::PACKET_TYPE_EVENT => parse_event(rest),
        layout::PACKET_TYPE_ISO => HciPacket::Iso(rest),
        _ => HciPacket::Unknown(HciUnknownPacket {
            packet_type: HciPacketType::new(type_byte),
            data: rest,
        }),
    }
}

fn parse_command(data: &[u8]) -> HciPacket<'_> {
    let mut reader = HciReader::new(data);
    let header = (|| {
        let opcode = reader.try_read_u16()?;
        let declared_len = reader.try_read_u8()?;
        (reader.remaining() == usize::from(declared_len)).then_some(opcode)
    })();

    match header {
        Some(opcode) => HciPacket::Command(HciCommandPacket {
            opcode: HciOpcode::new(opcode),
            parameters: reader.remaining_bytes(),
        }),
        None => HciPacket::Unknown(HciUnknownPacket {
            packet_type: HciPacketType::new(layout::PACKET_TYPE_COMMAND),
            data,
        }),
    }
}

fn parse_event(data: &[u8]) -> HciPacket<'_> {
    let mut reader = HciReader::new(data);
    let header = (|| {
        let event_code = reader.try_read_u8()?;
        let declared_len = reader.try_read_u8()?;
        (reader.remaining() == usize::from(declared_len)).then_some(event_code)
    })();

    match header {
        Some(event_code) => HciPacket::Event(HciEventPacket {
            event_code: HciEventCode::new(event_code),
            parameters: reader.remaining_bytes(),
        }),
        None => HciPacket::Unknown(HciUnknownPacket {
            packet_type: HciPacketType::new(layout::PACKET_TYPE_EVENT),
            data,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_packet;
    use crate::hci::packet::HciPacket;

    #[test]
    fn parse_empty_payload_is_unknown() {
        let packet = parse_packet(&[]);
        let HciPacket::Unknown(unknown) = packet else {
            panic!("expected unknown packet");
        };
        assert_eq!(unknown.packet_type.value(), 0x00);
        assert!(unknown.data.is_empty());
    }

    #[test]
    fn parse_command_packet() {
        let packet = parse_packet(&[0x01, 0x34, 0x12, 0x02, 0xAA, 0xBB]);
        let HciPacket::Command(command) = packet else {
            panic!("expected command packet");
        };
        assert_eq!(command.opcode.ogf(), 0x04);
        assert_eq!(command.opcode.ocf(), 0x0234);
        assert_eq!(command.parameters, &[0xAA, 0xBB]);
    }

    #[test]
    fn parse_vendor_command_packet() {
        let packet = parse_packet(&[0x01, 0x01, 0xFC, 0x00]);
        let HciPacket::Command(command) = packet else {
            panic!("expected command packet");
        };
        assert!(command.opcode.is_vendor_specific());
        assert!(command.parameters.is_empty());
    }

    #[test]
    fn parse_command_length_mismatch_keeps_bytes() {
        let packet = parse_packet(&[0x01, 0x34, 0x12, 0x02, 0xAA]);
        let HciPacket::Unknown(unknown) = packet else {
            panic!("expected unknown packet");
        };
        assert_eq!(unknown.packet_type.to_string(), "0x01");
        assert_eq!(unknown.data, &[0x34, 0x12, 0x02, 0xAA]);
    }

    #[test]
    fn parse_event_packet() {
        let packet = parse_packet(&[0x04, 0x0E, 0x03, 0x01, 0x02, 0x03]);
        let HciPacket::Event(event) = packet else {
            panic!("expected event packet");
        };
        assert_eq!(event.event_code.to_string(), "0x0E");
        assert_eq!(event.parameters, &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn parse_vendor_event_packet() {
        let packet = parse_packet(&[0x04, 0xFF, 0x00]);
        let HciPacket::Event(event) = packet else {
            panic!("expected event packet");
        };
        assert!(event.event_code.is_vendor_specific());
        assert!(event.parameters.is_empty());
    }

    #[test]
    fn parse_event_length_mismatch_keeps_bytes() {
        let packet = parse_packet(&[0x04, 0x0E, 0x02, 0xFF]);
        let HciPacket::Unknown(unknown) = packet else {
            panic!("expected unknown packet");
        };
        assert_eq!(unknown.packet_type.to_string(), "0x04");
        assert_eq!(unknown.data, &[0x0E, 0x02, 0xFF]);
    }

    #[test]
    fn parse_acl_sco_iso_are_opaque() {
        for (type_byte, expect_known) in [(0x02u8, true), (0x03, true), (0x05, true)] {
            let payload = [type_byte, 0x10, 0x20, 0x30];
            let packet = parse_packet(&payload);
            assert_eq!(packet.is_known(), expect_known);
            let data = match packet {
                HciPacket::Acl(data) | HciPacket::Sco(data) | HciPacket::Iso(data) => data,
                other => panic!("unexpected packet: {other:?}"),
            };
            assert_eq!(data, &[0x10, 0x20, 0x30]);
        }
    }

    #[test]
    fn parse_unknown_type_byte() {
        let packet = parse_packet(&[0x06, 0x10, 0x20]);
        let HciPacket::Unknown(unknown) = packet else {
            panic!("expected unknown packet");
        };
        assert_eq!(unknown.packet_type.value(), 0x06);
        assert!(!unknown.packet_type.is_known());
        assert_eq!(unknown.data, &[0x10, 0x20]);
    }

    #[test]
    fn parse_unknown_type_byte_empty_payload() {
        let packet = parse_packet(&[0x06]);
        let HciPacket::Unknown(unknown) = packet else {
            panic!("expected unknown packet");
        };
        assert_eq!(unknown.packet_type.value(), 0x06);
        assert!(unknown.data.is_empty());
    }
}
