//! Informational Parameters command group (OGF 0x04).

use std::collections::HashMap;

use super::{CommandTable, no_params};
use crate::hci::decoder::format;
use crate::hci::decoder::{HciField, Spec};
use crate::hci::reader::HciReader;

pub(super) fn table() -> CommandTable {
    HashMap::from([
        (0x0001, Spec::new("Read Local Version Information", no_params)),
        (0x0002, Spec::new("Read Local Supported Commands", no_params)),
        (0x0003, Spec::new("Read Local Supported Features", no_params)),
        // Label kept as-is from the source material; see DESIGN.md.
        (0x0004, Spec::new("Read Local Extended Features", read_local_extended_features)),
        (0x0005, Spec::new("Read Buffer Size", no_params)),
        (0x0009, Spec::new("Read BD_ADDR", no_params)),
        (0x000A, Spec::new("Read Data Block Size", no_params)),
        (0x000B, Spec::new("Read Local Supported Codecs [v1]", no_params)),
        (0x000C, Spec::new("Read Local Simple Pairing Options", no_params)),
        (0x000D, Spec::new("Read Local Supported Codecs [v2]", no_params)),
        (0x000E, Spec::new(
            "Read Local Supported Codec Capabilities",
            read_codec_capabilities,
        )),
        (0x000F, Spec::new(
            "Read Local Supported Controller Delay",
            read_controller_delay,
        )),
    ])
}

// OGF 0x04, OCF 0x0004
fn read_local_extended_features(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let page_number = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![HciField::new("Page Number", format::hex(page_number))])
}

// OGF 0x04, OCF 0x000E
fn read_codec_capabilities(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let codec_id = reader.try_read_bytes(5)?;
    let transport_type = reader.try_read_u8()?;
    let direction = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![
        HciField::new("Codec ID", format::hex_bytes(codec_id)),
        HciField::new(
            "Logical Transport Type",
            format::logical_transport_type(transport_type),
        ),
        HciField::new("Direction", format::direction(direction)),
    ])
}

// OGF 0x04, OCF 0x000F
fn read_controller_delay(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let codec_id = reader.try_read_bytes(5)?;
    let transport_type = reader.try_read_u8()?;
    let direction = reader.try_read_u8()?;
    let config_length = reader.try_read_u8()?;
    let config = reader.try_read_bytes(usize::from(config_length))?;
    reader.finish()?;

    Some(vec![
        HciField::new("Codec ID", format::hex_bytes(codec_id)),
        HciField::new(
            "Logical Transport Type",
            format::logical_transport_type(transport_type),
        ),
        HciField::new("Direction", format::direction(direction)),
        HciField::new("Codec Configuration Length", config_length.to_string()),
        HciField::new("Codec Configuration", format::hex_bytes(config)),
    ])
}

#[cfg(test)]
mod tests {
    use crate::hci::decoder::{DecodeStatus, HciDecoder};
    use crate::hci::packet::{HciCommandPacket, HciOpcode};

    fn decode(ocf: u16, parameters: &[u8]) -> crate::hci::decoder::DecodedResult {
        let packet = HciCommandPacket {
            opcode: HciOpcode::new((0x04 << 10) | ocf),
            parameters,
        };
        HciDecoder::new().decode_command(&packet)
    }

    #[test]
    fn extended_features_page_number() {
        let decoded = decode(0x0004, &[0x01]);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields[0].name, "Page Number");
        assert_eq!(decoded.fields[0].value, "0x01");
    }

    #[test]
    fn codec_capabilities_fields() {
        let decoded = decode(0x000E, &[0x05, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01]);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[0].value, "0x0500000000");
        assert_eq!(decoded.fields[1].value, "0x02 (LE CIS)");
        assert_eq!(decoded.fields[2].value, "0x01 (Output)");
    }

    #[test]
    fn controller_delay_consumes_config_blob() {
        let decoded = decode(
            0x000F,
            &[0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB],
        );
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[3].value, "2");
        assert_eq!(decoded.fields[4].value, "0xAABB");
    }

    #[test]
    fn controller_delay_short_config_is_invalid() {
        let decoded = decode(
            0x000F,
            &[0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xAA, 0xBB],
        );
        assert_eq!(decoded.status, DecodeStatus::Invalid);
        assert!(decoded.fields.is_empty());
    }

    #[test]
    fn no_params_commands_reject_extra_bytes() {
        let decoded = decode(0x0009, &[]);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert!(decoded.fields.is_empty());

        let decoded = decode(0x0009, &[0x00]);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }
}
