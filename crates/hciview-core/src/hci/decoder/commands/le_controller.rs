//! LE Controller command group (OGF 0x08).

use std::collections::HashMap;

use super::{CommandTable, no_params};
use crate::hci::decoder::format;
use crate::hci::decoder::{HciField, Spec};
use crate::hci::reader::HciReader;

const LE_1M_PHY: u8 = 0x01;
const LE_CODED_PHY: u8 = 0x04;

pub(super) fn table() -> CommandTable {
    HashMap::from([
        (0x0006, Spec::new("LE Set Advertising Parameters", set_advertising_parameters)),
        (0x0007, Spec::new("LE Read Advertising Physical Channel Tx Power", no_params)),
        (0x0008, Spec::new("LE Set Advertising Data", set_advertising_data)),
        (0x0009, Spec::new("LE Set Scan Response Data", set_scan_response_data)),
        (0x000A, Spec::new("LE Set Advertising Enable", set_advertising_enable)),
        (0x000B, Spec::new("LE Set Scan Parameters", set_scan_parameters)),
        (0x000C, Spec::new("LE Set Scan Enable", set_scan_enable)),
        (0x0035, Spec::new(
            "LE Set Advertising Set Random Address",
            set_advertising_set_random_address,
        )),
        (0x0036, Spec::new(
            "LE Set Extended Advertising Parameters [v1]",
            set_extended_advertising_parameters_v1,
        )),
        (0x0037, Spec::new("LE Set Extended Advertising Data", set_extended_advertising_data)),
        (0x0038, Spec::new(
            "LE Set Extended Scan Response Data",
            set_extended_scan_response_data,
        )),
        (0x0039, Spec::new(
            "LE Set Extended Advertising Enable",
            set_extended_advertising_enable,
        )),
        (0x003A, Spec::new("LE Read Maximum Advertising Data Length", no_params)),
        (0x003B, Spec::new("LE Read Number of Supported Advertising Sets", no_params)),
        (0x003C, Spec::new("LE Remove Advertising Set", remove_advertising_set)),
        (0x003D, Spec::new("LE Clear Advertising Sets", no_params)),
        (0x0041, Spec::new("LE Set Extended Scan Parameters", set_extended_scan_parameters)),
        (0x0042, Spec::new("LE Set Extended Scan Enable", set_extended_scan_enable)),
        (0x007F, Spec::new(
            "LE Set Extended Advertising Parameters [v2]",
            set_extended_advertising_parameters_v2,
        )),
    ])
}

// OGF 0x08, OCF 0x0006
fn set_advertising_parameters(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let interval_min = reader.try_read_u16()?;
    let interval_max = reader.try_read_u16()?;
    let advertising_type = reader.try_read_u8()?;
    let own_address_type = reader.try_read_u8()?;
    let peer_address_type = reader.try_read_u8()?;
    let peer_address = reader.try_read_bytes(6)?;
    let channel_map = reader.try_read_u8()?;
    let filter_policy = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![
        HciField::new("Advertising Interval Min", format::interval_625us(interval_min)),
        HciField::new("Advertising Interval Max", format::interval_625us(interval_max)),
        HciField::new("Advertising Type", format::advertising_type(advertising_type)),
        HciField::new("Own Address Type", format::own_address_type(own_address_type)),
        HciField::new("Peer Address Type", format::peer_address_type(peer_address_type)),
        HciField::new("Peer Address", format::bd_addr(peer_address)),
        HciField::new("Advertising Channel Map", format::advertising_channel_map(channel_map)),
        HciField::new(
            "Advertising Filter Policy",
            format::advertising_filter_policy(filter_policy),
        ),
    ])
}

// OGF 0x08, OCF 0x0008. Legacy advertising data travels in a fixed 31-byte
// block; the length byte says how much of it is significant.
fn set_advertising_data(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let (data_length, payload) = fixed_31_byte_block(reader)?;

    Some(vec![
        HciField::new("Advertising Data Length", data_length.to_string()),
        HciField::new("Advertising Data", format::hex_bytes(payload)),
    ])
}

// OGF 0x08, OCF 0x0009
fn set_scan_response_data(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let (data_length, payload) = fixed_31_byte_block(reader)?;

    Some(vec![
        HciField::new("Scan Response Data Length", data_length.to_string()),
        HciField::new("Scan Response Data", format::hex_bytes(payload)),
    ])
}

fn fixed_31_byte_block<'a>(reader: &mut HciReader<'a>) -> Option<(u8, &'a [u8])> {
    let data_length = reader.try_read_u8()?;
    let data = reader.try_read_bytes(31)?;
    reader.finish()?;
    if data_length > 31 {
        return None;
    }
    Some((data_length, &data[..usize::from(data_length)]))
}

// OGF 0x08, OCF 0x000A
fn set_advertising_enable(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let enable = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![HciField::new("Advertising Enable", format::enable(enable))])
}

// OGF 0x08, OCF 0x000B
fn set_scan_parameters(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let scan_type = reader.try_read_u8()?;
    let scan_interval = reader.try_read_u16()?;
    let scan_window = reader.try_read_u16()?;
    let own_address_type = reader.try_read_u8()?;
    let filter_policy = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![
        HciField::new("LE Scan Type", format::scan_type(scan_type)),
        HciField::new("LE Scan Interval", format::interval_625us(scan_interval)),
        HciField::new("LE Scan Window", format::interval_625us(scan_window)),
        HciField::new("Own Address Type", format::own_address_type(own_address_type)),
        HciField::new("Scanning Filter Policy", format::scanning_filter_policy(filter_policy)),
    ])
}

// OGF 0x08, OCF 0x000C
fn set_scan_enable(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let enable = reader.try_read_u8()?;
    let filter_duplicates = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![
        HciField::new("LE Scan Enable", format::enable(enable)),
        HciField::new("Filter Duplicates", format::filter_duplicates(filter_duplicates)),
    ])
}

// OGF 0x08, OCF 0x0035
fn set_advertising_set_random_address(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let advertising_handle = reader.try_read_u8()?;
    let random_address = reader.try_read_bytes(6)?;
    reader.finish()?;

    Some(vec![
        HciField::new("Advertising Handle", format::hex(advertising_handle)),
        HciField::new("Random Address", format::bd_addr(random_address)),
    ])
}

// OGF 0x08, OCF 0x0036 (v1)
fn set_extended_advertising_parameters_v1(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let fields = extended_advertising_parameters_common(reader)?;
    reader.finish()?;
    Some(fields)
}

// OGF 0x08, OCF 0x007F (v2): v1 plus trailing per-PHY option bytes.
fn set_extended_advertising_parameters_v2(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let mut fields = extended_advertising_parameters_common(reader)?;
    let primary_phy_options = reader.try_read_u8()?;
    let secondary_phy_options = reader.try_read_u8()?;
    reader.finish()?;

    fields.push(HciField::new(
        "Primary Advertising PHY Options",
        format::phy_options(primary_phy_options),
    ));
    fields.push(HciField::new(
        "Secondary Advertising PHY Options",
        format::phy_options(secondary_phy_options),
    ));
    Some(fields)
}

fn extended_advertising_parameters_common(
    reader: &mut HciReader<'_>,
) -> Option<Vec<HciField>> {
    let advertising_handle = reader.try_read_u8()?;
    let event_properties = reader.try_read_u16()?;
    let interval_min = reader.try_read_u24()?;
    let interval_max = reader.try_read_u24()?;
    let channel_map = reader.try_read_u8()?;
    let own_address_type = reader.try_read_u8()?;
    let peer_address_type = reader.try_read_u8()?;
    let peer_address = reader.try_read_bytes(6)?;
    let filter_policy = reader.try_read_u8()?;
    let tx_power = reader.try_read_i8()?;
    let primary_phy = reader.try_read_u8()?;
    let secondary_max_skip = reader.try_read_u8()?;
    let secondary_phy = reader.try_read_u8()?;
    let advertising_sid = reader.try_read_u8()?;
    let scan_request_notification = reader.try_read_u8()?;

    Some(vec![
        HciField::new("Advertising Handle", format::hex(advertising_handle)),
        HciField::new(
            "Advertising Event Properties",
            format::advertising_event_properties(event_properties),
        ),
        HciField::new(
            "Primary Advertising Interval Min",
            format::interval_625us_u24(interval_min),
        ),
        HciField::new(
            "Primary Advertising Interval Max",
            format::interval_625us_u24(interval_max),
        ),
        HciField::new(
            "Primary Advertising Channel Map",
            format::advertising_channel_map(channel_map),
        ),
        HciField::new("Own Address Type", format::own_address_type(own_address_type)),
        HciField::new("Peer Address Type", format::peer_address_type(peer_address_type)),
        HciField::new("Peer Address", format::bd_addr(peer_address)),
        HciField::new(
            "Advertising Filter Policy",
            format::advertising_filter_policy(filter_policy),
        ),
        HciField::new("Advertising TX Power", format::advertising_tx_power(tx_power)),
        HciField::new("Primary Advertising PHY", format::primary_advertising_phy(primary_phy)),
        HciField::new("Secondary Advertising Max Skip", format::hex(secondary_max_skip)),
        HciField::new(
            "Secondary Advertising PHY",
            format::secondary_advertising_phy(secondary_phy),
        ),
        HciField::new("Advertising SID", format::advertising_sid(advertising_sid)),
        HciField::new(
            "Scan Request Notification Enable",
            format::scan_request_notification_enable(scan_request_notification),
        ),
    ])
}

// OGF 0x08, OCF 0x0037
fn set_extended_advertising_data(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let (header, data) = extended_data_fragment(reader)?;

    Some(vec![
        HciField::new("Advertising Handle", format::hex(header.advertising_handle)),
        HciField::new("Operation", format::operation(header.operation)),
        HciField::new("Fragment Preference", format::fragment_preference(header.fragment_preference)),
        HciField::new("Advertising Data Length", header.data_length.to_string()),
        HciField::new("Advertising Data", format::hex_bytes(data)),
    ])
}

// OGF 0x08, OCF 0x0038
fn set_extended_scan_response_data(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let (header, data) = extended_data_fragment(reader)?;

    Some(vec![
        HciField::new("Advertising Handle", format::hex(header.advertising_handle)),
        HciField::new("Operation", format::operation(header.operation)),
        HciField::new("Fragment Preference", format::fragment_preference(header.fragment_preference)),
        HciField::new("Scan Response Data Length", header.data_length.to_string()),
        HciField::new("Scan Response Data", format::hex_bytes(data)),
    ])
}

struct ExtendedDataHeader {
    advertising_handle: u8,
    operation: u8,
    fragment_preference: u8,
    data_length: u8,
}

/// Extended advertising/scan-response data: an inline length byte followed
/// by exactly that many data bytes (fragments cap at 251).
fn extended_data_fragment<'a>(
    reader: &mut HciReader<'a>,
) -> Option<(ExtendedDataHeader, &'a [u8])> {
    let advertising_handle = reader.try_read_u8()?;
    let operation = reader.try_read_u8()?;
    let fragment_preference = reader.try_read_u8()?;
    let data_length = reader.try_read_u8()?;
    if data_length > 251 {
        return None;
    }
    let data = reader.try_read_bytes(usize::from(data_length))?;
    reader.finish()?;

    Some((
        ExtendedDataHeader {
            advertising_handle,
            operation,
            fragment_preference,
            data_length,
        },
        data,
    ))
}

// OGF 0x08, OCF 0x0039. One fixed-shape triple per advertised set.
fn set_extended_advertising_enable(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let enable = reader.try_read_u8()?;
    let number_of_sets = reader.try_read_u8()?;

    let mut fields = vec![
        HciField::new("Enable", format::enable(enable)),
        HciField::new("Number Of Sets", number_of_sets.to_string()),
    ];

    for i in 0..number_of_sets {
        let advertising_handle = reader.try_read_u8()?;
        let duration = reader.try_read_u16()?;
        let max_events = reader.try_read_u8()?;

        fields.push(HciField::new(
            format!("Set[{i}] Advertising Handle"),
            format::hex(advertising_handle),
        ));
        fields.push(HciField::new(format!("Set[{i}] Duration"), format::hex16(duration)));
        fields.push(HciField::new(
            format!("Set[{i}] Max Extended Advertising Events"),
            format::hex(max_events),
        ));
    }

    reader.finish()?;
    Some(fields)
}

// OGF 0x08, OCF 0x003C
fn remove_advertising_set(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let advertising_handle = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![HciField::new("Advertising Handle", format::hex(advertising_handle))])
}

// OGF 0x08, OCF 0x0041. Scan triples follow only for the PHYs whose bits
// are set; any bit outside LE 1M / LE Coded makes the packet invalid.
fn set_extended_scan_parameters(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let own_address_type = reader.try_read_u8()?;
    let filter_policy = reader.try_read_u8()?;
    let scanning_phys = reader.try_read_u8()?;

    if scanning_phys & (LE_1M_PHY | LE_CODED_PHY) == 0
        || scanning_phys & !(LE_1M_PHY | LE_CODED_PHY) != 0
    {
        return None;
    }

    let mut fields = vec![
        HciField::new("Own Address Type", format::own_address_type(own_address_type)),
        HciField::new("Scanning Filter Policy", format::scanning_filter_policy(filter_policy)),
        HciField::new("Scanning PHYs", format::scanning_phys(scanning_phys)),
    ];

    if scanning_phys & LE_1M_PHY != 0 {
        push_phy_scan_fields(reader, "LE 1M", &mut fields)?;
    }
    if scanning_phys & LE_CODED_PHY != 0 {
        push_phy_scan_fields(reader, "LE Coded", &mut fields)?;
    }

    reader.finish()?;
    Some(fields)
}

fn push_phy_scan_fields(
    reader: &mut HciReader<'_>,
    phy: &str,
    fields: &mut Vec<HciField>,
) -> Option<()> {
    let scan_type = reader.try_read_u8()?;
    let scan_interval = reader.try_read_u16()?;
    let scan_window = reader.try_read_u16()?;

    fields.push(HciField::new(format!("{phy} Scan Type"), format::scan_type(scan_type)));
    fields.push(HciField::new(
        format!("{phy} Scan Interval"),
        format::interval_625us(scan_interval),
    ));
    fields.push(HciField::new(
        format!("{phy} Scan Window"),
        format::interval_625us(scan_window),
    ));
    Some(())
}

// OGF 0x08, OCF 0x0042
fn set_extended_scan_enable(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let enable = reader.try_read_u8()?;
    let filter_duplicates = reader.try_read_u8()?;
    let duration = reader.try_read_u16()?;
    let period = reader.try_read_u16()?;
    reader.finish()?;

    Some(vec![
        HciField::new("Enable", format::enable(enable)),
        HciField::new("Filter Duplicates", format::filter_duplicates(filter_duplicates)),
        HciField::new("Duration", format::scan_duration(duration)),
        HciField::new("Period", format::scan_period(period)),
    ])
}

#[cfg(test)]
mod tests {
    use crate::hci::decoder::{DecodeStatus, DecodedResult, HciDecoder};
    use crate::hci::packet::{HciCommandPacket, HciOpcode};

    fn decode(ocf: u16, parameters: &[u8]) -> DecodedResult {
        let packet = HciCommandPacket {
            opcode: HciOpcode::new((0x08 << 10) | ocf),
            parameters,
        };
        HciDecoder::new().decode_command(&packet)
    }

    #[test]
    fn set_scan_enable_fields() {
        let decoded = decode(0x000C, &[0x01, 0x00]);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[0].value, "0x01 (Enabled)");
        assert_eq!(decoded.fields[1].value, "0x00 (Disabled)");
    }

    #[test]
    fn set_advertising_parameters_fields() {
        let mut parameters = Vec::new();
        parameters.extend_from_slice(&0x0800u16.to_le_bytes());
        parameters.extend_from_slice(&0x0800u16.to_le_bytes());
        parameters.extend_from_slice(&[0x00, 0x01, 0x00]);
        parameters.extend_from_slice(&[0x51, 0x13, 0x5E, 0xD8, 0x74, 0x7D]);
        parameters.extend_from_slice(&[0x07, 0x00]);

        let decoded = decode(0x0006, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields.len(), 8);
        assert_eq!(decoded.fields[0].value, "0x0800 (1280 ms)");
        assert_eq!(decoded.fields[5].value, "7D:74:D8:5E:13:51");
        assert_eq!(decoded.fields[6].value, "0x07 (37,38,39)");
    }

    #[test]
    fn set_advertising_data_uses_significant_prefix() {
        let mut parameters = vec![0x03];
        parameters.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        parameters.extend_from_slice(&[0x00; 28]);

        let decoded = decode(0x0008, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[0].value, "3");
        assert_eq!(decoded.fields[1].value, "0xAABBCC");
    }

    #[test]
    fn set_advertising_data_rejects_oversized_length() {
        let mut parameters = vec![0x20];
        parameters.extend_from_slice(&[0x00; 31]);

        let decoded = decode(0x0008, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }

    #[test]
    fn extended_advertising_enable_per_set_loop() {
        let parameters = [
            0x01, 0x02, // enable, two sets
            0x01, 0x10, 0x00, 0x05, // set 0
            0x02, 0x00, 0x00, 0x00, // set 1
        ];
        let decoded = decode(0x0039, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields.len(), 2 + 2 * 3);
        assert_eq!(decoded.fields[2].name, "Set[0] Advertising Handle");
        assert_eq!(decoded.fields[3].value, "0x0010");
        assert_eq!(decoded.fields[5].name, "Set[1] Advertising Handle");
    }

    #[test]
    fn extended_advertising_enable_truncated_set_is_invalid() {
        let parameters = [0x01, 0x02, 0x01, 0x10, 0x00, 0x05, 0x02];
        let decoded = decode(0x0039, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }

    #[test]
    fn extended_advertising_enable_trailing_bytes_are_invalid() {
        let parameters = [0x01, 0x01, 0x01, 0x10, 0x00, 0x05, 0xFF];
        let decoded = decode(0x0039, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }

    #[test]
    fn extended_scan_parameters_both_phys() {
        let parameters = [
            0x00, 0x00, 0x05, // own address, policy, PHYs: 1M | Coded
            0x01, 0x10, 0x00, 0x10, 0x00, // LE 1M triple
            0x00, 0x40, 0x00, 0x20, 0x00, // LE Coded triple
        ];
        let decoded = decode(0x0041, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[2].value, "0x05 (LE 1M, LE Coded)");
        assert_eq!(decoded.fields[3].name, "LE 1M Scan Type");
        assert_eq!(decoded.fields[6].name, "LE Coded Scan Type");
    }

    #[test]
    fn extended_scan_parameters_reserved_phy_bit_is_invalid() {
        let parameters = [0x00, 0x00, 0x02, 0x01, 0x10, 0x00, 0x10, 0x00];
        let decoded = decode(0x0041, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }

    #[test]
    fn extended_advertising_parameters_v2_has_phy_options() {
        let mut parameters = vec![
            0x00, // handle
            0x13, 0x00, // event properties
            0x00, 0x08, 0x00, // interval min
            0x00, 0x08, 0x00, // interval max
            0x07, 0x00, 0x00, // channel map, own addr, peer addr type
        ];
        parameters.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        parameters.extend_from_slice(&[0x00, 0x7F, 0x01, 0x00, 0x01, 0x00, 0x00]);
        parameters.extend_from_slice(&[0x01, 0x02]);

        let decoded = decode(0x007F, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields.len(), 17);
        assert_eq!(decoded.fields[9].value, "127 dBm (Host has no preference)");
        assert_eq!(decoded.fields[15].value, "0x01 (Prefer S=2 coding)");
        assert_eq!(decoded.fields[16].value, "0x02 (Prefer S=8 coding)");

        // Same bytes without the option suffix decode as v1.
        let v1 = &parameters[..parameters.len() - 2];
        let decoded = decode(0x0036, v1);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields.len(), 15);
    }

    #[test]
    fn extended_data_fragment_exact_length() {
        let parameters = [0x01, 0x03, 0x01, 0x02, 0xDE, 0xAD];
        let decoded = decode(0x0037, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[1].value, "0x03 (Complete)");
        assert_eq!(decoded.fields[4].value, "0xDEAD");

        let truncated = [0x01, 0x03, 0x01, 0x03, 0xDE, 0xAD];
        let decoded = decode(0x0037, &truncated);
        assert_eq!(decoded.status, DecodeStatus::Invalid);
    }

    #[test]
    fn extended_scan_enable_duration_annotations() {
        let parameters = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        let decoded = decode(0x0042, &parameters);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.fields[2].value, "0x0000 (Scan continuously)");
        assert_eq!(decoded.fields[3].value, "0x0000 (Continuous)");
    }
}
