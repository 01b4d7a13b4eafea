//! Display formatting for decoded field values.
//!
//! Pure functions only; every formatter returns the raw value (hex) and,
//! where the wire value has an assigned meaning, a parenthesized
//! annotation. Unassigned values fall back to the bare hex form.

pub(crate) fn hex(value: u8) -> String {
    format!("0x{value:02X}")
}

pub(crate) fn hex16(value: u16) -> String {
    format!("0x{value:04X}")
}

pub(crate) fn hex24(value: u32) -> String {
    format!("0x{value:06X}")
}

pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "0x".to_string();
    }
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

/// BD_ADDR is stored least-significant byte first; display reverses it into
/// the conventional colon-separated form.
pub(crate) fn bd_addr(bytes: &[u8]) -> String {
    if bytes.len() != 6 {
        return hex_bytes(bytes);
    }
    bytes
        .iter()
        .rev()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

pub(crate) fn dbm(value: i8) -> String {
    format!("{value} dBm")
}

/// TX power / RSSI byte where raw 0x7F means "not available".
pub(crate) fn dbm_or_unavailable(value: i8) -> String {
    if value as u8 == 0x7F {
        return format!("{value} dBm (Not available)");
    }
    dbm(value)
}

/// TX power preference byte where raw 0x7F means "no preference".
pub(crate) fn advertising_tx_power(value: i8) -> String {
    if value as u8 == 0x7F {
        return format!("{value} dBm (Host has no preference)");
    }
    dbm(value)
}

fn annotated(raw: String, label: &str) -> String {
    format!("{raw} ({label})")
}

/// 0.625 ms units; milliseconds rendered with up to three decimals.
pub(crate) fn interval_625us(value: u16) -> String {
    annotated_interval(hex16(value), u32::from(value))
}

pub(crate) fn interval_625us_u24(value: u32) -> String {
    annotated_interval(hex24(value), value)
}

fn annotated_interval(raw: String, value: u32) -> String {
    let ms = f64::from(value) * 0.625;
    let text = format!("{ms:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{raw} ({text} ms)")
}

pub(crate) fn enable(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Disabled"),
        0x01 => annotated(hex(value), "Enabled"),
        _ => hex(value),
    }
}

pub(crate) fn advertising_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "ADV_IND, connectable undirected"),
        0x01 => annotated(hex(value), "ADV_DIRECT_IND, high duty cycle directed"),
        0x02 => annotated(hex(value), "ADV_SCAN_IND, scannable undirected"),
        0x03 => annotated(hex(value), "ADV_NONCONN_IND, non-connectable undirected"),
        0x04 => annotated(hex(value), "ADV_DIRECT_IND, low duty cycle directed"),
        _ => hex(value),
    }
}

pub(crate) fn legacy_advertising_event_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "ADV_IND"),
        0x01 => annotated(hex(value), "ADV_DIRECT_IND"),
        0x02 => annotated(hex(value), "ADV_SCAN_IND"),
        0x03 => annotated(hex(value), "ADV_NONCONN_IND"),
        0x04 => annotated(hex(value), "SCAN_RSP"),
        _ => hex(value),
    }
}

pub(crate) fn extended_advertising_event_type(value: u16) -> String {
    let mut flags = Vec::new();
    if value & 0x0001 != 0 {
        flags.push("Connectable".to_string());
    }
    if value & 0x0002 != 0 {
        flags.push("Scannable".to_string());
    }
    if value & 0x0004 != 0 {
        flags.push("Directed".to_string());
    }
    if value & 0x0008 != 0 {
        flags.push("Scan Response".to_string());
    }
    if value & 0x0010 != 0 {
        flags.push("Legacy".to_string());
    }

    let data_status = match (value >> 5) & 0x03 {
        0x00 => "Complete",
        0x01 => "Incomplete, more data",
        0x02 => "Incomplete, truncated",
        _ => "Reserved",
    };
    flags.push(format!("Data Status: {data_status}"));

    annotated(hex16(value), &flags.join(", "))
}

pub(crate) fn advertising_event_properties(value: u16) -> String {
    let mut flags = Vec::new();
    if value & 0x0001 != 0 {
        flags.push("Connectable");
    }
    if value & 0x0002 != 0 {
        flags.push("Scannable");
    }
    if value & 0x0004 != 0 {
        flags.push("Directed");
    }
    if value & 0x0008 != 0 {
        flags.push("High Duty Cycle Directed");
    }
    if value & 0x0010 != 0 {
        flags.push("Legacy PDUs");
    }
    if value & 0x0020 != 0 {
        flags.push("Anonymous");
    }
    if value & 0x0040 != 0 {
        flags.push("Include TxPower");
    }
    if value & 0x0080 != 0 {
        flags.push("Use Decision PDUs");
    }
    if value & 0x0100 != 0 {
        flags.push("Include AdvA in Decision PDUs");
    }
    if value & 0x0200 != 0 {
        flags.push("Include ADI in Decision PDUs");
    }

    let suffix = if flags.is_empty() {
        "None".to_string()
    } else {
        flags.join(", ")
    };
    annotated(hex16(value), &suffix)
}

pub(crate) fn own_address_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Public Device Address"),
        0x01 => annotated(hex(value), "Random Device Address"),
        0x02 => annotated(hex(value), "RPA from resolving list, fallback Public Address"),
        0x03 => annotated(hex(value), "RPA from resolving list, fallback Random Address"),
        _ => hex(value),
    }
}

pub(crate) fn peer_address_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Public Device or Public Identity Address"),
        0x01 => annotated(hex(value), "Random Device or Random Identity Address"),
        _ => hex(value),
    }
}

pub(crate) fn address_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Public Device Address"),
        0x01 => annotated(hex(value), "Random Device Address"),
        0x02 => annotated(hex(value), "Public Identity Address"),
        0x03 => annotated(hex(value), "Random Identity Address"),
        0xFF => annotated(hex(value), "Anonymous Address"),
        _ => hex(value),
    }
}

pub(crate) fn direct_address_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Public Device Address"),
        0x01 => annotated(hex(value), "Non-resolvable Private or Static Random Address"),
        0x02 => annotated(
            hex(value),
            "Resolvable Private Address, resolved; Own_Address_Type 0x00/0x02",
        ),
        0x03 => annotated(
            hex(value),
            "Resolvable Private Address, resolved; Own_Address_Type 0x01/0x03",
        ),
        0xFE => annotated(hex(value), "Resolvable Private Address, unresolved"),
        _ => hex(value),
    }
}

pub(crate) fn advertising_filter_policy(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Allow scan/connection from all devices"),
        0x01 => annotated(
            hex(value),
            "Allow connection from all; scan from Filter Accept List",
        ),
        0x02 => annotated(
            hex(value),
            "Allow scan from all; connection from Filter Accept List",
        ),
        0x03 => annotated(
            hex(value),
            "Allow scan/connection from Filter Accept List only",
        ),
        0x7F => annotated(hex(value), "Host has no preference"),
        _ => hex(value),
    }
}

pub(crate) fn scanning_filter_policy(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Basic unfiltered"),
        0x01 => annotated(hex(value), "Basic filtered"),
        0x02 => annotated(hex(value), "Extended unfiltered"),
        0x03 => annotated(hex(value), "Extended filtered"),
        _ => hex(value),
    }
}

pub(crate) fn scan_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Passive"),
        0x01 => annotated(hex(value), "Active"),
        _ => hex(value),
    }
}

pub(crate) fn filter_duplicates(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Disabled"),
        0x01 => annotated(hex(value), "Enabled"),
        0x02 => annotated(hex(value), "Enabled, reset per scan period"),
        _ => hex(value),
    }
}

pub(crate) fn advertising_channel_map(value: u8) -> String {
    let mut channels = Vec::new();
    if value & 0x01 != 0 {
        channels.push("37");
    }
    if value & 0x02 != 0 {
        channels.push("38");
    }
    if value & 0x04 != 0 {
        channels.push("39");
    }

    let suffix = if channels.is_empty() {
        "None".to_string()
    } else {
        channels.join(",")
    };
    annotated(hex(value), &suffix)
}

pub(crate) fn primary_advertising_phy(value: u8) -> String {
    match value {
        0x01 => annotated(hex(value), "LE 1M"),
        0x03 => annotated(hex(value), "LE Coded"),
        _ => hex(value),
    }
}

pub(crate) fn secondary_advertising_phy(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "No secondary advertising"),
        0x01 => annotated(hex(value), "LE 1M"),
        0x02 => annotated(hex(value), "LE 2M"),
        0x03 => annotated(hex(value), "LE Coded"),
        _ => hex(value),
    }
}

pub(crate) fn scanning_phys(value: u8) -> String {
    let mut phys = Vec::new();
    if value & 0x01 != 0 {
        phys.push("LE 1M");
    }
    if value & 0x04 != 0 {
        phys.push("LE Coded");
    }

    let suffix = if phys.is_empty() {
        "None".to_string()
    } else {
        phys.join(", ")
    };
    annotated(hex(value), &suffix)
}

pub(crate) fn operation(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Intermediate fragment"),
        0x01 => annotated(hex(value), "First fragment"),
        0x02 => annotated(hex(value), "Last fragment"),
        0x03 => annotated(hex(value), "Complete"),
        0x04 => annotated(hex(value), "Unchanged data"),
        _ => hex(value),
    }
}

pub(crate) fn fragment_preference(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Controller may fragment"),
        0x01 => annotated(hex(value), "Controller should not fragment"),
        _ => hex(value),
    }
}

pub(crate) fn scan_request_notification_enable(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Disabled"),
        0x01 => annotated(hex(value), "Enabled"),
        _ => hex(value),
    }
}

pub(crate) fn phy_options(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "No preference"),
        0x01 => annotated(hex(value), "Prefer S=2 coding"),
        0x02 => annotated(hex(value), "Prefer S=8 coding"),
        0x03 => annotated(hex(value), "Require S=2 coding"),
        0x04 => annotated(hex(value), "Require S=8 coding"),
        _ => hex(value),
    }
}

pub(crate) fn advertising_sid(value: u8) -> String {
    if value == 0xFF {
        return annotated(hex(value), "No ADI field");
    }
    hex(value)
}

pub(crate) fn periodic_advertising_interval(value: u16) -> String {
    if value == 0x0000 {
        return annotated(hex16(value), "No periodic advertising");
    }
    hex16(value)
}

pub(crate) fn scan_duration(value: u16) -> String {
    if value == 0x0000 {
        return annotated(hex16(value), "Scan continuously");
    }
    hex16(value)
}

pub(crate) fn scan_period(value: u16) -> String {
    if value == 0x0000 {
        return annotated(hex16(value), "Continuous");
    }
    hex16(value)
}

pub(crate) fn logical_transport_type(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "BR/EDR ACL"),
        0x01 => annotated(hex(value), "BR/EDR SCO or eSCO"),
        0x02 => annotated(hex(value), "LE CIS"),
        0x03 => annotated(hex(value), "LE BIS"),
        _ => hex(value),
    }
}

pub(crate) fn direction(value: u8) -> String {
    match value {
        0x00 => annotated(hex(value), "Input"),
        0x01 => annotated(hex(value), "Output"),
        _ => hex(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_widths() {
        assert_eq!(hex(0x0E), "0x0E");
        assert_eq!(hex16(0x0C03), "0x0C03");
        assert_eq!(hex24(0x000800), "0x000800");
    }

    #[test]
    fn hex_bytes_empty_and_filled() {
        assert_eq!(hex_bytes(&[]), "0x");
        assert_eq!(hex_bytes(&[0xDE, 0xAD]), "0xDEAD");
    }

    #[test]
    fn bd_addr_reverses_storage_order() {
        let stored = [0x51, 0x13, 0x5E, 0xD8, 0x74, 0x7D];
        assert_eq!(bd_addr(&stored), "7D:74:D8:5E:13:51");
        assert_eq!(bd_addr(&[0x01, 0x02]), "0x0102");
    }

    #[test]
    fn interval_scaling_trims_decimals() {
        assert_eq!(interval_625us(0x0800), "0x0800 (1280 ms)");
        assert_eq!(interval_625us(100), "0x0064 (62.5 ms)");
        assert_eq!(interval_625us(3), "0x0003 (1.875 ms)");
        assert_eq!(interval_625us_u24(0x000800), "0x000800 (1280 ms)");
    }

    #[test]
    fn tx_power_sentinel() {
        assert_eq!(advertising_tx_power(0x7F), "127 dBm (Host has no preference)");
        assert_eq!(advertising_tx_power(-10), "-10 dBm");
        assert_eq!(dbm_or_unavailable(0x7F), "127 dBm (Not available)");
        assert_eq!(dbm_or_unavailable(-60), "-60 dBm");
    }

    #[test]
    fn channel_map_lists_set_bits() {
        assert_eq!(advertising_channel_map(0x07), "0x07 (37,38,39)");
        assert_eq!(advertising_channel_map(0x02), "0x02 (38)");
        assert_eq!(advertising_channel_map(0x00), "0x00 (None)");
    }

    #[test]
    fn event_properties_none_when_zero() {
        assert_eq!(advertising_event_properties(0x0000), "0x0000 (None)");
        assert_eq!(
            advertising_event_properties(0x0013),
            "0x0013 (Connectable, Scannable, Legacy PDUs)"
        );
    }

    #[test]
    fn extended_event_type_includes_data_status() {
        assert_eq!(
            extended_advertising_event_type(0x0010),
            "0x0010 (Legacy, Data Status: Complete)"
        );
        assert_eq!(
            extended_advertising_event_type(0x0021),
            "0x0021 (Connectable, Data Status: Incomplete, more data)"
        );
    }

    #[test]
    fn scanning_phys_annotation() {
        assert_eq!(scanning_phys(0x05), "0x05 (LE 1M, LE Coded)");
        assert_eq!(scanning_phys(0x00), "0x00 (None)");
    }

    #[test]
    fn unassigned_values_fall_back_to_hex() {
        assert_eq!(enable(0x02), "0x02");
        assert_eq!(scan_type(0x7A), "0x7A");
        assert_eq!(advertising_sid(0x05), "0x05");
        assert_eq!(advertising_sid(0xFF), "0xFF (No ADI field)");
        assert_eq!(periodic_advertising_interval(0), "0x0000 (No periodic advertising)");
    }
}
