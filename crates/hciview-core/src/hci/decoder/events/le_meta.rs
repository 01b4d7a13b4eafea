//! LE Meta event (0x3E): a one-byte subevent code selects the decode
//! routine from its own table.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::hci::decoder::format;
use crate::hci::decoder::{DecodedResult, HciField};
use crate::hci::reader::HciReader;

pub(crate) const EVENT_NAME: &str = "LE Meta";

type SubeventFn = fn(u8, &mut HciReader<'_>) -> Option<Vec<HciField>>;

struct SubeventSpec {
    name: &'static str,
    decode: SubeventFn,
}

impl SubeventSpec {
    const fn new(name: &'static str, decode: SubeventFn) -> Self {
        Self { name, decode }
    }
}

static SUBEVENTS: LazyLock<HashMap<u8, SubeventSpec>> = LazyLock::new(|| {
    HashMap::from([
        (0x02, SubeventSpec::new("LE Advertising Report", advertising_report)),
        (0x0B, SubeventSpec::new(
            "LE Directed Advertising Report",
            directed_advertising_report,
        )),
        (0x0D, SubeventSpec::new(
            "LE Extended Advertising Report",
            extended_advertising_report,
        )),
        (0x11, SubeventSpec::new("LE Scan Timeout", scan_timeout)),
        (0x12, SubeventSpec::new(
            "LE Advertising Set Terminated",
            advertising_set_terminated,
        )),
        (0x13, SubeventSpec::new("LE Scan Request Received", scan_request_received)),
    ])
});

pub(crate) fn decode(parameters: &[u8]) -> DecodedResult {
    let mut reader = HciReader::new(parameters);
    let Some(subevent_code) = reader.try_read_u8() else {
        return DecodedResult::invalid(EVENT_NAME);
    };

    let Some(spec) = SUBEVENTS.get(&subevent_code) else {
        return DecodedResult::unknown(format!(
            "{EVENT_NAME} (Subevent {})",
            format::hex(subevent_code)
        ));
    };

    match (spec.decode)(subevent_code, &mut reader) {
        Some(fields) => DecodedResult::success(spec.name, fields),
        None => DecodedResult::invalid(spec.name),
    }
}

// Subevent 0x02. One report tuple per Num Reports; the data blob inside
// each tuple carries its own length byte.
fn advertising_report(subevent_code: u8, reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let num_reports = reader.try_read_u8()?;

    let mut fields = vec![
        HciField::new("Subevent Code", format::hex(subevent_code)),
        HciField::new("Num Reports", num_reports.to_string()),
    ];

    for i in 0..num_reports {
        let event_type = reader.try_read_u8()?;
        let address_type = reader.try_read_u8()?;
        let address = reader.try_read_bytes(6)?;
        let data_length = reader.try_read_u8()?;
        let data = reader.try_read_bytes(usize::from(data_length))?;
        let rssi = reader.try_read_i8()?;

        fields.push(HciField::new(
            format!("Report[{i}] Event Type"),
            format::legacy_advertising_event_type(event_type),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Address Type"),
            format::address_type(address_type),
        ));
        fields.push(HciField::new(format!("Report[{i}] Address"), format::bd_addr(address)));
        fields.push(HciField::new(
            format!("Report[{i}] Data Length"),
            data_length.to_string(),
        ));
        fields.push(HciField::new(format!("Report[{i}] Data"), format::hex_bytes(data)));
        fields.push(HciField::new(
            format!("Report[{i}] RSSI"),
            format::dbm_or_unavailable(rssi),
        ));
    }

    reader.finish()?;
    Some(fields)
}

// Subevent 0x0B
fn directed_advertising_report(
    subevent_code: u8,
    reader: &mut HciReader<'_>,
) -> Option<Vec<HciField>> {
    let num_reports = reader.try_read_u8()?;

    let mut fields = vec![
        HciField::new("Subevent Code", format::hex(subevent_code)),
        HciField::new("Num Reports", num_reports.to_string()),
    ];

    for i in 0..num_reports {
        let event_type = reader.try_read_u8()?;
        let address_type = reader.try_read_u8()?;
        let address = reader.try_read_bytes(6)?;
        let direct_address_type = reader.try_read_u8()?;
        let direct_address = reader.try_read_bytes(6)?;
        let rssi = reader.try_read_i8()?;

        fields.push(HciField::new(
            format!("Report[{i}] Event Type"),
            format::legacy_advertising_event_type(event_type),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Address Type"),
            format::address_type(address_type),
        ));
        fields.push(HciField::new(format!("Report[{i}] Address"), format::bd_addr(address)));
        fields.push(HciField::new(
            format!("Report[{i}] Direct Address Type"),
            format::address_type(direct_address_type),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Direct Address"),
            format::bd_addr(direct_address),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] RSSI"),
            format::dbm_or_unavailable(rssi),
        ));
    }

    reader.finish()?;
    Some(fields)
}

// Subevent 0x0D
fn extended_advertising_report(
    subevent_code: u8,
    reader: &mut HciReader<'_>,
) -> Option<Vec<HciField>> {
    let num_reports = reader.try_read_u8()?;

    let mut fields = vec![
        HciField::new("Subevent Code", format::hex(subevent_code)),
        HciField::new("Num Reports", num_reports.to_string()),
    ];

    for i in 0..num_reports {
        let event_type = reader.try_read_u16()?;
        let address_type = reader.try_read_u8()?;
        let address = reader.try_read_bytes(6)?;
        let primary_phy = reader.try_read_u8()?;
        let secondary_phy = reader.try_read_u8()?;
        let advertising_sid = reader.try_read_u8()?;
        let tx_power = reader.try_read_i8()?;
        let rssi = reader.try_read_i8()?;
        let periodic_interval = reader.try_read_u16()?;
        let direct_address_type = reader.try_read_u8()?;
        let direct_address = reader.try_read_bytes(6)?;
        let data_length = reader.try_read_u8()?;
        let data = reader.try_read_bytes(usize::from(data_length))?;

        fields.push(HciField::new(
            format!("Report[{i}] Event Type"),
            format::extended_advertising_event_type(event_type),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Address Type"),
            format::address_type(address_type),
        ));
        fields.push(HciField::new(format!("Report[{i}] Address"), format::bd_addr(address)));
        fields.push(HciField::new(
            format!("Report[{i}] Primary PHY"),
            format::primary_advertising_phy(primary_phy),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Secondary PHY"),
            format::secondary_advertising_phy(secondary_phy),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Advertising SID"),
            format::advertising_sid(advertising_sid),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] TX Power"),
            format::dbm_or_unavailable(tx_power),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] RSSI"),
            format::dbm_or_unavailable(rssi),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Periodic Advertising Interval"),
            format::periodic_advertising_interval(periodic_interval),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Direct Address Type"),
            format::direct_address_type(direct_address_type),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Direct Address"),
            format::bd_addr(direct_address),
        ));
        fields.push(HciField::new(
            format!("Report[{i}] Data Length"),
            data_length.to_string(),
        ));
        fields.push(HciField::new(format!("Report[{i}] Data"), format::hex_bytes(data)));
    }

    reader.finish()?;
    Some(fields)
}

// Subevent 0x11
fn scan_timeout(subevent_code: u8, reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    reader.finish()?;
    Some(vec![HciField::new("Subevent Code", format::hex(subevent_code))])
}

// Subevent 0x12
fn advertising_set_terminated(
    subevent_code: u8,
    reader: &mut HciReader<'_>,
) -> Option<Vec<HciField>> {
    let status = reader.try_read_u8()?;
    let advertising_handle = reader.try_read_u8()?;
    let connection_handle = reader.try_read_u16()?;
    let num_completed_events = reader.try_read_u8()?;
    reader.finish()?;

    Some(vec![
        HciField::new("Subevent Code", format::hex(subevent_code)),
        HciField::new("Status", format::hex(status)),
        HciField::new("Advertising Handle", format::hex(advertising_handle)),
        HciField::new("Connection Handle", format::hex16(connection_handle)),
        HciField::new(
            "Num Completed Extended Advertising Events",
            format::hex(num_completed_events),
        ),
    ])
}

// Subevent 0x13
fn scan_request_received(
    subevent_code: u8,
    reader: &mut HciReader<'_>,
) -> Option<Vec<HciField>> {
    let advertising_handle = reader.try_read_u8()?;
    let scanner_address_type = reader.try_read_u8()?;
    let scanner_address = reader.try_read_bytes(6)?;
    reader.finish()?;

    Some(vec![
        HciField::new("Subevent Code", format::hex(subevent_code)),
        HciField::new("Advertising Handle", format::hex(advertising_handle)),
        HciField::new("Scanner Address Type", format::address_type(scanner_address_type)),
        HciField::new("Scanner Address", format::bd_addr(scanner_address)),
    ])
}
