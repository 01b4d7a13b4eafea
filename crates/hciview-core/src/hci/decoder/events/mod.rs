//! Event dispatch: event code selects the spec; 0x3E routes into the LE
//! Meta subevent table instead ([`le_meta`]).

pub(crate) mod le_meta;

use std::collections::HashMap;
use std::sync::LazyLock;

use super::format;
use super::{HciField, Spec};
use crate::hci::packet::HciOpcode;
use crate::hci::reader::HciReader;

static EVENTS: LazyLock<HashMap<u8, Spec>> = LazyLock::new(|| {
    HashMap::from([
        (0x0E, Spec::new("Command Complete", command_complete)),
        (0x0F, Spec::new("Command Status", command_status)),
    ])
});

pub(crate) fn lookup(event_code: u8) -> Option<&'static Spec> {
    EVENTS.get(&event_code)
}

// Event code 0x0E. Return parameters are command-specific; anything after
// Status is surfaced as one opaque hex field rather than rejected.
fn command_complete(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let num_packets = reader.try_read_u8()?;
    let opcode = HciOpcode::new(reader.try_read_u16()?);
    let status = reader.try_read_u8()?;

    let mut fields = vec![
        HciField::new("Num HCI Command Packets", num_packets.to_string()),
        HciField::new("Opcode", opcode.to_string()),
        HciField::new("Status", format::hex(status)),
    ];

    if !reader.is_empty() {
        let rest = reader.try_read_bytes(reader.remaining())?;
        fields.push(HciField::new("Return Parameters", format::hex_bytes(rest)));
    }

    Some(fields)
}

// Event code 0x0F
fn command_status(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    let status = reader.try_read_u8()?;
    let num_packets = reader.try_read_u8()?;
    let opcode = HciOpcode::new(reader.try_read_u16()?);
    reader.finish()?;

    Some(vec![
        HciField::new("Status", format::hex(status)),
        HciField::new("Num HCI Command Packets", num_packets.to_string()),
        HciField::new("Opcode", opcode.to_string()),
    ])
}
