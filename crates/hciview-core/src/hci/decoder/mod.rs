//! Dispatch-table-driven field decoding for classified HCI packets.
//!
//! Layering mirrors the rest of the crate:
//! - `commands` / `events`: static code-to-spec tables plus the per-code
//!   decode routines (pure, cursor-driven, no I/O)
//! - `format`: display formatting for field values
//! - `vendor`: the pluggable vendor-decoder seam
//!
//! Decode routines return `Option<Vec<HciField>>`: `None` marks a packet
//! whose parameters do not match the expected shape (status `Invalid`),
//! including any trailing unconsumed bytes. Lookup misses produce status
//! `Unknown`. Routines never panic on malformed parameters.

pub mod commands;
pub mod events;
pub(crate) mod format;
pub mod vendor;

use serde::Serialize;

use super::packet::{HciCommandPacket, HciEventPacket, HciPacket};
use super::reader::HciReader;
use vendor::{UnknownVendorDecoder, VendorDecoder};

/// Outcome class of one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStatus {
    /// Recognized and byte-exactly well-formed.
    Success,
    /// Recognized, but the parameters do not match the expected shape.
    Invalid,
    /// No decode rule matches the code.
    Unknown,
}

/// One decoded field as a display name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HciField {
    pub name: String,
    pub value: String,
}

impl HciField {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result of decoding one command or event packet.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedResult {
    pub name: String,
    pub status: DecodeStatus,
    pub fields: Vec<HciField>,
}

impl DecodedResult {
    pub(crate) fn success(name: impl Into<String>, fields: Vec<HciField>) -> Self {
        Self {
            name: name.into(),
            status: DecodeStatus::Success,
            fields,
        }
    }

    pub(crate) fn invalid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DecodeStatus::Invalid,
            fields: Vec::new(),
        }
    }

    pub(crate) fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DecodeStatus::Unknown,
            fields: Vec::new(),
        }
    }
}

/// Decode routine signature shared by all dispatch tables.
pub(crate) type DecodeFn = fn(&mut HciReader<'_>) -> Option<Vec<HciField>>;

/// Table entry: display name plus the decode routine for one code.
pub(crate) struct Spec {
    pub name: &'static str,
    pub decode: DecodeFn,
}

impl Spec {
    pub(crate) const fn new(name: &'static str, decode: DecodeFn) -> Self {
        Self { name, decode }
    }

    fn run(&self, parameters: &[u8]) -> DecodedResult {
        let mut reader = HciReader::new(parameters);
        match (self.decode)(&mut reader) {
            Some(fields) => DecodedResult::success(self.name, fields),
            None => DecodedResult::invalid(self.name),
        }
    }
}

/// Stateless decoder over the static dispatch tables, with a pluggable
/// vendor decoder for OGF 0x3F commands and event code 0xFF.
pub struct HciDecoder {
    vendor: Box<dyn VendorDecoder>,
}

impl HciDecoder {
    pub fn new() -> Self {
        Self::with_vendor(Box::new(UnknownVendorDecoder))
    }

    pub fn with_vendor(vendor: Box<dyn VendorDecoder>) -> Self {
        Self { vendor }
    }

    pub fn decode(&self, packet: &HciPacket<'_>) -> DecodedResult {
        match packet {
            HciPacket::Command(command) => self.decode_command(command),
            HciPacket::Event(event) => self.decode_event(event),
            _ => DecodedResult::unknown("Unknown packet type"),
        }
    }

    pub fn decode_command(&self, packet: &HciCommandPacket<'_>) -> DecodedResult {
        if packet.opcode.is_vendor_specific() {
            return self.vendor.decode_command(packet);
        }

        match commands::lookup(packet.opcode.ogf(), packet.opcode.ocf()) {
            Some(spec) => spec.run(packet.parameters),
            None => DecodedResult::unknown("Unknown"),
        }
    }

    pub fn decode_event(&self, packet: &HciEventPacket<'_>) -> DecodedResult {
        if packet.event_code.is_vendor_specific() {
            return self.vendor.decode_event(packet);
        }

        if packet.event_code.value() == crate::hci::layout::LE_META_EVENT_CODE {
            return events::le_meta::decode(packet.parameters);
        }

        match events::lookup(packet.event_code.value()) {
            Some(spec) => spec.run(packet.parameters),
            None => DecodedResult::unknown("Unknown"),
        }
    }
}

impl Default for HciDecoder {
    fn default() -> Self {
        Self::new()
    }
}
