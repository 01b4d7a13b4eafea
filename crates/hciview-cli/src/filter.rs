//! Command/event filtering for `hci filter`: hand-entered sets plus the
//! predefined presets.

use std::collections::HashSet;

use hciview_core::{HciEventPacket, HciOpcode};

/// Populated sub-filters AND together; an empty spec matches nothing.
#[derive(Debug, Default, Clone)]
pub(crate) struct FilterSpec {
    pub ogfs: HashSet<u8>,
    pub ocfs: HashSet<u16>,
    pub opcodes: HashSet<u16>,
    pub event_codes: HashSet<u8>,
    pub le_subevents: HashSet<u8>,
    pub vendor_event_codes: HashSet<u16>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        !self.has_command_filters() && !self.has_event_filters()
    }

    pub fn has_command_filters(&self) -> bool {
        !self.ogfs.is_empty() || !self.ocfs.is_empty() || !self.opcodes.is_empty()
    }

    pub fn has_event_filters(&self) -> bool {
        !self.event_codes.is_empty()
            || !self.le_subevents.is_empty()
            || !self.vendor_event_codes.is_empty()
    }

    pub fn merge(mut self, other: FilterSpec) -> FilterSpec {
        self.ogfs.extend(other.ogfs);
        self.ocfs.extend(other.ocfs);
        self.opcodes.extend(other.opcodes);
        self.event_codes.extend(other.event_codes);
        self.le_subevents.extend(other.le_subevents);
        self.vendor_event_codes.extend(other.vendor_event_codes);
        self
    }

    pub fn matches_command(&self, opcode: HciOpcode) -> bool {
        if !self.has_command_filters() {
            return false;
        }
        if !self.ogfs.is_empty() && !self.ogfs.contains(&opcode.ogf()) {
            return false;
        }
        if !self.ocfs.is_empty() && !self.ocfs.contains(&opcode.ocf()) {
            return false;
        }
        if !self.opcodes.is_empty() && !self.opcodes.contains(&opcode.value()) {
            return false;
        }
        true
    }

    pub fn matches_event(&self, packet: &HciEventPacket<'_>) -> bool {
        if !self.has_event_filters() {
            return false;
        }
        if !self.event_codes.is_empty() && !self.event_codes.contains(&packet.event_code.value()) {
            return false;
        }

        if !self.le_subevents.is_empty() {
            if packet.event_code.value() != 0x3E {
                return false;
            }
            let Some(&subevent) = packet.parameters.first() else {
                return false;
            };
            if !self.le_subevents.contains(&subevent) {
                return false;
            }
        }

        if !self.vendor_event_codes.is_empty() {
            if !packet.event_code.is_vendor_specific() {
                return false;
            }
            let Some(bytes) = packet.parameters.get(0..2) else {
                return false;
            };
            let vendor_event_code = u16::from_le_bytes([bytes[0], bytes[1]]);
            if !self.vendor_event_codes.contains(&vendor_event_code) {
                return false;
            }
        }

        true
    }
}

pub(crate) struct FilterSet {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub spec: FilterSpec,
}

/// Predefined presets selected with `--set`.
pub(crate) fn preset(id: u32) -> Option<FilterSet> {
    match id {
        1 => Some(FilterSet {
            id,
            name: "le-adv-scan",
            description:
                "LE legacy + extended advertising/scan commands and related LE Meta subevents.",
            spec: FilterSpec {
                ogfs: HashSet::from([0x08]),
                ocfs: HashSet::from([
                    0x0006, // LE Set Advertising Parameters
                    0x0007, // LE Read Advertising Physical Channel Tx Power
                    0x0008, // LE Set Advertising Data
                    0x0009, // LE Set Scan Response Data
                    0x000A, // LE Set Advertising Enable
                    0x000B, // LE Set Scan Parameters
                    0x000C, // LE Set Scan Enable
                    0x0035, // LE Set Advertising Set Random Address
                    0x0036, // LE Set Extended Advertising Parameters [v1]
                    0x0037, // LE Set Extended Advertising Data
                    0x0038, // LE Set Extended Scan Response Data
                    0x0039, // LE Set Extended Advertising Enable
                    0x003A, // LE Read Maximum Advertising Data Length
                    0x003B, // LE Read Number of Supported Advertising Sets
                    0x003C, // LE Remove Advertising Set
                    0x003D, // LE Clear Advertising Sets
                    0x0041, // LE Set Extended Scan Parameters
                    0x0042, // LE Set Extended Scan Enable
                    0x007F, // LE Set Extended Advertising Parameters [v2]
                ]),
                opcodes: HashSet::new(),
                event_codes: HashSet::from([0x3E]),
                le_subevents: HashSet::from([0x02, 0x0B, 0x0D, 0x11, 0x12, 0x13]),
                vendor_event_codes: HashSet::new(),
            },
        }),
        _ => None,
    }
}

pub(crate) fn describe_known_sets() -> String {
    "1:le-adv-scan".to_string()
}

/// Parse a comma-separated list of hex values ("0x04,0x08" or "04").
pub(crate) fn parse_hex_list<T>(input: &str, label: &str) -> Result<HashSet<T>, String>
where
    T: TryFrom<u32> + std::hash::Hash + Eq,
{
    let mut values = HashSet::new();
    for item in input.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let digits = item
            .strip_prefix("0x")
            .or_else(|| item.strip_prefix("0X"))
            .unwrap_or(item);
        let raw = u32::from_str_radix(digits, 16)
            .map_err(|_| format!("invalid {label} value '{item}'"))?;
        let value =
            T::try_from(raw).map_err(|_| format!("{label} value '{item}' out of range"))?;
        values.insert(value);
    }
    if values.is_empty() {
        return Err(format!("--{label} must list at least one hex value"));
    }
    Ok(values)
}
