//! Two-tier command dispatch: OGF selects a group table, OCF selects the
//! command spec within it. Supporting a new command means adding one table
//! entry; control flow never changes.

mod informational;
mod le_controller;

use std::collections::HashMap;
use std::sync::LazyLock;

use super::{HciField, Spec};
use crate::hci::reader::HciReader;

type CommandTable = HashMap<u16, Spec>;

static GROUPS: LazyLock<HashMap<u8, CommandTable>> = LazyLock::new(|| {
    HashMap::from([
        (0x04, informational::table()),
        (0x08, le_controller::table()),
    ])
});

pub(crate) fn lookup(ogf: u8, ocf: u16) -> Option<&'static Spec> {
    GROUPS.get(&ogf)?.get(&ocf)
}

/// Shared routine for commands that carry no parameters at all.
pub(super) fn no_params(reader: &mut HciReader<'_>) -> Option<Vec<HciField>> {
    reader.finish()?;
    Some(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::lookup;

    #[test]
    fn lookup_hits_registered_groups() {
        assert_eq!(lookup(0x04, 0x0001).map(|s| s.name), Some("Read Local Version Information"));
        assert_eq!(lookup(0x08, 0x000C).map(|s| s.name), Some("LE Set Scan Enable"));
    }

    #[test]
    fn lookup_misses_are_none() {
        assert!(lookup(0x3D, 0x0001).is_none());
        assert!(lookup(0x04, 0x03FF).is_none());
        assert!(lookup(0x08, 0x0000).is_none());
    }
}
