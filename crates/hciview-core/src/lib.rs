//! hciview core library for post-mortem HCI capture analysis.
//!
//! This crate implements the offline pipeline used by the CLI: the btsnoop
//! container source feeds raw records to the packet classifier, which
//! drives the dispatch-table decoder (reader/packet/parser/decoder) into
//! named field lists. Parsing is byte-oriented and side-effect free; all
//! I/O is isolated in `source` and `power`. Wire conventions live in
//! `layout` modules so parsers and decode routines never index bytes
//! directly.
//!
//! Invariants:
//! - Container corruption is fatal; malformed packets inside an intact
//!   container never are.
//! - A packet decodes as `Success` only when its declared parameter
//!   length is consumed byte-exactly.
//! - Dispatch tables are static; extension adds entries, not control flow.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use hciview_core::summarize_btsnoop_file;
//!
//! let summary = summarize_btsnoop_file(Path::new("capture.log"))?;
//! println!("records: {}", summary.record_count);
//! # Ok::<(), hciview_core::BtsnoopError>(())
//! ```

use std::io::{Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

pub mod hci;
pub mod power;
pub mod source;

pub use hci::{
    DecodeStatus, DecodedResult, HciCommandPacket, HciDecoder, HciEventCode, HciEventPacket,
    HciField, HciOpcode, HciPacket, HciPacketType, HciUnknownPacket, UnknownVendorDecoder,
    VendorDecoder, parse_packet,
};
pub use power::{PowerSampleSource, Pt5Error, Pt5Parser};
pub use source::{BtsnoopError, BtsnoopReader, CaptureRecord};

/// Classify and decode one record's payload.
///
/// This is the composed per-record entry point: callers pull records from
/// a [`BtsnoopReader`] and feed each through here, incrementally or to
/// exhaustion. The decoder borrows the payload only for the duration of
/// the call; the returned result owns its strings.
pub fn decode_record(decoder: &HciDecoder, record: &CaptureRecord) -> DecodedResult {
    decoder.decode(&parse_packet(&record.payload))
}

/// Whole-capture classification summary in file order.
///
/// # Examples
/// ```
/// let summary = hciview_core::HciSummary::default();
/// assert_eq!(summary.record_count, 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HciSummary {
    /// Total records in the container.
    pub record_count: u64,
    /// Sum of record payload sizes in bytes.
    pub total_payload_bytes: u64,
    /// RFC3339 timestamp of the first record (if representable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_first: Option<String>,
    /// RFC3339 timestamp of the last record (if representable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_last: Option<String>,
    /// Microseconds between the first and last record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_micros: Option<i64>,
    /// Command packet count.
    pub commands: u64,
    /// Event packet count.
    pub events: u64,
    /// ACL packet count.
    pub acl: u64,
    /// SCO packet count.
    pub sco: u64,
    /// ISO packet count.
    pub iso: u64,
    /// Records whose payload failed classification.
    pub unknown: u64,
}

/// Read a btsnoop file and classify every record.
pub fn summarize_btsnoop_file(path: &Path) -> Result<HciSummary, BtsnoopError> {
    let mut reader = BtsnoopReader::open(path)?;
    summarize_records(&mut reader)
}

/// Classify every remaining record of an open reader.
pub fn summarize_records<R: Read + Seek>(
    reader: &mut BtsnoopReader<R>,
) -> Result<HciSummary, BtsnoopError> {
    let mut summary = HciSummary::default();
    let mut first_micros = None;
    let mut last_micros = None;

    while let Some(record) = reader.next_record()? {
        if summary.record_count == 0 {
            first_micros = Some(record.timestamp_micros);
            summary.time_first = ts_to_rfc3339(&record);
        }
        last_micros = Some(record.timestamp_micros);
        summary.time_last = ts_to_rfc3339(&record);

        summary.record_count += 1;
        summary.total_payload_bytes += record.payload.len() as u64;

        match parse_packet(&record.payload) {
            HciPacket::Command(_) => summary.commands += 1,
            HciPacket::Event(_) => summary.events += 1,
            HciPacket::Acl(_) => summary.acl += 1,
            HciPacket::Sco(_) => summary.sco += 1,
            HciPacket::Iso(_) => summary.iso += 1,
            HciPacket::Unknown(_) => summary.unknown += 1,
        }
    }

    summary.duration_micros = match (first_micros, last_micros) {
        (Some(first), Some(last)) => Some(last - first),
        _ => None,
    };
    Ok(summary)
}

fn ts_to_rfc3339(record: &CaptureRecord) -> Option<String> {
    record
        .timestamp_utc()
        .and_then(|utc| utc.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{BtsnoopReader, HciDecoder, decode_record, summarize_records};
    use crate::hci::DecodeStatus;
    use crate::source::btsnoop::layout;

    fn container(payloads: &[&[u8]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(layout::IDENTIFICATION_PATTERN);
        bytes.extend_from_slice(&layout::VERSION_NUMBER.to_be_bytes());
        bytes.extend_from_slice(&layout::DATALINK_H4.to_be_bytes());

        for (i, payload) in payloads.iter().enumerate() {
            bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&0u32.to_be_bytes());
            bytes.extend_from_slice(&0u32.to_be_bytes());
            let micros = layout::EPOCH_OFFSET_MICROS as u64 + i as u64 * 1_000;
            bytes.extend_from_slice(&micros.to_be_bytes());
            bytes.extend_from_slice(payload);
        }
        bytes
    }

    #[test]
    fn summarize_counts_by_kind() {
        let data = container(&[
            &[0x01, 0x03, 0x0C, 0x00],
            &[0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x00],
            &[0x02, 0x10, 0x20],
            &[0x06, 0xAA],
        ]);
        let mut reader = BtsnoopReader::new(Cursor::new(data)).unwrap();
        let summary = summarize_records(&mut reader).unwrap();

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.commands, 1);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.acl, 1);
        assert_eq!(summary.sco, 0);
        assert_eq!(summary.iso, 0);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.total_payload_bytes, 4 + 7 + 3 + 2);
        assert_eq!(summary.duration_micros, Some(3_000));
        assert_eq!(summary.time_first.as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn summary_json_omits_absent_timestamps() {
        let summary = super::HciSummary::default();
        let value = serde_json::to_value(&summary).expect("summary json");
        assert!(value.get("time_first").is_none());
        assert!(value.get("time_last").is_none());
        assert!(value.get("duration_micros").is_none());
        assert_eq!(value["record_count"], 0);
    }

    #[test]
    fn decode_record_composes_pipeline() {
        let data = container(&[&[0x01, 0x01, 0x10, 0x00]]);
        let mut reader = BtsnoopReader::new(Cursor::new(data)).unwrap();
        let record = reader.next_record().unwrap().unwrap();

        let decoder = HciDecoder::new();
        let decoded = decode_record(&decoder, &record);
        assert_eq!(decoded.status, DecodeStatus::Success);
        assert_eq!(decoded.name, "Read Local Version Information");
    }
}
