pub mod btsnoop;

pub use btsnoop::{BtsnoopError, BtsnoopReader};

use time::OffsetDateTime;

/// One raw record pulled from a capture container.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    /// Byte offset of the record header within the source stream.
    pub position: u64,
    /// Microseconds since the btsnoop epoch, as stored.
    pub timestamp_micros: i64,
    /// The raw H4 payload bytes.
    pub payload: Vec<u8>,
}

impl CaptureRecord {
    /// Capture time in UTC, exact to the microsecond.
    pub fn timestamp_utc(&self) -> Option<OffsetDateTime> {
        btsnoop::reader::micros_to_utc(self.timestamp_micros)
    }
}
