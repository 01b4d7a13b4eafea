pub const IDENTIFICATION_PATTERN: &[u8; 8] = b"btsnoop\0";
pub const VERSION_NUMBER: u32 = 1;

pub const IDENTIFICATION_RANGE: std::ops::Range<usize> = 0..8;
pub const VERSION_RANGE: std::ops::Range<usize> = 8..12;
pub const DATALINK_RANGE: std::ops::Range<usize> = 12..16;
pub const FILE_HEADER_LEN: usize = 16;

pub const ORIGINAL_LENGTH_RANGE: std::ops::Range<usize> = 0..4;
pub const INCLUDED_LENGTH_RANGE: std::ops::Range<usize> = 4..8;
pub const PACKET_FLAGS_RANGE: std::ops::Range<usize> = 8..12;
pub const CUMULATIVE_DROPS_RANGE: std::ops::Range<usize> = 12..16;
pub const TIMESTAMP_RANGE: std::ops::Range<usize> = 16..24;
pub const RECORD_HEADER_LEN: usize = 24;

pub const DATALINK_H1: u32 = 1001;
pub const DATALINK_H4: u32 = 1002;
pub const DATALINK_BSCP: u32 = 1003;
pub const DATALINK_H5: u32 = 1004;

/// Record timestamps count microseconds from the btsnoop epoch
/// (0000-01-01); this offset rebases them onto the Unix epoch.
pub const EPOCH_OFFSET_MICROS: i64 = 0x00DC_DDB3_0F2F_8000;
