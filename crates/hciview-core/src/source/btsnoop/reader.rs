use time::OffsetDateTime;

use super::error::BtsnoopError;
use super::layout;

/// Validate the fixed 16-byte file header.
///
/// Only the H4 (HCI-over-UART) datalink is accepted; the other three
/// recognized codes are reported as unsupported rather than unknown.
pub(super) fn validate_file_header(header: &[u8; layout::FILE_HEADER_LEN]) -> Result<(), BtsnoopError> {
    if &header[layout::IDENTIFICATION_RANGE] != layout::IDENTIFICATION_PATTERN {
        return Err(BtsnoopError::BadIdentification);
    }

    let version = read_u32_be(&header[layout::VERSION_RANGE]);
    if version != layout::VERSION_NUMBER {
        return Err(BtsnoopError::UnsupportedVersion { version });
    }

    let datalink = read_u32_be(&header[layout::DATALINK_RANGE]);
    match datalink {
        layout::DATALINK_H4 => Ok(()),
        code => match datalink_name(code) {
            Some(name) => Err(BtsnoopError::UnsupportedDatalink { code, name }),
            None => Err(BtsnoopError::UnknownDatalink { code }),
        },
    }
}

pub(super) fn datalink_name(code: u32) -> Option<&'static str> {
    match code {
        layout::DATALINK_H1 => Some("H1"),
        layout::DATALINK_H4 => Some("H4"),
        layout::DATALINK_BSCP => Some("BSCP"),
        layout::DATALINK_H5 => Some("H5"),
        _ => None,
    }
}

pub(super) fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub(super) fn read_u64_be(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_be_bytes(raw)
}

/// Rebase a btsnoop timestamp onto the Unix epoch.
///
/// Exact to the microsecond; `None` when the value cannot represent a
/// calendar time (far out of range).
pub(crate) fn micros_to_utc(timestamp_micros: i64) -> Option<OffsetDateTime> {
    let unix_micros = timestamp_micros.checked_sub(layout::EPOCH_OFFSET_MICROS)?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix_micros) * 1_000).ok()
}

#[cfg(test)]
mod tests {
    use super::{datalink_name, micros_to_utc, validate_file_header};
    use crate::source::btsnoop::error::BtsnoopError;
    use crate::source::btsnoop::layout;
    use time::macros::datetime;

    fn header(version: u32, datalink: u32) -> [u8; layout::FILE_HEADER_LEN] {
        let mut bytes = [0u8; layout::FILE_HEADER_LEN];
        bytes[layout::IDENTIFICATION_RANGE].copy_from_slice(layout::IDENTIFICATION_PATTERN);
        bytes[layout::VERSION_RANGE].copy_from_slice(&version.to_be_bytes());
        bytes[layout::DATALINK_RANGE].copy_from_slice(&datalink.to_be_bytes());
        bytes
    }

    #[test]
    fn accepts_h4_header() {
        assert!(validate_file_header(&header(1, layout::DATALINK_H4)).is_ok());
    }

    #[test]
    fn rejects_bad_identification() {
        let mut bytes = header(1, layout::DATALINK_H4);
        bytes[0] = b'x';
        let err = validate_file_header(&bytes).unwrap_err();
        assert!(matches!(err, BtsnoopError::BadIdentification));
    }

    #[test]
    fn rejects_wrong_version() {
        let err = validate_file_header(&header(2, layout::DATALINK_H4)).unwrap_err();
        assert!(matches!(err, BtsnoopError::UnsupportedVersion { version: 2 }));
    }

    #[test]
    fn rejects_recognized_but_unsupported_datalink() {
        let err = validate_file_header(&header(1, layout::DATALINK_H1)).unwrap_err();
        assert!(matches!(
            err,
            BtsnoopError::UnsupportedDatalink { code: 1001, name: "H1" }
        ));
    }

    #[test]
    fn rejects_unknown_datalink() {
        let err = validate_file_header(&header(1, 999)).unwrap_err();
        assert!(matches!(err, BtsnoopError::UnknownDatalink { code: 999 }));
    }

    #[test]
    fn datalink_names() {
        assert_eq!(datalink_name(1001), Some("H1"));
        assert_eq!(datalink_name(1002), Some("H4"));
        assert_eq!(datalink_name(1003), Some("BSCP"));
        assert_eq!(datalink_name(1004), Some("H5"));
        assert_eq!(datalink_name(1005), None);
    }

    #[test]
    fn epoch_conversion_is_microsecond_exact() {
        let utc = micros_to_utc(0x00E3_1996_645E_2520).unwrap();
        assert_eq!(utc, datetime!(2025-08-08 23:57:12.9992 UTC));
    }

    #[test]
    fn epoch_conversion_out_of_range_is_none() {
        assert!(micros_to_utc(i64::MIN).is_none());
    }
}
