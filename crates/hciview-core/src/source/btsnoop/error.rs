use thiserror::Error;

/// Errors raised while reading a btsnoop container.
///
/// All of these are fatal for the file being read: container integrity is
/// a precondition, so a bad header or a truncated record aborts the whole
/// sequence. Per-record malformation of the HCI payload itself is not an
/// error here; it surfaces later as an `Unknown`/`Invalid` decode status.
#[derive(Debug, Error)]
pub enum BtsnoopError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file too small to contain a btsnoop header")]
    TruncatedFileHeader,
    #[error("invalid identification pattern")]
    BadIdentification,
    #[error("unsupported btsnoop version: {version}")]
    UnsupportedVersion { version: u32 },
    #[error("unsupported datalink type: {code} ({name})")]
    UnsupportedDatalink { code: u32, name: &'static str },
    #[error("unknown datalink type: {code}")]
    UnknownDatalink { code: u32 },
    #[error("truncated packet record header")]
    TruncatedRecordHeader,
    #[error("record original length {original} smaller than included length {included}")]
    InvalidRecordLength { original: u32, included: u32 },
    #[error("truncated packet record payload: need {needed} bytes, got {remaining}")]
    TruncatedRecordPayload { needed: u64, remaining: u64 },
    #[error("read cancelled")]
    Cancelled,
}
