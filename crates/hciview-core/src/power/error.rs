use thiserror::Error;

#[derive(Debug, Error)]
pub enum Pt5Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file too small to contain a PT5 header")]
    TruncatedHeader,
    #[error("invalid sample rate: 0 kHz")]
    InvalidSampleRate,
    #[error("sample index {index} out of range ({count} samples)")]
    IndexOutOfRange { index: u64, count: u64 },
}
