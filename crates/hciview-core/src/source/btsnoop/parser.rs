use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::source::CaptureRecord;

use super::error::BtsnoopError;
use super::layout;
use super::reader::{read_u32_be, read_u64_be, validate_file_header};

/// Streaming btsnoop container reader over a seekable byte stream.
///
/// The file header is validated on construction; records are then pulled
/// one at a time with [`BtsnoopReader::next_record`]. The reader owns the
/// stream cursor for its whole lifetime and must be driven by a single
/// consumer.
pub struct BtsnoopReader<R> {
    stream: R,
    stream_len: u64,
    bytes_read: u64,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Box<dyn FnMut(u64) + Send>>,
}

impl<R: std::fmt::Debug> std::fmt::Debug for BtsnoopReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BtsnoopReader")
            .field("stream", &self.stream)
            .field("stream_len", &self.stream_len)
            .field("bytes_read", &self.bytes_read)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl BtsnoopReader<File> {
    pub fn open(path: &Path) -> Result<Self, BtsnoopError> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> BtsnoopReader<R> {
    pub fn new(mut stream: R) -> Result<Self, BtsnoopError> {
        let stream_len = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;

        if stream_len < layout::FILE_HEADER_LEN as u64 {
            return Err(BtsnoopError::TruncatedFileHeader);
        }

        let mut header = [0u8; layout::FILE_HEADER_LEN];
        stream.read_exact(&mut header)?;
        validate_file_header(&header)?;
        debug!(stream_len, "btsnoop header validated");

        Ok(Self {
            stream,
            stream_len,
            bytes_read: layout::FILE_HEADER_LEN as u64,
            cancel: None,
            progress: None,
        })
    }

    /// Install a cancellation flag, checked once per record.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Install a progress callback receiving total bytes consumed so far,
    /// invoked after each record. The reported value only ever grows.
    pub fn with_progress(mut self, callback: impl FnMut(u64) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Pull the next record, or `Ok(None)` at end of file.
    ///
    /// Any container-level inconsistency is fatal: the error ends the
    /// sequence and the stream cannot be resumed.
    pub fn next_record(&mut self) -> Result<Option<CaptureRecord>, BtsnoopError> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(BtsnoopError::Cancelled);
            }
        }

        let position = self.stream.stream_position()?;
        if position >= self.stream_len {
            return Ok(None);
        }

        let remaining = self.stream_len - position;
        if remaining < layout::RECORD_HEADER_LEN as u64 {
            return Err(BtsnoopError::TruncatedRecordHeader);
        }

        let mut header = [0u8; layout::RECORD_HEADER_LEN];
        self.stream.read_exact(&mut header)?;
        self.bytes_read += layout::RECORD_HEADER_LEN as u64;

        let original_length = read_u32_be(&header[layout::ORIGINAL_LENGTH_RANGE]);
        let included_length = read_u32_be(&header[layout::INCLUDED_LENGTH_RANGE]);
        if original_length < included_length {
            return Err(BtsnoopError::InvalidRecordLength {
                original: original_length,
                included: included_length,
            });
        }

        let payload_remaining = remaining - layout::RECORD_HEADER_LEN as u64;
        if u64::from(included_length) > payload_remaining {
            return Err(BtsnoopError::TruncatedRecordPayload {
                needed: u64::from(included_length),
                remaining: payload_remaining,
            });
        }

        let mut payload = vec![0u8; included_length as usize];
        self.stream.read_exact(&mut payload)?;
        self.bytes_read += u64::from(included_length);

        if let Some(callback) = &mut self.progress {
            callback(self.bytes_read);
        }

        let timestamp_micros = read_u64_be(&header[layout::TIMESTAMP_RANGE]) as i64;
        trace!(position, included_length, "btsnoop record");

        Ok(Some(CaptureRecord {
            position,
            timestamp_micros,
            payload,
        }))
    }
}
