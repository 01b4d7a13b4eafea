//! PT5 power-trace files: a fixed-layout header and status block followed
//! by a dense array of per-sample current readings.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use time::OffsetDateTime;
use tracing::debug;

use super::PowerSampleSource;
use super::error::Pt5Error;

const HEADER_OFFSET: u64 = 0;
const STATUS_OFFSET: u64 = 272;
const SAMPLE_OFFSET: u64 = 1024;

const CAPTURE_DATE_OFFSET: u64 = HEADER_OFFSET + 28;
const CAPTURE_MASK_OFFSET: u64 = HEADER_OFFSET + 158;
const CURRENT_ACCUMULATOR_OFFSET: u64 = HEADER_OFFSET + 180;
const SAMPLE_RATE_OFFSET: u64 = STATUS_OFFSET + 28;

const CHAN_MAIN: u16 = 0x1000;
const CHAN_USB: u16 = 0x2000;
const CHAN_AUX: u16 = 0x4000;

/// Raw current value marking a dropped sample (0x8001 as a signed 16-bit
/// quantity, widened to the stored i32).
const MISSING_RAW_CURRENT: i32 = -32767;

/// Value returned by [`PowerSampleSource::current_ma`] for dropped samples.
pub const MISSING_CURRENT: f64 = MISSING_RAW_CURRENT as f64;

/// .NET binary DateTime: ticks since 0001-01-01 in the low 62 bits.
const DOTNET_TICKS_MASK: i64 = 0x3FFF_FFFF_FFFF_FFFF;
const DOTNET_UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

#[derive(Debug)]
struct CachedSample {
    index: u64,
    missing: bool,
    main_current: f64,
}

/// Random-access PT5 parser over a seekable stream.
#[derive(Debug)]
pub struct Pt5Parser<R> {
    stream: R,
    capture_date: Option<OffsetDateTime>,
    sample_count: u64,
    average_current: f64,
    seconds_per_sample: f64,
    bytes_per_sample: u64,
    main_present: bool,
    usb_present: bool,
    aux_present: bool,
    cached: Option<CachedSample>,
}

impl Pt5Parser<File> {
    pub fn open(path: &Path) -> Result<Self, Pt5Error> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> Pt5Parser<R> {
    pub fn new(mut stream: R) -> Result<Self, Pt5Error> {
        let stream_len = stream.seek(SeekFrom::End(0))?;
        if stream_len < SAMPLE_OFFSET {
            return Err(Pt5Error::TruncatedHeader);
        }

        stream.seek(SeekFrom::Start(CAPTURE_DATE_OFFSET))?;
        let capture_date = dotnet_binary_datetime(read_i64_le(&mut stream)?);

        stream.seek(SeekFrom::Start(CAPTURE_MASK_OFFSET))?;
        let capture_mask = read_u16_le(&mut stream)?;
        let sample_count = read_u64_le(&mut stream)?;
        let missing_count = read_u64_le(&mut stream)?;

        stream.seek(SeekFrom::Start(CURRENT_ACCUMULATOR_OFFSET))?;
        let accumulator = f64::from(read_f32_le(&mut stream)?);
        let average_current = accumulator / sample_count.saturating_sub(missing_count).max(1) as f64;

        stream.seek(SeekFrom::Start(SAMPLE_RATE_OFFSET))?;
        let sample_rate_khz = read_u8(&mut stream)?;
        if sample_rate_khz == 0 {
            return Err(Pt5Error::InvalidSampleRate);
        }
        let seconds_per_sample = 1.0 / (1000.0 * f64::from(sample_rate_khz));

        let main_present = capture_mask & CHAN_MAIN != 0;
        let usb_present = capture_mask & CHAN_USB != 0;
        let aux_present = capture_mask & CHAN_AUX != 0;

        // Voltage (u16) is always recorded; each enabled channel adds a
        // 4-byte raw current.
        let mut bytes_per_sample = 2u64;
        for present in [main_present, usb_present, aux_present] {
            if present {
                bytes_per_sample += 4;
            }
        }

        debug!(sample_count, sample_rate_khz, "pt5 header parsed");

        Ok(Self {
            stream,
            capture_date,
            sample_count,
            average_current,
            seconds_per_sample,
            bytes_per_sample,
            main_present,
            usb_present,
            aux_present,
            cached: None,
        })
    }

    fn load_sample(&mut self, index: u64) -> Result<(), Pt5Error> {
        if index >= self.sample_count {
            return Err(Pt5Error::IndexOutOfRange {
                index,
                count: self.sample_count,
            });
        }

        self.stream
            .seek(SeekFrom::Start(SAMPLE_OFFSET + self.bytes_per_sample * index))?;

        let mut missing = false;
        let mut main_current = 0.0;

        // Channels are stored Main, USB, Aux; raw values are microamps.
        if self.main_present {
            let raw = read_i32_le(&mut self.stream)?;
            missing = missing || raw == MISSING_RAW_CURRENT;
            if !missing {
                main_current = f64::from(raw) / 1000.0;
            }
        }
        if self.usb_present {
            let raw = read_i32_le(&mut self.stream)?;
            missing = missing || raw == MISSING_RAW_CURRENT;
        }
        if self.aux_present {
            let raw = read_i32_le(&mut self.stream)?;
            missing = missing || raw == MISSING_RAW_CURRENT;
        }

        self.cached = Some(CachedSample {
            index,
            missing,
            main_current,
        });
        Ok(())
    }
}

impl<R: Read + Seek> PowerSampleSource for Pt5Parser<R> {
    fn sample_count(&self) -> u64 {
        self.sample_count
    }

    fn period_seconds(&self) -> f64 {
        self.seconds_per_sample
    }

    fn average_current_ma(&self) -> f64 {
        self.average_current
    }

    fn capture_date(&self) -> Option<OffsetDateTime> {
        self.capture_date
    }

    fn try_current_ma(&mut self, index: u64) -> Result<Option<f64>, Pt5Error> {
        let cached_hit = matches!(&self.cached, Some(cached) if cached.index == index);
        if !cached_hit {
            self.load_sample(index)?;
        }

        Ok(self
            .cached
            .as_ref()
            .filter(|cached| !cached.missing)
            .map(|cached| cached.main_current))
    }
}

fn dotnet_binary_datetime(raw: i64) -> Option<OffsetDateTime> {
    let ticks = raw & DOTNET_TICKS_MASK;
    let unix_ticks = ticks.checked_sub(DOTNET_UNIX_EPOCH_TICKS)?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix_ticks) * 100).ok()
}

fn read_u8<R: Read>(stream: &mut R) -> std::io::Result<u8> {
    let mut buf = [0u8; 1];
    stream.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16_le<R: Read>(stream: &mut R) -> std::io::Result<u16> {
    let mut buf = [0u8; 2];
    stream.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_i32_le<R: Read>(stream: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32_le<R: Read>(stream: &mut R) -> std::io::Result<f32> {
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_i64_le<R: Read>(stream: &mut R) -> std::io::Result<i64> {
    let mut buf = [0u8; 8];
    stream.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_u64_le<R: Read>(stream: &mut R) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    stream.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{
        CAPTURE_DATE_OFFSET, CAPTURE_MASK_OFFSET, CHAN_MAIN, CURRENT_ACCUMULATOR_OFFSET,
        DOTNET_UNIX_EPOCH_TICKS, MISSING_CURRENT, Pt5Parser, SAMPLE_OFFSET, SAMPLE_RATE_OFFSET,
    };
    use crate::power::PowerSampleSource;
    use crate::power::error::Pt5Error;
    use time::macros::datetime;

    fn fixture(samples: &[i32]) -> Vec<u8> {
        let mut bytes = vec![0u8; SAMPLE_OFFSET as usize];

        // 2025-01-01 00:00:00 UTC in .NET ticks.
        let ticks = DOTNET_UNIX_EPOCH_TICKS + 1_735_689_600 * 10_000_000;
        bytes[CAPTURE_DATE_OFFSET as usize..CAPTURE_DATE_OFFSET as usize + 8]
            .copy_from_slice(&ticks.to_le_bytes());

        bytes[CAPTURE_MASK_OFFSET as usize..CAPTURE_MASK_OFFSET as usize + 2]
            .copy_from_slice(&CHAN_MAIN.to_le_bytes());
        let count = samples.len() as u64;
        bytes[CAPTURE_MASK_OFFSET as usize + 2..CAPTURE_MASK_OFFSET as usize + 10]
            .copy_from_slice(&count.to_le_bytes());
        let missing = samples.iter().filter(|&&raw| raw == -32767).count() as u64;
        bytes[CAPTURE_MASK_OFFSET as usize + 10..CAPTURE_MASK_OFFSET as usize + 18]
            .copy_from_slice(&missing.to_le_bytes());

        let accumulator: f32 = samples
            .iter()
            .filter(|&&raw| raw != -32767)
            .map(|&raw| raw as f32 / 1000.0)
            .sum();
        bytes[CURRENT_ACCUMULATOR_OFFSET as usize..CURRENT_ACCUMULATOR_OFFSET as usize + 4]
            .copy_from_slice(&accumulator.to_le_bytes());

        bytes[SAMPLE_RATE_OFFSET as usize] = 5; // 5 kHz

        for raw in samples {
            bytes.extend_from_slice(&raw.to_le_bytes());
            bytes.extend_from_slice(&0u16.to_le_bytes()); // voltage, unread
        }
        bytes
    }

    #[test]
    fn parses_header_fields() {
        let parser = Pt5Parser::new(Cursor::new(fixture(&[1000, 2000]))).unwrap();
        assert_eq!(parser.sample_count(), 2);
        assert!((parser.period_seconds() - 0.0002).abs() < 1e-12);
        assert!((parser.average_current_ma() - 1.5).abs() < 1e-6);
        assert_eq!(parser.capture_date(), Some(datetime!(2025-01-01 00:00:00 UTC)));
    }

    #[test]
    fn reads_samples_in_milliamps() {
        let mut parser = Pt5Parser::new(Cursor::new(fixture(&[1000, 2500, 500]))).unwrap();
        assert_eq!(parser.try_current_ma(0).unwrap(), Some(1.0));
        assert_eq!(parser.try_current_ma(1).unwrap(), Some(2.5));
        assert_eq!(parser.try_current_ma(2).unwrap(), Some(0.5));
        // Re-reading the cached sample does not reseek.
        assert_eq!(parser.try_current_ma(2).unwrap(), Some(0.5));
    }

    #[test]
    fn missing_sample_sentinel() {
        let mut parser = Pt5Parser::new(Cursor::new(fixture(&[1000, -32767]))).unwrap();
        assert_eq!(parser.try_current_ma(1).unwrap(), None);
        assert_eq!(parser.current_ma(1).unwrap(), MISSING_CURRENT);
    }

    #[test]
    fn timestamp_scales_with_sample_rate() {
        let parser = Pt5Parser::new(Cursor::new(fixture(&[1000]))).unwrap();
        assert!((parser.timestamp_seconds(5) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn index_out_of_range_errors() {
        let mut parser = Pt5Parser::new(Cursor::new(fixture(&[1000]))).unwrap();
        let err = parser.try_current_ma(1).unwrap_err();
        assert!(matches!(err, Pt5Error::IndexOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let err = Pt5Parser::new(Cursor::new(vec![0u8; 512])).unwrap_err();
        assert!(matches!(err, Pt5Error::TruncatedHeader));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let mut bytes = fixture(&[1000]);
        bytes[SAMPLE_RATE_OFFSET as usize] = 0;
        let err = Pt5Parser::new(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Pt5Error::InvalidSampleRate));
    }
}
