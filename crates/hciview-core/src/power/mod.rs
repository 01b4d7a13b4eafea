//! Power-trace (telemetry) file parsing. Unrelated to the HCI pipeline;
//! shares only the workspace's error and I/O conventions.

pub mod error;
pub mod pt5;

pub use error::Pt5Error;
pub use pt5::{MISSING_CURRENT, Pt5Parser};

use time::OffsetDateTime;

/// Seam between the CLI and concrete power-trace formats.
pub trait PowerSampleSource {
    fn sample_count(&self) -> u64;

    /// Seconds between consecutive samples.
    fn period_seconds(&self) -> f64;

    /// Average main-channel current over the capture, in milliamps.
    fn average_current_ma(&self) -> f64;

    fn capture_date(&self) -> Option<OffsetDateTime>;

    fn timestamp_seconds(&self, index: u64) -> f64 {
        index as f64 * self.period_seconds()
    }

    /// Main-channel current in milliamps; `Ok(None)` for dropped samples.
    fn try_current_ma(&mut self, index: u64) -> Result<Option<f64>, Pt5Error>;

    /// Like [`Self::try_current_ma`], with dropped samples mapped to the
    /// [`MISSING_CURRENT`] sentinel.
    fn current_ma(&mut self, index: u64) -> Result<f64, Pt5Error> {
        Ok(self.try_current_ma(index)?.unwrap_or(MISSING_CURRENT))
    }
}
