use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::SluiceError;

/// Query range `[start, end)` passed to every partner in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, requiring `end > start`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SluiceError> {
        if end <= start {
            return Err(SluiceError::InvalidArg(format!(
                "time window end ({end}) must be after start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of length `lookback` ending at `end`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `lookback` is zero or out of range.
    pub fn ending_at(end: DateTime<Utc>, lookback: std::time::Duration) -> Result<Self, SluiceError> {
        let lookback = Duration::from_std(lookback)
            .map_err(|e| SluiceError::InvalidArg(format!("invalid lookback: {e}")))?;
        let start = end.checked_sub_signed(lookback).ok_or_else(|| {
            SluiceError::InvalidArg(format!("lookback of {lookback} before {end} is out of range"))
        })?;
        Self::new(start, end)
    }

    /// Inclusive start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True when `ts` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}
