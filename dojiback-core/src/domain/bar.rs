//! Bar — the fundamental market data unit.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One OHLCV record.
///
/// The timestamp carries the offset of the zone the data was converted into,
/// so calendar fields (weekday, date) read off it match that zone's wall clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any price field is NaN or infinite.
    pub fn has_non_finite_price(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Volume must be a finite, non-negative number.
    pub fn has_valid_volume(&self) -> bool {
        self.volume.is_finite() && self.volume >= 0.0
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    ///
    /// Not enforced by the engine (the Heiken-Ashi envelope holds regardless).
    /// The CSV loader counts and logs rows that fail it.
    pub fn is_sane(&self) -> bool {
        if self.has_non_finite_price() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
