//! Heiken-Ashi candle — the smoothed bar the strategy reads.

use serde::{Deserialize, Serialize};

/// One Heiken-Ashi candle, derived from the raw bar at the same index.
///
/// Envelope invariant: `low <= open, close <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeikenAshiBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl HeikenAshiBar {
    /// Close below open.
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }

    /// Close above open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    /// Exact equality: the high sits on the open.
    pub fn has_no_upper_wick(&self) -> bool {
        self.high == self.open
    }

    /// Exact equality: the low sits on the open.
    pub fn has_no_lower_wick(&self) -> bool {
        self.low == self.open
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Body as a fraction of the range. `None` for a zero-range candle.
    pub fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        if range == 0.0 {
            return None;
        }
        Some(self.body() / range)
    }
}
