//! Heiken-Ashi transform.
//!
//! close[t] = (open + high + low + close) / 4
//! open[0] = (open[0] + close[0]) / 2, open[t] = (open[t-1] + close[t-1]) / 2
//! high[t] = max(high, open[t], close[t]), low[t] = min(low, open[t], close[t])
//!
//! `open[t]` depends on the previous derived candle, so the transform is a
//! strict forward fold. No lookback: every index has a value.

use crate::domain::{Bar, HeikenAshiBar};

/// Streaming Heiken-Ashi accumulator carrying the previous derived candle.
#[derive(Debug, Clone, Default)]
pub struct HeikenAshi {
    prev: Option<HeikenAshiBar>,
}

impl HeikenAshi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the candle for the next bar in sequence.
    pub fn next(&mut self, bar: &Bar) -> HeikenAshiBar {
        let close = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        let open = match self.prev {
            None => (bar.open + bar.close) / 2.0,
            Some(prev) => (prev.open + prev.close) / 2.0,
        };
        let candle = HeikenAshiBar {
            open,
            high: bar.high.max(open).max(close),
            low: bar.low.min(open).min(close),
            close,
        };
        self.prev = Some(candle);
        candle
    }
}

/// Transform a full bar series. Empty in, empty out.
pub fn heiken_ashi(bars: &[Bar]) -> Vec<HeikenAshiBar> {
    let mut acc = HeikenAshi::new();
    bars.iter().map(|bar| acc.next(bar)).collect()
}
