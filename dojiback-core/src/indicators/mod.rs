//! Indicator engine: Heiken-Ashi candles and the EMA trend filter.
//!
//! Both series are recursive in their own previous value, so they are built
//! together in one forward pass before the trade loop and then queried by
//! bar index. No recomputation on each bar.

pub mod ema;
pub mod heiken_ashi;

pub use ema::{ema_of_series, Ema};
pub use heiken_ashi::{heiken_ashi, HeikenAshi};

use crate::domain::{Bar, HeikenAshiBar};

/// Precomputed per-bar values the pattern detector and simulator read.
///
/// All three vectors have the same length as the input bar series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    candles: Vec<HeikenAshiBar>,
    ema: Vec<f64>,
    volume: Vec<f64>,
}

impl IndicatorSet {
    /// Single forward pass: candle[t] then ema[t] over candle[t].close.
    pub fn compute(bars: &[Bar], ema_span: usize) -> Self {
        let mut ha = HeikenAshi::new();
        let mut trend = Ema::new(ema_span);

        let mut candles = Vec::with_capacity(bars.len());
        let mut ema = Vec::with_capacity(bars.len());
        let mut volume = Vec::with_capacity(bars.len());

        for bar in bars {
            let candle = ha.next(bar);
            ema.push(trend.next(candle.close));
            candles.push(candle);
            volume.push(bar.volume);
        }

        Self {
            candles,
            ema,
            volume,
        }
    }

    /// Assemble a set from hand-built series.
    #[cfg(test)]
    pub(crate) fn from_parts(candles: Vec<HeikenAshiBar>, ema: Vec<f64>, volume: Vec<f64>) -> Self {
        assert!(
            candles.len() == ema.len() && ema.len() == volume.len(),
            "indicator series length mismatch: candles={}, ema={}, volume={}",
            candles.len(),
            ema.len(),
            volume.len()
        );
        Self {
            candles,
            ema,
            volume,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candle(&self, index: usize) -> Option<&HeikenAshiBar> {
        self.candles.get(index)
    }

    pub fn ema(&self, index: usize) -> Option<f64> {
        self.ema.get(index).copied()
    }

    pub fn volume(&self, index: usize) -> Option<f64> {
        self.volume.get(index).copied()
    }

    pub fn candles(&self) -> &[HeikenAshiBar] {
        &self.candles
    }

    pub fn ema_series(&self) -> &[f64] {
        &self.ema
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volume
    }
}

/// Create a bar `i` minutes after a fixed UTC base time.
#[cfg(test)]
pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    use chrono::{Duration, FixedOffset, TimeZone};
    let base = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 2, 9, 30, 0)
        .unwrap();
    Bar {
        timestamp: base + Duration::minutes(i as i64),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
