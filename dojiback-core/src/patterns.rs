//! Entry pattern predicates over the precomputed Heiken-Ashi series.
//!
//! Both predicates are pure: they read a fixed window of the indicator set and
//! return `false` when the window does not fit (too early in the series, or
//! out of range). Insufficient data is never an error.

use crate::domain::Direction;
use crate::indicators::IndicatorSet;

/// Number of candles before the signal bar that must form the pullback.
pub const PULLBACK_BARS: usize = 2;

/// Thresholds for the high-volume doji check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DojiRule {
    /// Largest body/range fraction still counted as a doji.
    pub max_body_ratio: f64,
    /// How many preceding bars the signal bar's volume must match or beat.
    pub volume_lookback: usize,
}

impl Default for DojiRule {
    fn default() -> Self {
        Self {
            max_body_ratio: 0.1,
            volume_lookback: 3,
        }
    }
}

/// Two candles against the trend immediately before `index`, with no wick
/// on the trend side.
///
/// Long: both red with `high == open`. Short: both green with `low == open`.
/// The candle at `index` itself is not inspected.
pub fn is_clean_pullback(indicators: &IndicatorSet, index: usize, direction: Direction) -> bool {
    if index < PULLBACK_BARS || index >= indicators.len() {
        return false;
    }
    let window = &indicators.candles()[index - PULLBACK_BARS..index];
    match direction {
        Direction::Long => window
            .iter()
            .all(|c| c.is_red() && c.has_no_upper_wick()),
        Direction::Short => window
            .iter()
            .all(|c| c.is_green() && c.has_no_lower_wick()),
    }
}

/// Doji-shaped candle at `index` on volume at least as high as each of the
/// preceding `rule.volume_lookback` bars.
///
/// A zero-range candle cannot be classified and returns `false`.
pub fn is_high_volume_doji(indicators: &IndicatorSet, index: usize, rule: &DojiRule) -> bool {
    if index < rule.volume_lookback {
        return false;
    }
    let Some(candle) = indicators.candle(index) else {
        return false;
    };
    let Some(body_ratio) = candle.body_ratio() else {
        return false;
    };
    if body_ratio > rule.max_body_ratio {
        return false;
    }

    let volumes = indicators.volumes();
    let current = volumes[index];
    volumes[index - rule.volume_lookback..index]
        .iter()
        .all(|&prev| current >= prev)
}
