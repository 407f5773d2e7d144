//! Engine configuration, simulator state, and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;
use crate::patterns::DojiRule;

use super::validate::EngineError;

/// Default EMA span, also the default warm-up.
pub const DEFAULT_EMA_SPAN: usize = 100;

/// Target distance as a multiple of the stop distance (1:1 bracket).
pub const REWARD_MULTIPLE: f64 = 1.0;

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smoothing span of the trend EMA over Heiken-Ashi closes.
    pub ema_span: usize,
    /// First bar index the simulator scans. Earlier bars only feed indicators.
    pub warmup_bars: usize,
    /// Largest body/range fraction still counted as a doji.
    pub doji_body_ratio: f64,
    /// Bars of volume the doji bar must match or beat.
    pub volume_lookback: usize,
}

impl EngineConfig {
    /// Config with the given EMA span and a warm-up of the same length.
    pub fn with_span(ema_span: usize) -> Self {
        let rule = DojiRule::default();
        Self {
            ema_span,
            warmup_bars: ema_span,
            doji_body_ratio: rule.max_body_ratio,
            volume_lookback: rule.volume_lookback,
        }
    }

    pub fn doji_rule(&self) -> DojiRule {
        DojiRule {
            max_body_ratio: self.doji_body_ratio,
            volume_lookback: self.volume_lookback,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.ema_span == 0 {
            return Err(EngineError::InvalidConfig("ema_span must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.doji_body_ratio) {
            return Err(EngineError::InvalidConfig(format!(
                "doji_body_ratio must be within [0, 1], got {}",
                self.doji_body_ratio
            )));
        }
        if self.volume_lookback == 0 {
            return Err(EngineError::InvalidConfig(
                "volume_lookback must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_span(DEFAULT_EMA_SPAN)
    }
}

/// Simulator state between bars.
///
/// `InPosition` owns the single open record; it is handed back to the run
/// loop when it closes or when the data ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SimState {
    #[default]
    Flat,
    InPosition(TradeRecord),
}

impl SimState {
    pub fn is_flat(&self) -> bool {
        matches!(self, SimState::Flat)
    }

    pub fn open_trade(&self) -> Option<&TradeRecord> {
        match self {
            SimState::Flat => None,
            SimState::InPosition(trade) => Some(trade),
        }
    }
}

/// Output of one run: every trade opened, in entry order.
///
/// At most the last record can still be open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<TradeRecord>,
    pub bar_count: usize,
    pub warmup_bars: usize,
}

impl RunResult {
    pub fn open_trade(&self) -> Option<&TradeRecord> {
        self.trades.last().filter(|t| t.is_open())
    }
}
