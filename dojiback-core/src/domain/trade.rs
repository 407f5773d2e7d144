//! TradeRecord — one bracketed position, open or closed.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Trade direction. Also used as the trend read off the EMA filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

/// How a closed trade ended. Serialized as `1` (win) or `-1` (loss).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Outcome {
    Win,
    Loss,
}

impl From<Outcome> for i8 {
    fn from(outcome: Outcome) -> i8 {
        match outcome {
            Outcome::Win => 1,
            Outcome::Loss => -1,
        }
    }
}

impl TryFrom<i8> for Outcome {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Outcome::Win),
            -1 => Ok(Outcome::Loss),
            other => Err(format!("invalid trade outcome {other}, expected 1 or -1")),
        }
    }
}

/// A trade opened on an entry signal.
///
/// Exit fields stay `None` until the stop or target is hit. A record still
/// open at the end of the data is a valid terminal state and is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_time: DateTime<FixedOffset>,
    pub entry_price: f64,

    // ── Bracket ──
    pub risk: f64,
    pub stop_price: f64,
    pub take_profit_price: f64,

    // ── Exit ──
    pub exit_bar: Option<usize>,
    pub exit_time: Option<DateTime<FixedOffset>>,
    pub exit_price: Option<f64>,
    pub outcome: Option<Outcome>,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn is_winner(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    pub fn is_loser(&self) -> bool {
        self.outcome == Some(Outcome::Loss)
    }

    /// Close this record, consuming it. The closed record is final.
    pub fn close(
        mut self,
        exit_bar: usize,
        exit_time: DateTime<FixedOffset>,
        exit_price: f64,
        outcome: Outcome,
    ) -> Self {
        self.exit_bar = Some(exit_bar);
        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.outcome = Some(outcome);
        self
    }

    /// Bars between entry and exit, if closed.
    pub fn bars_held(&self) -> Option<usize> {
        self.exit_bar.map(|exit| exit - self.entry_bar)
    }
}
