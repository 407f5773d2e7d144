//! Summary statistics over a run's trade records.
//!
//! Open trades count toward `total_trades` and `open_trades` only. They have
//! no outcome, so they are neither wins nor losses and never land in
//! `best_days`.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use dojiback_core::domain::TradeRecord;

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub open_trades: usize,
    /// `wins / max(losses, 1)`.
    pub risk_reward: f64,
    /// Winning trades per entry weekday (full English name).
    pub best_days: BTreeMap<String, usize>,
}

/// Summarize a trade list. `None` when there are no records at all.
pub fn summarize(trades: &[TradeRecord]) -> Option<Summary> {
    if trades.is_empty() {
        return None;
    }

    let mut wins = 0;
    let mut losses = 0;
    let mut open_trades = 0;
    let mut best_days: BTreeMap<String, usize> = BTreeMap::new();

    for trade in trades {
        if trade.is_winner() {
            wins += 1;
            *best_days
                .entry(weekday_name(trade.entry_time.weekday()).to_string())
                .or_default() += 1;
        } else if trade.is_loser() {
            losses += 1;
        } else {
            open_trades += 1;
        }
    }

    Some(Summary {
        total_trades: trades.len(),
        wins,
        losses,
        open_trades,
        risk_reward: wins as f64 / losses.max(1) as f64,
        best_days,
    })
}

/// Full English weekday name. chrono's `Display` gives the short form.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
