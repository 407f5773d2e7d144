//! The trade state machine as a pure step function.
//!
//! `step` takes the current state by value and returns the next one. Entry
//! and exit are mutually exclusive per bar: a bar that closes a position is
//! never also checked for a new entry.

use crate::domain::{Bar, Direction, HeikenAshiBar, Outcome, TradeRecord};
use crate::indicators::IndicatorSet;
use crate::patterns::{is_clean_pullback, is_high_volume_doji, DojiRule};

use super::state::{SimState, REWARD_MULTIPLE};

/// Read-only inputs shared by every step of a run.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub bars: &'a [Bar],
    pub indicators: &'a IndicatorSet,
    pub doji: DojiRule,
}

/// What happened on one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// No state change.
    Hold,
    /// A position was opened; the record lives in the returned state.
    Opened,
    /// The open position hit its stop or target. The record is final.
    Closed(TradeRecord),
}

/// Advance the simulator by one bar.
pub fn step(state: SimState, ctx: &StepContext<'_>, index: usize) -> (SimState, Transition) {
    match state {
        SimState::Flat => match try_open(ctx, index) {
            Some(trade) => (SimState::InPosition(trade), Transition::Opened),
            None => (SimState::Flat, Transition::Hold),
        },
        SimState::InPosition(trade) => {
            let (Some(candle), Some(bar)) = (ctx.indicators.candle(index), ctx.bars.get(index))
            else {
                return (SimState::InPosition(trade), Transition::Hold);
            };
            match exit_signal(&trade, candle) {
                Some((exit_price, outcome)) => {
                    let closed = trade.close(index, bar.timestamp, exit_price, outcome);
                    (SimState::Flat, Transition::Closed(closed))
                }
                None => (SimState::InPosition(trade), Transition::Hold),
            }
        }
    }
}

/// Trend read off the EMA: above is long, below is short, equal is no signal.
pub fn trend(ha_close: f64, ema: f64) -> Option<Direction> {
    if ha_close > ema {
        Some(Direction::Long)
    } else if ha_close < ema {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Stop and target for an entry at `entry_price` risking `risk`.
pub fn bracket(direction: Direction, entry_price: f64, risk: f64) -> (f64, f64) {
    let reward = risk * REWARD_MULTIPLE;
    match direction {
        Direction::Long => (entry_price - risk, entry_price + reward),
        Direction::Short => (entry_price + risk, entry_price - reward),
    }
}

/// Stop is checked before target, so a bar that spans both is a loss.
pub fn exit_signal(trade: &TradeRecord, candle: &HeikenAshiBar) -> Option<(f64, Outcome)> {
    match trade.direction {
        Direction::Long => {
            if candle.low <= trade.stop_price {
                Some((trade.stop_price, Outcome::Loss))
            } else if candle.high >= trade.take_profit_price {
                Some((trade.take_profit_price, Outcome::Win))
            } else {
                None
            }
        }
        Direction::Short => {
            if candle.high >= trade.stop_price {
                Some((trade.stop_price, Outcome::Loss))
            } else if candle.low <= trade.take_profit_price {
                Some((trade.take_profit_price, Outcome::Win))
            } else {
                None
            }
        }
    }
}

fn try_open(ctx: &StepContext<'_>, index: usize) -> Option<TradeRecord> {
    let candle = ctx.indicators.candle(index)?;
    let ema = ctx.indicators.ema(index)?;
    let bar = ctx.bars.get(index)?;

    let direction = trend(candle.close, ema)?;
    if !is_clean_pullback(ctx.indicators, index, direction)
        || !is_high_volume_doji(ctx.indicators, index, &ctx.doji)
    {
        return None;
    }

    let entry_price = candle.close;
    let risk = match direction {
        Direction::Long => candle.close - candle.low,
        Direction::Short => candle.high - candle.close,
    };
    let (stop_price, take_profit_price) = bracket(direction, entry_price, risk);

    Some(TradeRecord {
        direction,
        entry_bar: index,
        entry_time: bar.timestamp,
        entry_price,
        risk,
        stop_price,
        take_profit_price,
        exit_bar: None,
        exit_time: None,
        exit_price: None,
        outcome: None,
    })
}
