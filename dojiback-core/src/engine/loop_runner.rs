//! Bar-by-bar forward pass — the heart of the backtesting engine.
//!
//! One run:
//! 1. Validate config and bars (the only fallible part)
//! 2. Precompute Heiken-Ashi candles and the EMA in one forward pass
//! 3. Step the state machine from the warm-up index to the last bar
//! 4. Append each closed record, then the still-open record if any

use tracing::{debug, info, warn};

use crate::domain::Bar;
use crate::indicators::IndicatorSet;

use super::state::{EngineConfig, RunResult, SimState};
use super::step::{step, StepContext, Transition};
use super::validate::{validate_bars, EngineError};

/// Run a backtest over an ordered bar series.
///
/// Fails only on an invalid config or malformed bars. Fewer bars than the
/// warm-up is not an error: the scan is empty and no trades are produced.
pub fn run_backtest(bars: &[Bar], config: &EngineConfig) -> Result<RunResult, EngineError> {
    config.validate()?;
    validate_bars(bars)?;

    let indicators = IndicatorSet::compute(bars, config.ema_span);
    Ok(simulate(bars, &indicators, config))
}

/// The forward pass over precomputed indicators. Infallible.
///
/// `indicators` must have been computed from `bars`.
pub fn simulate(bars: &[Bar], indicators: &IndicatorSet, config: &EngineConfig) -> RunResult {
    let bar_count = bars.len();
    if bar_count > 0 && bar_count <= config.warmup_bars {
        warn!(
            bar_count,
            warmup_bars = config.warmup_bars,
            "fewer bars than warm-up, nothing to scan"
        );
    }

    let ctx = StepContext {
        bars,
        indicators,
        doji: config.doji_rule(),
    };

    let mut trades = Vec::new();
    let mut state = SimState::Flat;

    for t in config.warmup_bars..bar_count {
        let (next, transition) = step(state, &ctx, t);
        state = next;

        match transition {
            Transition::Hold => {}
            Transition::Opened => {
                if let Some(trade) = state.open_trade() {
                    debug!(
                        bar = t,
                        direction = ?trade.direction,
                        entry = trade.entry_price,
                        stop = trade.stop_price,
                        target = trade.take_profit_price,
                        "position opened"
                    );
                }
            }
            Transition::Closed(trade) => {
                debug!(
                    bar = t,
                    direction = ?trade.direction,
                    exit = ?trade.exit_price,
                    outcome = ?trade.outcome,
                    "position closed"
                );
                trades.push(trade);
            }
        }
    }

    if let SimState::InPosition(trade) = state {
        debug!(entry_bar = trade.entry_bar, "position still open at end of data");
        trades.push(trade);
    }

    let wins = trades.iter().filter(|t| t.is_winner()).count();
    let losses = trades.iter().filter(|t| t.is_loser()).count();
    info!(
        bars = bar_count,
        trades = trades.len(),
        wins,
        losses,
        "backtest complete"
    );

    RunResult {
        trades,
        bar_count,
        warmup_bars: config.warmup_bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bar;

    #[test]
    fn empty_input_gives_no_trades() {
        let result = run_backtest(&[], &EngineConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.bar_count, 0);
        assert_eq!(result.open_trade(), None);
    }

    #[test]
    fn short_series_is_not_an_error() {
        let bars: Vec<Bar> = (0..50)
            .map(|i| make_bar(i, 10.0, 11.0, 9.0, 10.0, 100.0))
            .collect();
        let result = run_backtest(&bars, &EngineConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.bar_count, 50);
    }

    #[test]
    fn invalid_config_rejected_before_scan() {
        let mut config = EngineConfig::default();
        config.volume_lookback = 0;
        assert!(matches!(
            run_backtest(&[], &config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_bars_rejected() {
        let mut bars: Vec<Bar> = (0..5)
            .map(|i| make_bar(i, 10.0, 11.0, 9.0, 10.0, 100.0))
            .collect();
        // Timestamps now run 0, 3, 2, 1, 4: the first step back is at index 2.
        bars.swap(1, 3);
        assert!(matches!(
            run_backtest(&bars, &EngineConfig::default()),
            Err(EngineError::MalformedInput { index: 2, .. })
        ));
    }
}
