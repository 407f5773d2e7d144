//! Backtesting engine — bar-by-bar trade state machine.
//!
//! The engine consumes an ordered bar series, precomputes the Heiken-Ashi
//! candles and EMA trend filter, then walks forward from the warm-up index:
//!
//! - Flat: read the trend, check pullback + high-volume doji, maybe open
//! - In position: check stop first, then target, maybe close
//!
//! At most one position is open at a time. Records come out in entry order.

pub mod loop_runner;
pub mod state;
pub mod step;
pub mod validate;

pub use loop_runner::{run_backtest, simulate};
pub use state::{EngineConfig, RunResult, SimState, DEFAULT_EMA_SPAN, REWARD_MULTIPLE};
pub use step::{bracket, exit_signal, step, trend, StepContext, Transition};
pub use validate::{validate_bars, EngineError};
