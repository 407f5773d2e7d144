//! Backtest runner — wires together loading, the engine, and the summary.
//!
//! Entry points:
//! - `run_single_backtest()`: loads a CSV file, then runs. Used by the CLI.
//! - `run_backtest_from_reader()`: parses CSV from any reader. Used by the HTTP server.
//! - `run_backtest_from_bars()`: takes pre-loaded bars. No I/O.
//! - `run_synthetic()`: seeded random-walk bars, for demos.
//! - `run_batch()`: independent files in parallel, results in input order.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use dojiback_core::domain::{Bar, TradeRecord};
use dojiback_core::engine::{run_backtest, EngineError};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{compute_dataset_hash, load_csv, parse_csv, DataOptions, LoadError};
use crate::summary::{summarize, Summary};
use crate::synthetic::generate_bars;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    /// Where the bars came from: a file path, `synthetic:<n>:<seed>`, or a label.
    pub source: String,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub first_timestamp: Option<DateTime<FixedOffset>>,
    pub last_timestamp: Option<DateTime<FixedOffset>>,
    pub trades: Vec<TradeRecord>,
    /// `None` when the run recorded no trades.
    pub summary: Option<Summary>,
    pub config: BacktestConfig,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a backtest over pre-loaded bars — no I/O.
pub fn run_backtest_from_bars(
    bars: &[Bar],
    config: &BacktestConfig,
    dataset_hash: &str,
    source: &str,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let engine_config = config.to_engine_config();
    let run = run_backtest(bars, &engine_config)?;
    let summary = summarize(&run.trades);

    if run.open_trade().is_some() {
        info!(source, "run ended with an open position");
    }

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: dataset_hash.to_string(),
        source: source.to_string(),
        bar_count: run.bar_count,
        warmup_bars: run.warmup_bars,
        first_timestamp: bars.first().map(|b| b.timestamp),
        last_timestamp: bars.last().map(|b| b.timestamp),
        trades: run.trades,
        summary,
        config: config.clone(),
    })
}

/// Load a CSV file with the config's timezone settings, then run.
pub fn run_single_backtest(path: &Path, config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let opts = DataOptions::from_config(&config.data)?;
    let loaded = load_csv(path, &opts)?;
    run_backtest_from_bars(
        &loaded.bars,
        config,
        &loaded.dataset_hash,
        &path.display().to_string(),
    )
}

/// Parse CSV from `reader`, then run. `source` labels the result.
pub fn run_backtest_from_reader<R: Read>(
    reader: R,
    config: &BacktestConfig,
    source: &str,
) -> Result<BacktestResult, RunError> {
    let opts = DataOptions::from_config(&config.data)?;
    let loaded = parse_csv(reader, &opts)?;
    run_backtest_from_bars(&loaded.bars, config, &loaded.dataset_hash, source)
}

/// Run over `n` seeded synthetic bars.
pub fn run_synthetic(n: usize, seed: u64, config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let bars = generate_bars(n, seed);
    let hash = compute_dataset_hash(&bars);
    run_backtest_from_bars(&bars, config, &hash, &format!("synthetic:{n}:{seed}"))
}

/// Run each file independently on the rayon pool.
///
/// One failing file does not stop the others. Results keep input order.
pub fn run_batch(
    paths: &[PathBuf],
    config: &BacktestConfig,
) -> Vec<(PathBuf, Result<BacktestResult, RunError>)> {
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| (path.clone(), run_single_backtest(path, config)))
        .collect();

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        warn!(files = paths.len(), failed, "batch finished with failures");
    } else {
        info!(files = paths.len(), "batch finished");
    }
    results
}
