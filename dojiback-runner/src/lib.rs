//! dojiback runner — data loading, orchestration, summary, artifacts.
//!
//! This crate builds on `dojiback-core` to provide:
//! - CSV ingestion with source-to-target timezone conversion
//! - TOML backtest configuration with a content-addressed run ID
//! - Single, batch (parallel) and synthetic-data backtest runs
//! - Summary statistics (wins, losses, risk/reward, wins by weekday)
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod summary;
pub mod synthetic;

pub use config::{BacktestConfig, ConfigError, DataConfig, RunId, StrategyConfig};
pub use data_loader::{load_csv, parse_csv, DataOptions, LoadError, LoadedData};
pub use export::{export_json, export_trades_csv, import_json, load_artifacts, save_artifacts};
pub use runner::{
    run_backtest_from_bars, run_backtest_from_reader, run_batch, run_single_backtest,
    run_synthetic, BacktestResult, RunError, SCHEMA_VERSION,
};
pub use summary::{summarize, Summary};
pub use synthetic::generate_bars;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<DataOptions>();
        assert_sync::<DataOptions>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }

    #[test]
    fn summary_is_send_sync() {
        assert_send::<Summary>();
        assert_sync::<Summary>();
    }
}
