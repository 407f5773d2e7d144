//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape for external analysis tools
//! - **Markdown**: human-readable single-run report
//!
//! Persisted results carry a `schema_version`. Newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dojiback_core::domain::{Direction, TradeRecord};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

const RESULT_FILE: &str = "result.json";
const TRADES_FILE: &str = "trades.csv";
const REPORT_FILE: &str = "report.md";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV, one row per trade.
///
/// Columns: direction, entry_bar, entry_time, entry_price, risk, stop_price,
/// take_profit_price, exit_bar, exit_time, exit_price, outcome.
/// Exit cells are empty for a trade still open at the end of the data.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "direction",
        "entry_bar",
        "entry_time",
        "entry_price",
        "risk",
        "stop_price",
        "take_profit_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "outcome",
    ])?;

    for t in trades {
        let direction = match t.direction {
            Direction::Long => "long",
            Direction::Short => "short",
        };
        wtr.write_record([
            direction.to_string(),
            t.entry_bar.to_string(),
            t.entry_time.to_rfc3339(),
            format!("{:.6}", t.entry_price),
            format!("{:.6}", t.risk),
            format!("{:.6}", t.stop_price),
            format!("{:.6}", t.take_profit_price),
            t.exit_bar.map(|b| b.to_string()).unwrap_or_default(),
            t.exit_time.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
            t.exit_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            t.outcome.map(|o| i8::from(o).to_string()).unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Markdown report for a single run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Source | {} |\n", result.source));
    if let (Some(first), Some(last)) = (result.first_timestamp, result.last_timestamp) {
        md.push_str(&format!("| Period | {first} to {last} |\n"));
    }
    md.push_str(&format!(
        "| Bars | {} ({} warmup) |\n",
        result.bar_count, result.warmup_bars
    ));
    md.push_str(&format!("| EMA Span | {} |\n", result.config.strategy.ema_span));
    md.push_str(&format!(
        "| Timezones | {} -> {} |\n",
        result.config.data.from_tz, result.config.data.to_tz
    ));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push('\n');

    md.push_str("## Summary\n\n");
    match &result.summary {
        None => md.push_str("No trades found.\n"),
        Some(s) => {
            md.push_str("| Metric | Value |\n");
            md.push_str("| --- | --- |\n");
            md.push_str(&format!("| Total Trades | {} |\n", s.total_trades));
            md.push_str(&format!("| Wins | {} |\n", s.wins));
            md.push_str(&format!("| Losses | {} |\n", s.losses));
            md.push_str(&format!("| Open | {} |\n", s.open_trades));
            md.push_str(&format!("| Risk Reward Ratio | {:.2} |\n", s.risk_reward));
            if !s.best_days.is_empty() {
                md.push_str("\n### Wins by weekday\n\n");
                for (day, count) in &s.best_days {
                    md.push_str(&format!("- {day}: {count}\n"));
                }
            }
        }
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a run: config and dataset fingerprints.
pub fn artifact_dir_name(result: &BacktestResult) -> String {
    let run = &result.run_id[..result.run_id.len().min(12)];
    let data = &result.dataset_hash[..result.dataset_hash.len().min(12)];
    format!("{run}-{data}")
}

/// Save the full artifact set for a single backtest run.
///
/// Creates `{run_id}-{dataset_hash}/` (12-char prefixes) under `output_dir`
/// containing:
/// - `result.json` — the full `BacktestResult`
/// - `trades.csv` — trade tape
/// - `report.md` — Markdown summary
///
/// The same config on the same data writes to the same directory.
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join(RESULT_FILE), export_json(result)?)?;
    std::fs::write(run_dir.join(TRADES_FILE), export_trades_csv(&result.trades)?)?;
    std::fs::write(run_dir.join(REPORT_FILE), generate_report(result))?;

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's result.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join(RESULT_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
