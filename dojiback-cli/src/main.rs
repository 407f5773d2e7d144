//! dojiback CLI — run, batch, and serve commands.
//!
//! Commands:
//! - `run` — backtest one CSV file (or seeded synthetic bars) and print the summary
//! - `batch` — backtest several CSV files in parallel
//! - `serve` — HTTP endpoint taking a CSV upload and returning the summary
//!
//! Logs go to stderr (`RUST_LOG` overrides the `dojiback=info` default), so
//! stdout stays clean for `--json`.

mod server;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dojiback_runner::{
    run_batch, run_single_backtest, run_synthetic, save_artifacts, BacktestConfig, BacktestResult,
    Summary,
};

#[derive(Parser)]
#[command(
    name = "dojiback",
    version,
    about = "dojiback — Heiken-Ashi pullback + doji backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Config file plus per-flag overrides, shared by every command.
#[derive(Args, Debug, Clone, Default)]
struct ConfigArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zone of naive CSV timestamps (IANA name).
    #[arg(long)]
    from_tz: Option<String>,

    /// Zone the engine and weekday statistics use (IANA name).
    #[arg(long)]
    to_tz: Option<String>,

    /// EMA span. Also the warm-up unless --warmup is given.
    #[arg(long)]
    ema_span: Option<usize>,

    /// First bar index scanned for entries.
    #[arg(long)]
    warmup: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one CSV file and print the summary.
    Run {
        /// CSV with Timestamp, Open, High, Low, Close, Volume columns.
        #[arg(long, required_unless_present = "synthetic", conflicts_with = "synthetic")]
        csv: Option<PathBuf>,

        /// Use this many seeded random-walk bars instead of a CSV.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for --synthetic.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print the summary as JSON (`{}` when there are no trades).
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save result.json, trades.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Backtest several CSV files in parallel.
    Batch {
        /// CSV files to run.
        #[arg(required = true)]
        csvs: Vec<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Save artifacts for each successful run under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Serve `POST /backtest` over HTTP.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on.
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            csv,
            synthetic,
            seed,
            config,
            json,
            output_dir,
        } => run_cmd(csv, synthetic, seed, &config, json, output_dir),
        Commands::Batch {
            csvs,
            config,
            output_dir,
        } => batch_cmd(&csvs, &config, output_dir),
        Commands::Serve { host, port, config } => serve_cmd(SocketAddr::new(host, port), &config),
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("dojiback=info".parse()?))
        .init();
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied, validated.
fn build_config(args: &ConfigArgs) -> Result<BacktestConfig> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };
    if let Some(from_tz) = &args.from_tz {
        config.data.from_tz = from_tz.clone();
    }
    if let Some(to_tz) = &args.to_tz {
        config.data.to_tz = to_tz.clone();
    }
    if let Some(span) = args.ema_span {
        config.strategy.ema_span = span;
    }
    if let Some(warmup) = args.warmup {
        config.strategy.warmup_bars = Some(warmup);
    }
    config.validate()?;
    Ok(config)
}

fn run_cmd(
    csv: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
    args: &ConfigArgs,
    json: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = build_config(args)?;
    let result = match (csv, synthetic) {
        (Some(path), _) => run_single_backtest(&path, &config)
            .with_context(|| format!("backtest failed for {}", path.display()))?,
        (None, Some(n)) => run_synthetic(n, seed, &config)?,
        (None, None) => bail!("one of --csv or --synthetic is required"),
    };

    if json {
        println!("{}", summary_json(result.summary.as_ref())?);
    } else {
        print_summary(result.summary.as_ref());
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn batch_cmd(csvs: &[PathBuf], args: &ConfigArgs, output_dir: Option<PathBuf>) -> Result<()> {
    let config = build_config(args)?;
    let results = run_batch(csvs, &config);

    let mut failed = 0;
    for (path, outcome) in &results {
        match outcome {
            Ok(result) => {
                println!("{}: {}", path.display(), summary_line(result));
                if let Some(dir) = &output_dir {
                    save_artifacts(result, dir)?;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: error: {e}", path.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} backtests failed", results.len());
    }
    Ok(())
}

fn serve_cmd(addr: SocketAddr, args: &ConfigArgs) -> Result<()> {
    let config = build_config(args)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(server::serve(addr, config))
}

fn summary_json(summary: Option<&Summary>) -> Result<String> {
    let value = match summary {
        Some(s) => serde_json::to_value(s)?,
        None => serde_json::json!({}),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn print_summary(summary: Option<&Summary>) {
    print!("{}", format_summary(summary));
}

/// Plain-text summary. The ratio keeps its float form (`10.0`, not `10`).
fn format_summary(summary: Option<&Summary>) -> String {
    let Some(s) = summary else {
        return "No trades found\n".to_string();
    };
    let mut out = format!(
        "Total trades: {}\nWins: {}\nLosses: {}\n",
        s.total_trades, s.wins, s.losses
    );
    if s.open_trades > 0 {
        out.push_str(&format!("Open: {}\n", s.open_trades));
    }
    out.push_str(&format!("Risk Reward Ratio: {:?}\n", s.risk_reward));
    let days: Vec<String> = s
        .best_days
        .iter()
        .map(|(day, count)| format!("{day}: {count}"))
        .collect();
    out.push_str(&format!("Best days: {{{}}}\n", days.join(", ")));
    out
}

fn summary_line(result: &BacktestResult) -> String {
    match &result.summary {
        None => format!("{} bars, no trades", result.bar_count),
        Some(s) => format!(
            "{} bars, {} trades ({} wins, {} losses, {} open), risk/reward {:.2}",
            result.bar_count, s.total_trades, s.wins, s.losses, s.open_trades, s.risk_reward
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dojiback.toml");
        std::fs::write(&path, "[strategy]\nema_span = 50\n[data]\nto_tz = \"UTC\"\n").unwrap();

        let args = ConfigArgs {
            config: Some(path),
            from_tz: Some("America/New_York".into()),
            warmup: Some(80),
            ..ConfigArgs::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.strategy.ema_span, 50);
        assert_eq!(config.to_engine_config().warmup_bars, 80);
        assert_eq!(config.data.from_tz, "America/New_York");
        assert_eq!(config.data.to_tz, "UTC");
    }

    #[test]
    fn invalid_override_rejected() {
        let args = ConfigArgs {
            ema_span: Some(0),
            ..ConfigArgs::default()
        };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn run_requires_an_input() {
        assert!(Cli::try_parse_from(["dojiback", "run"]).is_err());
        assert!(Cli::try_parse_from(["dojiback", "run", "--csv", "a.csv", "--synthetic", "10"]).is_err());
        assert!(Cli::try_parse_from(["dojiback", "run", "--synthetic", "10"]).is_ok());
    }

    #[test]
    fn text_summary_keeps_float_ratio() {
        let summary = Summary {
            total_trades: 10,
            wins: 10,
            losses: 0,
            open_trades: 0,
            risk_reward: 10.0,
            best_days: [("Monday".to_string(), 10)].into_iter().collect(),
        };
        assert_eq!(
            format_summary(Some(&summary)),
            "Total trades: 10\nWins: 10\nLosses: 0\nRisk Reward Ratio: 10.0\nBest days: {Monday: 10}\n"
        );
        assert_eq!(format_summary(None), "No trades found\n");
    }

    #[test]
    fn empty_summary_json_is_empty_object() {
        assert_eq!(summary_json(None).unwrap(), "{}");
    }
}
