//! Breakscan CLI — breakout/breakdown quarterly statistics from CSV bars.
//!
//! Commands:
//! - `analyze` — per-quarter statistics for one or more symbols
//! - `events` — the closed-event tape for a single symbol

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use breakscan_core::analysis::{run_analysis, AnalysisReport, RunError};
use breakscan_core::config::AnalysisConfig;
use breakscan_core::data::{BarSource, CsvDir};
use breakscan_core::domain::ClosedEvent;

#[derive(Parser)]
#[command(
    name = "breakscan",
    about = "Breakscan CLI — breakout/breakdown quarterly statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-quarter breakout statistics for one or more symbols.
    Analyze {
        /// Symbols to analyze (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Directory of <SYMBOL>.csv bar files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// TOML analysis config. Defaults to the built-in study window.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write per-symbol JSON reports into this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the closed-event tape for a single symbol.
    Events {
        symbol: String,

        /// Directory of <SYMBOL>.csv bar files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// TOML analysis config. Defaults to the built-in study window.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            symbols,
            data_dir,
            config,
            output_dir,
        } => run_analyze(symbols, data_dir, config, output_dir),
        Commands::Events {
            symbol,
            data_dir,
            config,
        } => run_events(symbol, data_dir, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_analyze(
    symbols: Vec<String>,
    data_dir: PathBuf,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let source = CsvDir::new(data_dir);
    println!(
        "analyzing {} symbol(s) from {} source",
        symbols.len(),
        source.name()
    );

    // One scan per symbol; scans are independent, so fan out.
    let results: Vec<(String, Result<AnalysisReport, RunError>)> = symbols
        .par_iter()
        .map(|symbol| (symbol.clone(), run_analysis(&source, symbol, &config)))
        .collect();

    let mut failed = 0;
    for (symbol, result) in results {
        match result {
            Ok(report) => {
                print_quarter_table(&report);
                if let Some(dir) = &output_dir {
                    write_report(dir, &report)?;
                }
            }
            Err(err) => {
                eprintln!("{symbol}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} symbol(s) failed");
    }
    Ok(())
}

fn run_events(symbol: String, data_dir: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let source = CsvDir::new(data_dir);
    let report = run_analysis(&source, &symbol, &config)?;

    println!(
        "{} — {} closed event(s), initial target {:.3}",
        report.symbol,
        report.events.len(),
        report.initial_target
    );
    for event in &report.events {
        match event {
            ClosedEvent::Breakout(ev) => println!(
                "{}  breakout   {:<9} target {:>10.3}  buy {:>10.3}  days {:>4}  max ampl {:>9.3}%",
                ev.start_date,
                ev.kind.to_string(),
                ev.target_price,
                ev.buy_price,
                ev.duration,
                ev.max_amplitude,
            ),
            ClosedEvent::Breakdown(ev) => println!(
                "{}  breakdown  {:<21} started {} ({})  price {:>10.3}  days {:>4}  effective {}",
                ev.breakdown_date,
                ev.breakdown.to_string(),
                ev.start_date,
                ev.kind,
                ev.breakdown_price,
                ev.duration,
                ev.effective_pct_label(),
            ),
        }
    }
    Ok(())
}

fn print_quarter_table(report: &AnalysisReport) {
    println!();
    println!(
        "{} — {} event(s), initial target {:.3}",
        report.symbol,
        report.events.len(),
        report.initial_target
    );
    if report.quarters.is_empty() {
        println!("  (no events in any whitelisted quarter)");
        return;
    }

    println!(
        "  {:<8} {:<12} {:>6} {:>10} {:>12} {:>6} {:>6} {:>7}",
        "quarter", "regime", "count", "avg days", "avg ampl %", "3b5", "hi-8", "gap-10"
    );
    for summary in report.quarters.values() {
        println!(
            "  {:<8} {:<12} {:>6} {:>10.2} {:>12.3} {:>6} {:>6} {:>7}",
            summary.quarter,
            summary.market_regime.to_string(),
            summary.breakout_count,
            summary.avg_duration,
            summary.avg_amplitude,
            summary.breakdown_stats.three_break_five,
            summary.breakdown_stats.intraday_high_drop8,
            summary.breakdown_stats.intraday_gap_drop10,
        );
    }
}

fn write_report(dir: &Path, report: &AnalysisReport) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", report.symbol));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("  wrote {}", path.display());
    Ok(())
}
