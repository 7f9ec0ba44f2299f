//! Bounce CLI: scan, query and replay commands.
//!
//! Commands:
//! - `scan`: run the Bounce 2.0 scan against the live scanner and publish
//! - `query`: print the remote query as wire JSON without sending it
//! - `replay`: rerun the local pipeline over a saved snapshot

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use bounce_core::domain::Direction;
use bounce_core::provider::{CandidateProvider, SnapshotProvider, TradingViewProvider};
use bounce_core::ScanConfig;
use bounce_runner::sink::render_table;
use bounce_runner::{
    build_sink, init_logging, OutputConfig, ScanError, ScanReport, Scanner, ScannerConfig,
};

#[derive(Parser)]
#[command(name = "bounce", about = "Bounce 2.0 equity scanner")]
struct Cli {
    /// Increase log detail (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Long,
    Short,
    Both,
}

impl DirectionArg {
    fn directions(self) -> Vec<Direction> {
        match self {
            DirectionArg::Long => vec![Direction::Long],
            DirectionArg::Short => vec![Direction::Short],
            DirectionArg::Both => vec![Direction::Long, Direction::Short],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    Log,
    File,
    Webhook,
}

impl OutputArg {
    fn as_str(self) -> &'static str {
        match self {
            OutputArg::Log => "log",
            OutputArg::File => "file",
            OutputArg::Webhook => "webhook",
        }
    }
}

/// Flags shared by commands that publish.
#[derive(clap::Args)]
struct OutputFlags {
    /// Output target; overrides `[output]` in the config file.
    #[arg(long, value_enum)]
    output: Option<OutputArg>,

    /// Directory for `--output file`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Endpoint for `--output webhook`.
    #[arg(long)]
    webhook_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the live universe and publish the candidates.
    Scan {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Direction; overrides `scan.direction` in the config file.
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        #[command(flatten)]
        output: OutputFlags,

        /// Save the fetched table here before filtering. With `--direction both`
        /// the direction is appended to the file stem.
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },
    /// Print the remote query as JSON without sending it.
    Query {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
    },
    /// Rerun filtering and enrichment over a saved snapshot.
    Replay {
        /// Snapshot written by `scan --save-snapshot`.
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        #[command(flatten)]
        output: OutputFlags,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            config,
            direction,
            output,
            save_snapshot,
        } => run_scan(config, direction, output, save_snapshot),
        Commands::Query { config, direction } => run_query(config, direction),
        Commands::Replay {
            snapshot,
            config,
            direction,
            output,
        } => run_replay(&snapshot, config, direction, output),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScannerConfig> {
    match path {
        Some(p) => ScannerConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(ScannerConfig::default()),
    }
}

fn resolve_output(cfg: &ScannerConfig, flags: OutputFlags) -> Result<OutputConfig> {
    match flags.output {
        Some(kind) => Ok(OutputConfig::from_parts(
            Some(kind.as_str()),
            flags.out_dir,
            flags.webhook_url,
        )?),
        None => {
            if flags.out_dir.is_some() || flags.webhook_url.is_some() {
                bail!("--out-dir and --webhook-url need --output");
            }
            Ok(cfg.output.clone())
        }
    }
}

fn directions(cfg: &ScannerConfig, arg: Option<DirectionArg>) -> Vec<Direction> {
    arg.map(DirectionArg::directions)
        .unwrap_or_else(|| vec![cfg.scan.direction])
}

fn scan_config(cfg: &ScannerConfig, direction: Direction) -> ScanConfig {
    ScanConfig {
        direction,
        ..cfg.scan.clone()
    }
}

/// `snap.json` -> `snap_long.json` when several directions share one flag.
fn snapshot_path(base: &Path, direction: Direction, several: bool) -> PathBuf {
    if !several {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".into());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".into());
    base.with_file_name(format!("{stem}_{direction}.{ext}"))
}

fn run_scan(
    config_path: Option<PathBuf>,
    direction: Option<DirectionArg>,
    output: OutputFlags,
    save_snapshot: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config(config_path.as_deref())?;
    let output = resolve_output(&cfg, output)?;
    let sink = build_sink(&output)?;
    let provider = TradingViewProvider::new(cfg.provider.clone())?;

    let dirs = directions(&cfg, direction);
    let several = dirs.len() > 1;
    let scan_time = Utc::now();

    let run_one = |d: Direction| -> Result<ScanReport, ScanError> {
        let mut scanner = Scanner::new(&provider, scan_config(&cfg, d))?;
        if let Some(base) = &save_snapshot {
            scanner = scanner.with_snapshot(snapshot_path(base, d, several));
        }
        scanner.run_at(scan_time, sink.as_ref())
    };

    let results = match dirs.as_slice() {
        [a, b] => {
            let (ra, rb) = rayon::join(|| run_one(*a), || run_one(*b));
            vec![ra, rb]
        }
        _ => dirs.iter().map(|d| run_one(*d)).collect(),
    };
    finish(results)
}

fn run_query(config_path: Option<PathBuf>, direction: Option<DirectionArg>) -> Result<()> {
    let cfg = load_config(config_path.as_deref())?;
    let provider = TradingViewProvider::new(cfg.provider.clone())?;
    let scan_time = Utc::now();

    for d in directions(&cfg, direction) {
        let scanner = Scanner::new(&provider, scan_config(&cfg, d))?;
        let query = scanner.query_at(scan_time);
        println!("// {d}");
        println!("{}", serde_json::to_string_pretty(&query.to_wire())?);
    }
    Ok(())
}

fn run_replay(
    snapshot: &Path,
    config_path: Option<PathBuf>,
    direction: Option<DirectionArg>,
    output: OutputFlags,
) -> Result<()> {
    let cfg = load_config(config_path.as_deref())?;
    let output = resolve_output(&cfg, output)?;
    let sink = build_sink(&output)?;
    let provider = SnapshotProvider::from_file(snapshot)?;
    let captured_at: DateTime<Utc> = provider.snapshot().captured_at;
    info!(
        provider = provider.name(),
        source = %provider.snapshot().provider,
        %captured_at,
        "replaying snapshot"
    );

    let results = directions(&cfg, direction)
        .into_iter()
        .map(|d| {
            Scanner::new(&provider, scan_config(&cfg, d))
                .map_err(ScanError::from)
                .and_then(|s| s.run_at(captured_at, sink.as_ref()))
        })
        .collect();
    finish(results)
}

/// Print each report; fail if any run failed.
fn finish(results: Vec<Result<ScanReport, ScanError>>) -> Result<()> {
    let mut failures = 0;
    for result in results {
        match result {
            Ok(report) => print_summary(&report),
            Err(err) => {
                failures += 1;
                if let Some(report) = err.report() {
                    print_summary(report);
                }
                eprintln!("Error: {err}");
            }
        }
    }
    if failures > 0 {
        bail!("{failures} scan(s) failed");
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let meta = &report.metadata;
    println!();
    println!(
        "=== Bounce 2.0 {} scan @ {} ===",
        meta.direction,
        meta.scanned_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("Run ID:      {}", meta.run_id);
    println!("Provider:    {}", meta.provider);
    println!("Fetched:     {} of {} matches", meta.fetched, meta.total_matches);
    println!(
        "Periods:     ADX {}, Stoch {}, RSI {}",
        meta.periods.adx, meta.periods.stoch, meta.periods.momentum
    );
    for fb in &meta.period_fallbacks {
        println!(
            "  {:?} period {} unavailable, used {}",
            fb.indicator, fb.requested, fb.used
        );
    }
    println!("Candidates:  {}", report.len());
    if !report.integrity_drops.is_empty() {
        println!("Dropped (missing data): {}", report.integrity_drops.len());
    }
    println!();
    println!("{}", report.trail_summary());
    if !report.is_empty() {
        println!();
        print!("{}", render_table(report));
    }
}
