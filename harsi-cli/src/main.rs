//! HARSI CLI — signal inspection, replay, monitoring and desk snapshot commands.
//!
//! Commands:
//! - `signal` — latest signal for a CSV of candles, as JSON
//! - `chart` — last N oscillator rows for a CSV of candles, as JSON
//! - `replay` — walk a CSV bar by bar through the strategy and print actions
//! - `monitor` — run evaluation cycles over the configured symbols
//! - `positions`, `stats`, `alerts`, `close` — query or update a desk snapshot

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use harsi_core::domain::Alert;
use harsi_core::oscillator::compute_oscillator;
use harsi_core::signals::compute_signal;
use harsi_core::trading::{StrategyAction, DEFAULT_ALERT_LIMIT};
use harsi_runner::snapshot::{load_state, save_state};
use harsi_runner::{
    format_alert, load_csv, normalize_symbol, run_cycle, AlertSink, CandleSource, LogSink,
    MonitorConfig, TradingDesk,
};

const DEFAULT_SNAPSHOT: &str = "state/desk.json";

#[derive(Parser)]
#[command(
    name = "harsi",
    about = "HARSI — Heikin-Ashi RSI signal monitor and position tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest signal for a candle CSV as JSON.
    Signal {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: PathBuf,

        /// TOML config supplying [oscillator] parameters.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the last oscillator rows for a candle CSV as JSON.
    Chart {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: PathBuf,

        /// TOML config supplying [oscillator] parameters.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of most recent rows to print.
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Replay a candle CSV bar by bar through the strategy.
    Replay {
        /// Candle CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: PathBuf,

        /// Symbol the candles belong to (BTC/USDT or BTC-USDT).
        #[arg(long)]
        symbol: String,

        /// TOML config supplying [oscillator], [risk] and [alerts].
        #[arg(long)]
        config: Option<PathBuf>,

        /// Desk snapshot to start from and save to.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Run evaluation cycles over the configured symbols.
    Monitor {
        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Desk snapshot, loaded at start and saved after every cycle.
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        snapshot: PathBuf,

        /// Stop after this many cycles. Runs until killed when omitted.
        #[arg(long)]
        cycles: Option<usize>,

        /// Use seeded synthetic candles instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// List positions in a desk snapshot.
    Positions {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        snapshot: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Only positions that are still open.
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Show (or reset) trade statistics in a desk snapshot.
    Stats {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        snapshot: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// One symbol. All symbols aggregated when omitted.
        #[arg(long)]
        symbol: Option<String>,

        /// Reset the selected statistics instead of printing them.
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
    /// Show (or clear) recent alerts in a desk snapshot.
    Alerts {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        snapshot: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum number of alerts, newest first.
        #[arg(long, default_value_t = DEFAULT_ALERT_LIMIT)]
        limit: usize,

        /// Clear the alert history.
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Close an open position at the given price.
    Close {
        #[arg(long, default_value = DEFAULT_SNAPSHOT)]
        snapshot: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        symbol: String,

        #[arg(long)]
        price: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("harsi=info,harsi_core=info,harsi_runner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Signal { csv, config } => run_signal(&csv, config.as_deref()),
        Commands::Chart { csv, config, limit } => run_chart(&csv, config.as_deref(), limit),
        Commands::Replay {
            csv,
            symbol,
            config,
            snapshot,
        } => run_replay(&csv, &symbol, config.as_deref(), snapshot.as_deref()),
        Commands::Monitor {
            config,
            snapshot,
            cycles,
            synthetic,
        } => run_monitor(config.as_deref(), &snapshot, cycles, synthetic),
        Commands::Positions {
            snapshot,
            config,
            open,
        } => run_positions(&snapshot, config.as_deref(), open),
        Commands::Stats {
            snapshot,
            config,
            symbol,
            reset,
        } => run_stats(&snapshot, config.as_deref(), symbol.as_deref(), reset),
        Commands::Alerts {
            snapshot,
            config,
            limit,
            clear,
        } => run_alerts(&snapshot, config.as_deref(), limit, clear),
        Commands::Close {
            snapshot,
            config,
            symbol,
            price,
        } => run_close(&snapshot, config.as_deref(), &symbol, price),
    }
}

fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    match path {
        Some(path) => MonitorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(MonitorConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_desk(snapshot: &Path, config: &MonitorConfig) -> Result<TradingDesk> {
    let state = load_state(snapshot, config)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;
    Ok(TradingDesk::new(config.oscillator, state))
}

fn save_desk(desk: &TradingDesk, snapshot: &Path, config: &MonitorConfig) -> Result<()> {
    save_state(snapshot, &desk.export_state(), config)
        .with_context(|| format!("saving snapshot {}", snapshot.display()))
}

fn run_signal(csv: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let candles = load_csv(csv)?;
    print_json(&compute_signal(&candles, &config.oscillator))
}

/// One chart point; undefined values print as `null`.
#[derive(Serialize)]
struct ChartPoint {
    timestamp: i64,
    close: f64,
    rsi: f64,
    ha_open: f64,
    ha_high: f64,
    ha_low: f64,
    ha_close: f64,
}

fn run_chart(csv: &Path, config: Option<&Path>, limit: usize) -> Result<()> {
    let config = load_config(config)?;
    let candles = load_csv(csv)?;
    let rows = compute_oscillator(&candles, &config.oscillator);
    let start = rows.len().saturating_sub(limit);
    let points: Vec<ChartPoint> = rows[start..]
        .iter()
        .map(|row| ChartPoint {
            timestamp: row.timestamp,
            close: row.close,
            rsi: row.rsi,
            ha_open: row.ha.open,
            ha_high: row.ha.high,
            ha_low: row.ha.low,
            ha_close: row.ha.close,
        })
        .collect();
    print_json(&points)
}

fn run_replay(
    csv: &Path,
    symbol: &str,
    config: Option<&Path>,
    snapshot: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let symbol = normalize_symbol(symbol);
    let candles = load_csv(csv)?;
    let desk = match snapshot {
        Some(path) => open_desk(path, &config)?,
        None => TradingDesk::from_config(&config),
    };

    let mut actions = 0usize;
    for end in 1..=candles.len() {
        let report = desk.evaluate(&symbol, &candles[..end])?;
        if report.outcome.action == StrategyAction::None {
            continue;
        }
        actions += 1;
        let when = candles[end - 1].datetime().map_or_else(
            || report.candle_timestamp.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        );
        let action = format!("{:?}", report.outcome.action);
        println!("{when}  {action:<11}  {}", report.outcome.message);
    }

    let stats = desk.statistics(Some(&symbol));
    println!();
    println!(
        "{symbol}: {} candles, {actions} actions, {} trades, win rate {:.1}% ({} wins / {} losses), total pnl {:+.2}%",
        candles.len(),
        stats.total,
        stats.win_rate,
        stats.wins,
        stats.losses,
        stats.total_pnl
    );

    if let Some(path) = snapshot {
        save_desk(&desk, path, &config)?;
        println!("Snapshot saved to: {}", path.display());
    }
    Ok(())
}

/// Prints every alert in chat form on stdout.
struct StdoutSink;

impl AlertSink for StdoutSink {
    fn deliver(&self, alert: &Alert) {
        println!("{}\n", format_alert(alert));
    }
}

fn run_monitor(
    config_path: Option<&Path>,
    snapshot: &Path,
    cycles: Option<usize>,
    synthetic: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let desk = open_desk(snapshot, &config)?;
    let source = CandleSource::from_config(&config, synthetic);
    let sinks: [&dyn AlertSink; 2] = [&LogSink, &StdoutSink];

    info!(
        symbols = config.monitor.symbols.len(),
        timeframe = %config.monitor.timeframe,
        interval_secs = config.monitor.interval_secs,
        synthetic,
        "monitor started"
    );

    let mut cycle = 0usize;
    loop {
        run_cycle(&desk, &config, &source, cycle, &sinks);
        save_desk(&desk, snapshot, &config)?;
        cycle += 1;
        if cycles.is_some_and(|n| cycle >= n) {
            break;
        }
        std::thread::sleep(Duration::from_secs(config.monitor.interval_secs));
    }

    let status = desk.status();
    info!(
        cycles = cycle,
        open_positions = status.open_positions,
        total_positions = status.total_positions,
        alerts = status.alerts,
        "monitor stopped"
    );
    Ok(())
}

fn run_positions(snapshot: &Path, config: Option<&Path>, open: bool) -> Result<()> {
    let config = load_config(config)?;
    let desk = open_desk(snapshot, &config)?;
    let positions = if open {
        desk.open_positions()
    } else {
        desk.positions()
    };
    print_json(&positions)
}

fn run_stats(
    snapshot: &Path,
    config: Option<&Path>,
    symbol: Option<&str>,
    reset: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let desk = open_desk(snapshot, &config)?;
    let symbol = symbol.map(normalize_symbol);

    if reset {
        desk.reset_statistics(symbol.as_deref());
        save_desk(&desk, snapshot, &config)?;
        println!("Statistics reset for {}", symbol.as_deref().unwrap_or("all symbols"));
        return Ok(());
    }
    print_json(&desk.statistics(symbol.as_deref()))
}

fn run_alerts(snapshot: &Path, config: Option<&Path>, limit: usize, clear: bool) -> Result<()> {
    let config = load_config(config)?;
    let desk = open_desk(snapshot, &config)?;

    if clear {
        desk.clear_alerts();
        save_desk(&desk, snapshot, &config)?;
        println!("Alert history cleared");
        return Ok(());
    }
    print_json(&desk.alerts(limit))
}

fn run_close(snapshot: &Path, config: Option<&Path>, symbol: &str, price: f64) -> Result<()> {
    if !(price.is_finite() && price > 0.0) {
        bail!("--price must be a positive number, got {price}");
    }
    let config = load_config(config)?;
    let desk = open_desk(snapshot, &config)?;
    let outcome = desk.close_position(&normalize_symbol(symbol), price)?;
    save_desk(&desk, snapshot, &config)?;
    print_json(&outcome)
}
