//! HARSI Runner — multi-symbol monitoring on top of `harsi-core`.
//!
//! This crate provides:
//! - TOML configuration with validation and a settings fingerprint
//! - Candle loading from per-symbol CSV files or seeded synthetic series
//! - A thread-safe trading desk holding positions, statistics and alerts
//! - Monitor cycles that evaluate every symbol and deliver new alerts
//! - JSON snapshots so desk state survives restarts

pub mod config;
pub mod data_loader;
pub mod desk;
pub mod monitor;
pub mod notify;
pub mod snapshot;

pub use config::{ConfigError, MonitorConfig, DEFAULT_SYMBOLS};
pub use data_loader::{
    load_csv, load_symbol, normalize_symbol, synthetic_candles, LoadError, SyntheticWalk,
};
pub use desk::{DeskState, DeskStatus, EvaluationError, SymbolReport, TradingDesk};
pub use monitor::{run_cycle, CandleSource, CycleSummary};
pub use notify::{format_alert, AlertSink, LogSink};
pub use snapshot::{Snapshot, SnapshotError};
