//! Monitor cycles — load candles for every configured symbol, evaluate them on
//! the desk, and hand new alerts to the sinks.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use harsi_core::domain::Candle;
use harsi_core::trading::StrategyAction;

use crate::config::MonitorConfig;
use crate::data_loader::{load_symbol, synthetic_seed, LoadError, SyntheticWalk};
use crate::desk::{EvaluationError, SymbolReport, TradingDesk};
use crate::notify::AlertSink;

/// Starting price of synthetic series.
const SYNTHETIC_START_PRICE: f64 = 100.0;

/// Where a cycle's candles come from.
#[derive(Debug)]
pub enum CandleSource {
    /// One CSV per symbol, re-read every cycle.
    Csv { data_dir: PathBuf },
    /// Seeded random walk per symbol that advances one candle per cycle.
    Synthetic {
        feeds: Mutex<HashMap<String, SyntheticFeed>>,
    },
}

/// Rolling window over one symbol's synthetic walk.
#[derive(Debug)]
pub struct SyntheticFeed {
    walk: SyntheticWalk,
    window: VecDeque<Candle>,
    /// Cycle the window currently ends at.
    cycle: usize,
}

impl SyntheticFeed {
    fn new(symbol: &str, history: usize, cycle: usize) -> Self {
        let mut walk = SyntheticWalk::new(synthetic_seed(symbol), SYNTHETIC_START_PRICE);
        let window = (0..history + cycle).map(|_| walk.next_candle()).collect();
        let mut feed = Self { walk, window, cycle };
        feed.trim(history);
        feed
    }

    /// Step forward to `cycle`; earlier cycles leave the window as is.
    fn advance_to(&mut self, cycle: usize, history: usize) {
        while self.cycle < cycle {
            self.window.push_back(self.walk.next_candle());
            self.cycle += 1;
            self.trim(history);
        }
        self.trim(history);
    }

    fn trim(&mut self, history: usize) {
        while self.window.len() > history {
            self.window.pop_front();
        }
    }
}

impl CandleSource {
    pub fn from_config(config: &MonitorConfig, synthetic: bool) -> Self {
        if synthetic {
            CandleSource::synthetic()
        } else {
            CandleSource::Csv {
                data_dir: config.monitor.data_dir.clone(),
            }
        }
    }

    pub fn synthetic() -> Self {
        CandleSource::Synthetic {
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// The latest `history` candles for `symbol` as of `cycle`.
    pub fn fetch(&self, symbol: &str, history: usize, cycle: usize) -> Result<Vec<Candle>, LoadError> {
        match self {
            CandleSource::Csv { data_dir } => load_symbol(data_dir, symbol, history),
            CandleSource::Synthetic { feeds } => {
                let mut feeds = feeds.lock().unwrap_or_else(PoisonError::into_inner);
                let feed = feeds
                    .entry(symbol.to_string())
                    .or_insert_with(|| SyntheticFeed::new(symbol, history, cycle));
                feed.advance_to(cycle, history);
                Ok(feed.window.iter().copied().collect())
            }
        }
    }
}

/// What happened in one cycle.
#[derive(Debug, Default, Serialize)]
pub struct CycleSummary {
    pub cycle: usize,
    pub evaluated: usize,
    /// Reports whose outcome was an entry or exit.
    pub actions: Vec<SymbolReport>,
    /// Symbols that could not be evaluated, with the reason.
    pub failures: Vec<(String, String)>,
}

/// Run one evaluation cycle over every configured symbol.
pub fn run_cycle(
    desk: &TradingDesk,
    config: &MonitorConfig,
    source: &CandleSource,
    cycle: usize,
    sinks: &[&dyn AlertSink],
) -> CycleSummary {
    let history = config.monitor.history;
    let loaded: Vec<(String, Result<Vec<Candle>, LoadError>)> = config
        .monitor
        .symbols
        .par_iter()
        .map(|symbol| (symbol.clone(), source.fetch(symbol, history, cycle)))
        .collect();

    let mut summary = CycleSummary {
        cycle,
        ..CycleSummary::default()
    };
    let mut feeds = Vec::with_capacity(loaded.len());
    for (symbol, result) in loaded {
        match result {
            Ok(candles) => feeds.push((symbol, candles)),
            Err(e) => record_failure(&mut summary, symbol, EvaluationError::from(e)),
        }
    }

    for (symbol, result) in desk.evaluate_all(&feeds) {
        match result {
            Ok(report) => {
                summary.evaluated += 1;
                if let Some(alert) = &report.outcome.alert {
                    for sink in sinks {
                        sink.deliver(alert);
                    }
                }
                if report.outcome.action != StrategyAction::None {
                    summary.actions.push(report);
                }
            }
            Err(e) => record_failure(&mut summary, symbol, e),
        }
    }

    info!(
        cycle,
        evaluated = summary.evaluated,
        actions = summary.actions.len(),
        failures = summary.failures.len(),
        "cycle complete"
    );
    summary
}

fn record_failure(summary: &mut CycleSummary, symbol: String, error: EvaluationError) {
    warn!(symbol = %symbol, error = %error, "symbol skipped this cycle");
    summary.failures.push((symbol, error.to_string()));
}
