//! Trading desk — shared position and alert state for many symbols.
//!
//! Signals are computed without holding any lock. Everything that touches
//! positions, statistics or alerts goes through one mutex, so updates across
//! symbols are serialized and a symbol's exit check and entry decision never
//! interleave with another caller's.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use harsi_core::domain::{Alert, Candle, Position, Statistics};
use harsi_core::oscillator::OscillatorParams;
use harsi_core::signals::{compute_signal, Signal};
use harsi_core::trading::{
    AlertLog, PositionManager, RiskSettings, StrategyAction, StrategyOutcome, TradingStrategy,
};
use harsi_core::{ParamError, TradingError};

use crate::config::MonitorConfig;

/// Errors from evaluating one symbol. Other symbols in the cycle are unaffected.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no candles for '{0}': no signal computable this cycle")]
    NoData(String),

    #[error(transparent)]
    Load(#[from] crate::data_loader::LoadError),
}

/// Mutable trading state guarded by the desk's lock.
#[derive(Debug, Clone, Default)]
pub struct DeskState {
    pub positions: PositionManager,
    pub alerts: AlertLog,
}

/// Result of evaluating one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub price: f64,
    pub candle_timestamp: i64,
    pub signal: Signal,
    pub outcome: StrategyOutcome,
    pub evaluated_at: DateTime<Utc>,
}

/// Desk summary for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskStatus {
    pub open_positions: usize,
    pub total_positions: usize,
    pub alerts: usize,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct TradingDesk {
    params: OscillatorParams,
    state: Mutex<DeskState>,
    last_update: Mutex<Option<DateTime<Utc>>>,
}

impl TradingDesk {
    pub fn new(params: OscillatorParams, state: DeskState) -> Self {
        Self {
            params,
            state: Mutex::new(state),
            last_update: Mutex::new(None),
        }
    }

    /// Fresh desk for a configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.oscillator,
            DeskState {
                positions: PositionManager::new(config.risk),
                alerts: AlertLog::with_capacity(config.alerts.capacity),
            },
        )
    }

    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    // Poisoning is ignored: every mutation under the lock is a single map update.
    fn state(&self) -> MutexGuard<'_, DeskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compute the latest signal for `symbol` and apply it at the last close.
    pub fn evaluate(&self, symbol: &str, candles: &[Candle]) -> Result<SymbolReport, EvaluationError> {
        let last = candles
            .last()
            .copied()
            .ok_or_else(|| EvaluationError::NoData(symbol.to_string()))?;

        let signal = compute_signal(candles, &self.params);

        let outcome = {
            let mut guard = self.state();
            let DeskState { positions, alerts } = &mut *guard;
            TradingStrategy::new(positions, alerts).process_signal(
                symbol,
                &signal,
                last.close,
                Some(last.timestamp),
            )
        };

        if outcome.action == StrategyAction::None {
            debug!(symbol, kind = %signal.kind, strength = signal.strength, "no action");
        } else {
            info!(symbol, action = ?outcome.action, message = %outcome.message, "strategy action");
        }

        let evaluated_at = Utc::now();
        *self.last_update.lock().unwrap_or_else(PoisonError::into_inner) = Some(evaluated_at);

        Ok(SymbolReport {
            symbol: symbol.to_string(),
            price: last.close,
            candle_timestamp: last.timestamp,
            signal,
            outcome,
            evaluated_at,
        })
    }

    /// Evaluate many symbols in parallel. Results keep the input order.
    pub fn evaluate_all(
        &self,
        feeds: &[(String, Vec<Candle>)],
    ) -> Vec<(String, Result<SymbolReport, EvaluationError>)> {
        feeds
            .par_iter()
            .map(|(symbol, candles)| (symbol.clone(), self.evaluate(symbol, candles)))
            .collect()
    }

    pub fn status(&self) -> DeskStatus {
        let state = self.state();
        DeskStatus {
            open_positions: state.positions.open_positions().len(),
            total_positions: state.positions.all_positions().len(),
            alerts: state.alerts.len(),
            last_update: *self.last_update.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn position(&self, symbol: &str) -> Option<Position> {
        self.state().positions.get_position(symbol).cloned()
    }

    /// Every tracked record, open and closed, ordered by symbol.
    pub fn positions(&self) -> Vec<Position> {
        self.state().positions.all_positions().into_iter().cloned().collect()
    }

    pub fn open_positions(&self) -> Vec<Position> {
        self.state().positions.open_positions().into_iter().cloned().collect()
    }

    /// One symbol's statistics, or all symbols aggregated when `symbol` is `None`.
    pub fn statistics(&self, symbol: Option<&str>) -> Statistics {
        let state = self.state();
        match symbol {
            Some(symbol) => state.positions.statistics(symbol),
            None => state.positions.aggregate_statistics(),
        }
    }

    pub fn all_statistics(&self) -> BTreeMap<String, Statistics> {
        self.state().positions.all_statistics().clone()
    }

    pub fn reset_statistics(&self, symbol: Option<&str>) {
        self.state().positions.reset_statistics(symbol);
        info!(symbol = symbol.unwrap_or("*"), "statistics reset");
    }

    /// Up to `limit` alerts, newest first.
    pub fn alerts(&self, limit: usize) -> Vec<Alert> {
        self.state().alerts.recent(limit).into_iter().cloned().collect()
    }

    pub fn clear_alerts(&self) {
        self.state().alerts.clear();
    }

    /// Close an open position on request and record an INFO alert.
    pub fn close_position(&self, symbol: &str, price: f64) -> Result<StrategyOutcome, TradingError> {
        let mut guard = self.state();
        let DeskState { positions, alerts } = &mut *guard;
        TradingStrategy::new(positions, alerts).close_manually(symbol, price)
    }

    pub fn risk(&self) -> RiskSettings {
        self.state().positions.risk()
    }

    /// Change stop/target distances for future entries.
    pub fn set_risk(&self, risk: RiskSettings) -> Result<(), ParamError> {
        risk.validate()?;
        self.state().positions.set_risk(risk);
        info!(
            stop_loss_pct = risk.stop_loss_pct,
            take_profit_pct = risk.take_profit_pct,
            "risk settings updated"
        );
        Ok(())
    }

    /// Copy of the current state, for snapshots.
    pub fn export_state(&self) -> DeskState {
        self.state().clone()
    }

    pub fn into_state(self) -> DeskState {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
