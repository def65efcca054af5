//! Position manager — per-symbol position records, exit checks and statistics.
//!
//! One record per symbol. Opening overwrites whatever record the symbol had;
//! the caller checks that nothing is open first. Closed records stay in place
//! for history until the next entry on that symbol replaces them.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Direction, ExitReason, Position, PositionStatus, Statistics};
use crate::error::{ParamError, TradingError};

/// Stop-loss and take-profit distances, in percent of entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.0,
            take_profit_pct: 3.0,
        }
    }
}

impl RiskSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamError::InvalidPercent { name, value });
            }
        }
        Ok(())
    }

    /// Stop below entry for longs, above entry for shorts.
    pub fn stop_loss_for(&self, entry_price: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => entry_price * (1.0 - self.stop_loss_pct / 100.0),
            Direction::Short => entry_price * (1.0 + self.stop_loss_pct / 100.0),
        }
    }

    /// Target above entry for longs, below entry for shorts.
    pub fn take_profit_for(&self, entry_price: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => entry_price * (1.0 + self.take_profit_pct / 100.0),
            Direction::Short => entry_price * (1.0 - self.take_profit_pct / 100.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionManager {
    risk: RiskSettings,
    positions: BTreeMap<String, Position>,
    statistics: BTreeMap<String, Statistics>,
}

impl PositionManager {
    pub fn new(risk: RiskSettings) -> Self {
        Self {
            risk,
            positions: BTreeMap::new(),
            statistics: BTreeMap::new(),
        }
    }

    /// Rebuild a manager from previously saved records.
    pub fn from_parts(
        risk: RiskSettings,
        positions: BTreeMap<String, Position>,
        statistics: BTreeMap<String, Statistics>,
    ) -> Self {
        Self {
            risk,
            positions,
            statistics,
        }
    }

    pub fn risk(&self) -> RiskSettings {
        self.risk
    }

    /// Change stop/target distances. Positions already open keep their levels.
    pub fn set_risk(&mut self, risk: RiskSettings) {
        self.risk = risk;
    }

    /// Open a position, replacing any record the symbol already had.
    pub fn open_position(
        &mut self,
        symbol: &str,
        direction: Direction,
        entry_price: f64,
        signal_strength: u8,
        message: &str,
    ) -> Position {
        let position = Position {
            symbol: symbol.to_string(),
            direction,
            entry_price,
            stop_loss: self.risk.stop_loss_for(entry_price, direction),
            take_profit: self.risk.take_profit_for(entry_price, direction),
            signal_strength,
            entry_time: Utc::now(),
            status: PositionStatus::Open,
            message: message.to_string(),
            current_price: None,
            exit_price: None,
            exit_time: None,
            exit_reason: None,
            pnl_pct: 0.0,
        };
        info!(
            symbol,
            ?direction,
            entry_price,
            stop_loss = position.stop_loss,
            take_profit = position.take_profit,
            "position opened"
        );
        self.positions.insert(symbol.to_string(), position.clone());
        position
    }

    /// Mark an open position at `current_price` and close it if a level is breached.
    ///
    /// Stop-loss is tested before take-profit. Returns the closed record when a
    /// level triggered, `None` otherwise (including when nothing is open). The
    /// stored `pnl_pct` is refreshed either way.
    pub fn check_exit_conditions(&mut self, symbol: &str, current_price: f64) -> Option<Position> {
        let position = self.positions.get_mut(symbol).filter(|p| p.is_open())?;
        position.pnl_pct = position.pnl_pct_at(current_price);

        let reason = if position.stop_hit(current_price) {
            ExitReason::StopLoss
        } else if position.target_hit(current_price) {
            ExitReason::TakeProfit
        } else {
            debug!(symbol, current_price, pnl_pct = position.pnl_pct, "position held");
            return None;
        };

        self.close_position(symbol, current_price, reason).ok()
    }

    /// Finalize a position and account for it in the symbol's statistics.
    ///
    /// Fails only when the symbol never had a position.
    pub fn close_position(
        &mut self,
        symbol: &str,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Result<Position, TradingError> {
        let position = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| TradingError::PositionNotFound(symbol.to_string()))?;

        position.pnl_pct = position.pnl_pct_at(exit_price);
        position.exit_price = Some(exit_price);
        position.exit_time = Some(Utc::now());
        position.exit_reason = Some(exit_reason);
        position.status = PositionStatus::Closed;

        let closed = position.clone();
        self.statistics
            .entry(symbol.to_string())
            .or_default()
            .record_close(exit_reason, closed.pnl_pct);

        info!(
            symbol,
            exit_price,
            reason = exit_reason.as_str(),
            pnl_pct = closed.pnl_pct,
            "position closed"
        );
        Ok(closed)
    }

    /// Record the latest observed price on an open position.
    pub fn mark_price(&mut self, symbol: &str, price: f64) -> Option<&Position> {
        let position = self.positions.get_mut(symbol).filter(|p| p.is_open())?;
        position.current_price = Some(price);
        Some(position)
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_open_position(&self, symbol: &str) -> bool {
        self.positions.get(symbol).is_some_and(Position::is_open)
    }

    /// Every tracked record, open and closed.
    pub fn all_positions(&self) -> Vec<&Position> {
        self.positions.values().collect()
    }

    pub fn open_positions(&self) -> Vec<&Position> {
        self.positions.values().filter(|p| p.is_open()).collect()
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    /// Statistics for one symbol; zeros if it never closed a trade.
    pub fn statistics(&self, symbol: &str) -> Statistics {
        self.statistics.get(symbol).copied().unwrap_or_default()
    }

    pub fn all_statistics(&self) -> &BTreeMap<String, Statistics> {
        &self.statistics
    }

    /// All symbols folded into one summary.
    pub fn aggregate_statistics(&self) -> Statistics {
        Statistics::aggregate(self.statistics.values())
    }

    /// Reset one symbol's statistics, or every symbol's when `symbol` is `None`.
    pub fn reset_statistics(&mut self, symbol: Option<&str>) {
        match symbol {
            Some(symbol) => {
                self.statistics.remove(symbol);
            }
            None => self.statistics.clear(),
        }
    }
}
