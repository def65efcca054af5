//! Strategy coordinator — turns a classified signal plus position state into an
//! entry, an exit, or nothing.
//!
//! Per symbol, per evaluation cycle:
//! - open position: exit conditions are checked first; an exit ends the cycle
//!   even if the new signal would also enter
//! - no open position: only confirmed signals (strength >= 3) open a position,
//!   and only once per candle when a candle timestamp is supplied

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::alerts::AlertLog;
use super::positions::PositionManager;
use crate::domain::{Alert, AlertData, AlertKind, Direction, ExitReason, Position, Statistics};
use crate::error::TradingError;
use crate::signals::{Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyAction {
    None,
    EntryLong,
    EntryShort,
    Exit,
}

/// What the coordinator did with one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub action: StrategyAction,
    pub message: String,
    pub position: Option<Position>,
    pub alert: Option<Alert>,
}

impl StrategyOutcome {
    fn idle(position: Option<Position>) -> Self {
        Self {
            action: StrategyAction::None,
            message: String::new(),
            position,
            alert: None,
        }
    }
}

/// Coordinator over borrowed position and alert state.
pub struct TradingStrategy<'a> {
    positions: &'a mut PositionManager,
    alerts: &'a mut AlertLog,
}

impl<'a> TradingStrategy<'a> {
    pub fn new(positions: &'a mut PositionManager, alerts: &'a mut AlertLog) -> Self {
        Self { positions, alerts }
    }

    /// Apply one signal for `symbol` at `current_price`.
    pub fn process_signal(
        &mut self,
        symbol: &str,
        signal: &Signal,
        current_price: f64,
        candle_timestamp: Option<i64>,
    ) -> StrategyOutcome {
        if self.positions.has_open_position(symbol) {
            if let Some(closed) = self.positions.check_exit_conditions(symbol, current_price) {
                let reason = closed.exit_reason.unwrap_or(ExitReason::Signal);
                let message = format!("Position closed: {}", reason.as_str());
                return self.exit_outcome(symbol, closed, message);
            }
            let held = self.positions.mark_price(symbol, current_price).cloned();
            return StrategyOutcome::idle(held);
        }

        if !signal.is_confirmed() {
            return StrategyOutcome::idle(None);
        }
        let (direction, kind, action) = match signal.kind {
            SignalKind::Buy => (Direction::Long, AlertKind::Buy, StrategyAction::EntryLong),
            SignalKind::Sell => (Direction::Short, AlertKind::Sell, StrategyAction::EntryShort),
            SignalKind::None => return StrategyOutcome::idle(None),
        };

        if let Some(ts) = candle_timestamp {
            if !self.alerts.should_alert(symbol, ts) {
                debug!(symbol, candle_timestamp = ts, "entry already handled for candle");
                return StrategyOutcome::idle(None);
            }
        }

        let position = self.positions.open_position(
            symbol,
            direction,
            current_price,
            signal.strength,
            &signal.message,
        );
        let statistics = self.positions.statistics(symbol);
        let message = entry_message(
            &position,
            self.positions.risk().stop_loss_pct,
            self.positions.risk().take_profit_pct,
            &signal.message,
            &statistics,
        );
        let alert = self.alerts.record(
            symbol,
            kind,
            message.clone(),
            AlertData {
                position: position.clone(),
                statistics,
            },
            candle_timestamp,
        );

        StrategyOutcome {
            action,
            message,
            position: Some(position),
            alert: Some(alert),
        }
    }

    /// Close an open position at `price` on request.
    pub fn close_manually(
        &mut self,
        symbol: &str,
        price: f64,
    ) -> Result<StrategyOutcome, TradingError> {
        if !self.positions.has_open_position(symbol) {
            return Err(TradingError::NoOpenPosition(symbol.to_string()));
        }
        let closed = self
            .positions
            .close_position(symbol, price, ExitReason::Manual)?;
        Ok(self.exit_outcome(symbol, closed, "Position closed manually".to_string()))
    }

    fn exit_outcome(&mut self, symbol: &str, closed: Position, message: String) -> StrategyOutcome {
        let alert = self.alerts.record(
            symbol,
            AlertKind::Info,
            message.clone(),
            AlertData {
                position: closed.clone(),
                statistics: self.positions.statistics(symbol),
            },
            None,
        );
        StrategyOutcome {
            action: StrategyAction::Exit,
            message,
            position: Some(closed),
            alert: Some(alert),
        }
    }
}

fn entry_message(
    position: &Position,
    stop_loss_pct: f64,
    take_profit_pct: f64,
    signal_message: &str,
    statistics: &Statistics,
) -> String {
    let (label, sl_sign, tp_sign) = match position.direction {
        Direction::Long => ("BUY", '-', '+'),
        Direction::Short => ("SELL", '+', '-'),
    };
    let mut message = format!(
        "{label}: {} at ${:.4} | SL: ${:.4} ({sl_sign}{stop_loss_pct}%) | TP: ${:.4} ({tp_sign}{take_profit_pct}%) | {signal_message}",
        position.symbol, position.entry_price, position.stop_loss, position.take_profit,
    );
    if statistics.total > 0 {
        message.push_str(&format!(
            " | win rate {:.1}% ({} wins / {} losses)",
            statistics.win_rate, statistics.wins, statistics.losses
        ));
    }
    message
}
