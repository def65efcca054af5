//! Position — one tracked trade per symbol, from entry signal to exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Signed percentage move from `entry` to `price`, positive when the move favours
    /// this direction.
    pub fn pnl_pct(self, entry: f64, price: f64) -> f64 {
        match self {
            Direction::Long => (price - entry) / entry * 100.0,
            Direction::Short => (entry - price) / entry * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Manual,
    Signal,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::Manual => "MANUAL",
            ExitReason::Signal => "SIGNAL",
        }
    }
}

/// A position record. Mutated in place on exit, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub signal_strength: u8,
    pub entry_time: DateTime<Utc>,
    pub status: PositionStatus,
    /// Message of the signal that opened the position.
    pub message: String,
    /// Last price observed while the position was open.
    #[serde(default)]
    pub current_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_reason: Option<ExitReason>,
    pub pnl_pct: f64,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Direction-aware percentage PnL if the position were marked at `price`.
    pub fn pnl_pct_at(&self, price: f64) -> f64 {
        self.direction.pnl_pct(self.entry_price, price)
    }

    /// True if `price` breaches the stop level for this direction.
    pub fn stop_hit(&self, price: f64) -> bool {
        match self.direction {
            Direction::Long => price <= self.stop_loss,
            Direction::Short => price >= self.stop_loss,
        }
    }

    /// True if `price` reaches the take-profit level for this direction.
    pub fn target_hit(&self, price: f64) -> bool {
        match self.direction {
            Direction::Long => price >= self.take_profit,
            Direction::Short => price <= self.take_profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position(direction: Direction) -> Position {
        let (stop_loss, take_profit) = match direction {
            Direction::Long => (98.0, 103.0),
            Direction::Short => (102.0, 97.0),
        };
        Position {
            symbol: "BTC/USDT".into(),
            direction,
            entry_price: 100.0,
            stop_loss,
            take_profit,
            signal_strength: 3,
            entry_time: Utc::now(),
            status: PositionStatus::Open,
            message: String::new(),
            current_price: None,
            exit_price: None,
            exit_time: None,
            exit_reason: None,
            pnl_pct: 0.0,
        }
    }

    #[test]
    fn pnl_is_direction_aware() {
        assert!((sample_position(Direction::Long).pnl_pct_at(110.0) - 10.0).abs() < 1e-10);
        assert!((sample_position(Direction::Short).pnl_pct_at(110.0) + 10.0).abs() < 1e-10);
    }

    #[test]
    fn long_levels() {
        let pos = sample_position(Direction::Long);
        assert!(pos.stop_hit(98.0));
        assert!(!pos.stop_hit(98.5));
        assert!(pos.target_hit(103.0));
        assert!(!pos.target_hit(102.9));
    }

    #[test]
    fn short_levels() {
        let pos = sample_position(Direction::Short);
        assert!(pos.stop_hit(102.0));
        assert!(!pos.stop_hit(101.0));
        assert!(pos.target_hit(97.0));
        assert!(!pos.target_hit(97.5));
    }

    #[test]
    fn enums_use_screaming_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&ExitReason::TakeProfit).unwrap(),
            "\"TAKE_PROFIT\""
        );
        assert_eq!(serde_json::to_string(&Direction::Short).unwrap(), "\"SHORT\"");
        assert_eq!(ExitReason::StopLoss.as_str(), "STOP_LOSS");
    }
}
