//! Win/loss statistics, updated incrementally once per closed position.

use serde::{Deserialize, Serialize};

use super::position::ExitReason;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
    /// Percentage of closed trades counted as wins (0–100).
    pub win_rate: f64,
    /// Sum of per-trade percentage PnL.
    pub total_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

impl Statistics {
    /// Account for one closed trade.
    ///
    /// A trade is a win when it exited at take-profit or closed with positive PnL.
    /// A flat exit (pnl == 0) outside take-profit is a loss.
    pub fn record_close(&mut self, exit_reason: ExitReason, pnl_pct: f64) {
        self.total += 1;
        self.total_pnl += pnl_pct;

        if is_win(exit_reason, pnl_pct) {
            self.wins += 1;
            self.avg_win = (self.avg_win * f64::from(self.wins - 1) + pnl_pct) / f64::from(self.wins);
        } else {
            self.losses += 1;
            self.avg_loss =
                (self.avg_loss * f64::from(self.losses - 1) + pnl_pct) / f64::from(self.losses);
        }

        self.win_rate = f64::from(self.wins) / f64::from(self.total) * 100.0;
    }

    /// Fold per-symbol statistics into a single summary.
    ///
    /// Averages are weighted by each symbol's win/loss counts, so the result equals
    /// what a single shared accumulator would have produced.
    pub fn aggregate<'a>(stats: impl IntoIterator<Item = &'a Statistics>) -> Statistics {
        let mut out = Statistics::default();
        let mut win_sum = 0.0;
        let mut loss_sum = 0.0;
        for s in stats {
            out.wins += s.wins;
            out.losses += s.losses;
            out.total += s.total;
            out.total_pnl += s.total_pnl;
            win_sum += s.avg_win * f64::from(s.wins);
            loss_sum += s.avg_loss * f64::from(s.losses);
        }
        if out.wins > 0 {
            out.avg_win = win_sum / f64::from(out.wins);
        }
        if out.losses > 0 {
            out.avg_loss = loss_sum / f64::from(out.losses);
        }
        if out.total > 0 {
            out.win_rate = f64::from(out.wins) / f64::from(out.total) * 100.0;
        }
        out
    }
}

fn is_win(exit_reason: ExitReason, pnl_pct: f64) -> bool {
    exit_reason == ExitReason::TakeProfit || pnl_pct > 0.0
}
