//! Alert rendering and delivery.
//!
//! Messages are built from the structured alert payload; nothing here parses
//! the coordinator's message text.

use tracing::info;

use harsi_core::domain::{Alert, AlertKind, PositionStatus};

/// Something that forwards alerts to a human.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: &Alert);
}

/// Emits every alert as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn deliver(&self, alert: &Alert) {
        info!(
            symbol = %alert.symbol,
            kind = alert.kind.as_str(),
            message = %alert.message,
            "alert"
        );
    }
}

fn badge(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Buy => "🟢",
        AlertKind::Sell => "🔴",
        AlertKind::Info => "ℹ️",
    }
}

/// Render an alert as a chat message.
///
/// ```text
/// 🟢 [BUY] BTC/USDT
///
/// BUY: BTC/USDT at $100.0000 | ...
///
/// Entry 100.0000 | Stop 98.0000 | Target 103.0000 | OPEN
/// Win rate 50.0% (1 wins / 1 losses)
/// 🕐 01/01/2024 12:00:00 UTC
/// ```
pub fn format_alert(alert: &Alert) -> String {
    let position = &alert.data.position;
    let stats = &alert.data.statistics;

    let mut out = format!(
        "{} [{}] {}\n\n{}\n\n",
        badge(alert.kind),
        alert.kind.as_str(),
        alert.symbol,
        alert.message
    );

    out.push_str(&format!(
        "Entry {:.4} | Stop {:.4} | Target {:.4}",
        position.entry_price, position.stop_loss, position.take_profit
    ));
    match (position.status, position.exit_price) {
        (PositionStatus::Closed, Some(exit)) => out.push_str(&format!(
            " | CLOSED at {exit:.4} ({:+.2}%)",
            position.pnl_pct
        )),
        _ => out.push_str(" | OPEN"),
    }
    out.push('\n');

    if stats.total > 0 {
        out.push_str(&format!(
            "Win rate {:.1}% ({} wins / {} losses)\n",
            stats.win_rate, stats.wins, stats.losses
        ));
    }

    out.push_str(&format!(
        "🕐 {}",
        alert.timestamp.format("%d/%m/%Y %H:%M:%S UTC")
    ));
    out
}
