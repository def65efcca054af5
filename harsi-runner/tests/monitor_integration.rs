//! Integration tests: config file → CSV feeds → monitor cycles → snapshot restart.

use std::path::Path;
use std::sync::Mutex;

use harsi_core::domain::{Alert, AlertKind, ExitReason, PositionStatus};
use harsi_core::trading::StrategyAction;
use harsi_runner::snapshot::{load_state, save_state};
use harsi_runner::{
    format_alert, run_cycle, AlertSink, CandleSource, MonitorConfig, TradingDesk,
};

/// Chop between 100.0 and 100.5, a decline into oversold, the confirming
/// bounce at index 28, then a rally to 95.5, past the 3% target above 92.5.
fn closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..20).map(|i| if i % 2 == 1 { 100.5 } else { 100.0 }).collect();
    closes.extend((1..=8).map(|i| 100.0 - i as f64));
    closes.extend([92.5, 93.5, 94.5, 95.5]);
    closes
}

fn write_csv(dir: &Path, file: &str, closes: &[f64]) {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for (i, &close) in closes.iter().enumerate() {
        let open = if i == 0 { close } else { closes[i - 1] };
        text.push_str(&format!(
            "{},{open},{},{},{close},1000\n",
            1_704_067_200_000i64 + i as i64 * 900_000,
            open.max(close) + 1.0,
            open.min(close) - 1.0,
        ));
    }
    std::fs::write(dir.join(file), text).unwrap();
}

fn write_config(dir: &Path) -> MonitorConfig {
    let text = format!(
        r#"
[monitor]
symbols = ["BTC/USDT"]
history = 100
data_dir = "{}"

[risk]
stop_loss_pct = 2.0
take_profit_pct = 3.0
"#,
        dir.display()
    );
    let path = dir.join("harsi.toml");
    std::fs::write(&path, text).unwrap();
    MonitorConfig::from_file(&path).unwrap()
}

struct Rendered(Mutex<Vec<String>>);

impl AlertSink for Rendered {
    fn deliver(&self, alert: &Alert) {
        self.0.lock().unwrap().push(format_alert(alert));
    }
}

#[test]
fn entry_survives_restart_and_exits_on_target() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let source = CandleSource::from_config(&config, false);
    let snapshot_path = dir.path().join("state/desk.json");
    let rendered = Rendered(Mutex::new(Vec::new()));
    let all = closes();

    // First process: candles up to the bounce
    write_csv(dir.path(), "BTC-USDT.csv", &all[..29]);
    let desk = TradingDesk::from_config(&config);
    let summary = run_cycle(&desk, &config, &source, 0, &[&rendered]);
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.actions.len(), 1);
    assert_eq!(summary.actions[0].outcome.action, StrategyAction::EntryLong);

    // Same candle again: no duplicate entry
    let again = run_cycle(&desk, &config, &source, 1, &[&rendered]);
    assert!(again.actions.is_empty());
    save_state(&snapshot_path, &desk.into_state(), &config).unwrap();

    // Second process: restored desk sees the rally
    let state = load_state(&snapshot_path, &config).unwrap();
    let desk = TradingDesk::new(config.oscillator, state);
    assert_eq!(desk.open_positions().len(), 1);

    write_csv(dir.path(), "BTC-USDT.csv", &all);
    let summary = run_cycle(&desk, &config, &source, 2, &[&rendered]);
    assert_eq!(summary.actions.len(), 1);
    assert_eq!(summary.actions[0].outcome.action, StrategyAction::Exit);

    let position = desk.position("BTC/USDT").unwrap();
    assert_eq!(position.status, PositionStatus::Closed);
    assert_eq!(position.exit_reason, Some(ExitReason::TakeProfit));
    assert_eq!(position.exit_price, Some(95.5));

    let stats = desk.statistics(Some("BTC/USDT"));
    assert_eq!((stats.total, stats.wins, stats.losses), (1, 1, 0));

    let alerts = desk.alerts(10);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].kind, AlertKind::Info);
    assert_eq!(alerts[0].message, "Position closed: TAKE_PROFIT");
    assert_eq!(alerts[1].kind, AlertKind::Buy);

    let rendered = rendered.0.lock().unwrap();
    assert_eq!(rendered.len(), 2);
    assert!(rendered[0].starts_with("🟢 [BUY] BTC/USDT"));
    assert!(rendered[1].contains("CLOSED at 95.5000"));
}

#[test]
fn bad_config_is_rejected_before_any_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harsi.toml");
    std::fs::write(&path, "[risk]\nstop_loss_pct = -1.0\n").unwrap();
    let err = MonitorConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("[risk]"));
}

#[test]
fn synthetic_desk_keeps_statistics_consistent() {
    let mut config = MonitorConfig::default();
    config.monitor.history = 80;
    let desk = TradingDesk::from_config(&config);
    let source = CandleSource::synthetic();

    for cycle in 0..150 {
        let summary = run_cycle(&desk, &config, &source, cycle, &[]);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.evaluated, config.monitor.symbols.len());
    }

    let aggregate = desk.statistics(None);
    assert_eq!(aggregate.total, aggregate.wins + aggregate.losses);
    let per_symbol: u32 = desk.all_statistics().values().map(|s| s.total).sum();
    assert_eq!(per_symbol, aggregate.total);
    assert!(desk.open_positions().len() <= config.monitor.symbols.len());
}
