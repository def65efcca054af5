//! End-to-end replay: candles → signal → coordinator → positions, statistics, alerts.

use harsi_core::domain::{AlertKind, Candle, ExitReason, PositionStatus};
use harsi_core::oscillator::OscillatorParams;
use harsi_core::signals::compute_signal;
use harsi_core::trading::{AlertLog, PositionManager, RiskSettings, StrategyAction, TradingStrategy};

const SYMBOL: &str = "BTC/USDT";

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                1_704_067_200_000 + i as i64 * 900_000,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// Chop between 100.0 and 100.5, a steady decline into oversold, a bounce
/// that confirms a buy at index 28, then a rally through the 3% target.
fn bounce_and_rally() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..20).map(|i| if i % 2 == 1 { 100.5 } else { 100.0 }).collect();
    closes.extend((1..=8).map(|i| 100.0 - i as f64));
    closes.extend([92.5, 93.5, 94.5, 95.5]);
    closes
}

/// Replay every growing window through the coordinator, returning the actions.
fn replay(
    candles: &[Candle],
    positions: &mut PositionManager,
    alerts: &mut AlertLog,
) -> Vec<(usize, StrategyAction)> {
    let params = OscillatorParams::default();
    let mut actions = Vec::new();
    for end in 1..=candles.len() {
        let window = &candles[..end];
        let last = window[end - 1];
        let signal = compute_signal(window, &params);
        let outcome = TradingStrategy::new(positions, alerts).process_signal(
            SYMBOL,
            &signal,
            last.close,
            Some(last.timestamp),
        );
        if outcome.action != StrategyAction::None {
            actions.push((end - 1, outcome.action));
        }
    }
    actions
}

#[test]
fn bounce_entry_then_take_profit() {
    let candles = candles_from_closes(&bounce_and_rally());
    let mut positions = PositionManager::new(RiskSettings::default());
    let mut alerts = AlertLog::default();

    let actions = replay(&candles, &mut positions, &mut alerts);
    assert_eq!(
        actions,
        vec![(28, StrategyAction::EntryLong), (31, StrategyAction::Exit)]
    );

    let position = positions.get_position(SYMBOL).unwrap();
    assert_eq!(position.status, PositionStatus::Closed);
    assert_eq!(position.entry_price, 92.5);
    assert_eq!(position.exit_price, Some(95.5));
    assert_eq!(position.exit_reason, Some(ExitReason::TakeProfit));

    let stats = positions.statistics(SYMBOL);
    assert_eq!(stats.total, 1);
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.win_rate, 100.0);

    let recent = alerts.recent(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].kind, AlertKind::Info);
    assert_eq!(recent[0].message, "Position closed: TAKE_PROFIT");
    assert_eq!(recent[1].kind, AlertKind::Buy);
    assert!(recent[1].message.starts_with("BUY: BTC/USDT at $92.5000"));
    assert!(recent[1].message.contains("(oversold) + bullish reversal"));
}

#[test]
fn reevaluating_the_entry_candle_does_not_reenter() {
    let closes = bounce_and_rally();
    let candles = candles_from_closes(&closes[..29]);
    let params = OscillatorParams::default();
    let last = candles[28];
    let signal = compute_signal(&candles, &params);
    assert!(signal.is_confirmed());

    let mut positions = PositionManager::new(RiskSettings::default());
    let mut alerts = AlertLog::default();
    let mut strategy = TradingStrategy::new(&mut positions, &mut alerts);

    let first = strategy.process_signal(SYMBOL, &signal, last.close, Some(last.timestamp));
    assert_eq!(first.action, StrategyAction::EntryLong);

    strategy.close_manually(SYMBOL, last.close).unwrap();

    let again = strategy.process_signal(SYMBOL, &signal, last.close, Some(last.timestamp));
    assert_eq!(again.action, StrategyAction::None);
    assert!(again.alert.is_none());

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts.recent(1)[0].message, "Position closed manually");
    // Closed flat on a manual exit: counted as a loss
    assert_eq!(positions.statistics(SYMBOL).losses, 1);
}

#[test]
fn symbols_are_independent() {
    let closes = bounce_and_rally();
    let candles = candles_from_closes(&closes[..29]);
    let signal = compute_signal(&candles, &OscillatorParams::default());
    let ts = candles[28].timestamp;

    let mut positions = PositionManager::new(RiskSettings::default());
    let mut alerts = AlertLog::default();
    let mut strategy = TradingStrategy::new(&mut positions, &mut alerts);
    for symbol in ["BTC/USDT", "ETH/USDT", "SOL/USDT"] {
        let outcome = strategy.process_signal(symbol, &signal, 92.5, Some(ts));
        assert_eq!(outcome.action, StrategyAction::EntryLong, "{symbol}");
    }
    assert_eq!(positions.open_positions().len(), 3);
    assert_eq!(alerts.len(), 3);
}
