//! Reduction of the latest classified row to a single prioritized signal.
//!
//! Priority, first match wins:
//! 1. confirmed buy / confirmed sell            → strength 3
//! 2. extreme lower cross / extreme upper cross → strength 2
//! 3. lower zone cross / upper zone cross       → strength 1 (zone alert)
//! 4. RSI reversal outside the opposite zone    → strength 1
//! 5. nothing                                   → NONE, strength 0

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::{classify, SignalRow};
use crate::domain::Candle;
use crate::oscillator::{compute_oscillator, OscillatorParams, OscillatorRow};

/// Strength at which a signal is a confirmed zone reversal.
pub const CONFIRMED_STRENGTH: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    None,
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::None => "NONE",
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
        };
        f.write_str(s)
    }
}

/// Signal for the latest candle.
///
/// `strength` is a priority rank (0–3), not a confidence. Oscillator values are
/// NaN while the series is still warming up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub strength: u8,
    pub message: String,
    pub rsi_value: f64,
    pub ha_open: f64,
    pub ha_close: f64,
    pub ha_bullish: bool,
    pub price: f64,
}

impl Signal {
    /// A NONE signal with no oscillator context.
    pub fn none(message: impl Into<String>) -> Self {
        Self {
            kind: SignalKind::None,
            strength: 0,
            message: message.into(),
            rsi_value: f64::NAN,
            ha_open: f64::NAN,
            ha_close: f64::NAN,
            ha_bullish: false,
            price: f64::NAN,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.kind != SignalKind::None && self.strength >= CONFIRMED_STRENGTH
    }
}

/// Full oscillator and classifier output for a candle series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub rows: Vec<OscillatorRow>,
    pub flags: Vec<SignalRow>,
    pub latest: Signal,
}

/// Run the oscillator and classifier over `candles` and keep every row.
pub fn analyze(candles: &[Candle], params: &OscillatorParams) -> Analysis {
    let rows = compute_oscillator(candles, params);
    let flags = classify(&rows, params);
    let latest = reduce_latest(&rows, &flags, params);
    Analysis {
        rows,
        flags,
        latest,
    }
}

/// Signal for the latest candle. Pure; no state is touched.
pub fn compute_signal(candles: &[Candle], params: &OscillatorParams) -> Signal {
    analyze(candles, params).latest
}

/// Reduce the last row to a `Signal`.
pub fn reduce_latest(
    rows: &[OscillatorRow],
    flags: &[SignalRow],
    params: &OscillatorParams,
) -> Signal {
    let (Some(row), Some(flag)) = (rows.last(), flags.last()) else {
        return Signal::none("no data");
    };

    let rsi = row.rsi;
    let (kind, strength, message) = if flag.confirmed_buy {
        (
            SignalKind::Buy,
            3,
            format!("BUY: RSI at {rsi:.1} (oversold) + bullish reversal"),
        )
    } else if flag.confirmed_sell {
        (
            SignalKind::Sell,
            3,
            format!("SELL: RSI at {rsi:.1} (overbought) + bearish reversal"),
        )
    } else if flag.cross_lower_extreme {
        (
            SignalKind::Buy,
            2,
            format!("RSI crossed {} (extreme oversold)", params.lower_extreme),
        )
    } else if flag.cross_upper_extreme {
        (
            SignalKind::Sell,
            2,
            format!("RSI crossed {} (extreme overbought)", params.upper_extreme),
        )
    } else if flag.cross_lower {
        (
            SignalKind::Buy,
            1,
            format!("Alert: RSI crossed {} (awaiting reversal)", params.lower),
        )
    } else if flag.cross_upper {
        (
            SignalKind::Sell,
            1,
            format!("Alert: RSI crossed {} (awaiting reversal)", params.upper),
        )
    } else if flag.rsi_bull && rsi > params.lower {
        (
            SignalKind::Buy,
            1,
            "Bullish RSI reversal (outside oversold zone)".to_string(),
        )
    } else if flag.rsi_bear && rsi < params.upper {
        (
            SignalKind::Sell,
            1,
            "Bearish RSI reversal (outside overbought zone)".to_string(),
        )
    } else if rsi.is_nan() {
        (SignalKind::None, 0, "insufficient history".to_string())
    } else {
        (SignalKind::None, 0, String::new())
    };

    Signal {
        kind,
        strength,
        message,
        rsi_value: rsi,
        ha_open: row.ha.open,
        ha_close: row.ha.close,
        ha_bullish: flag.ha_bullish,
        price: row.close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, HaRsiBar};

    fn row(rsi: f64) -> OscillatorRow {
        OscillatorRow {
            timestamp: 0,
            close: 50.0,
            rsi,
            ha: HaRsiBar {
                open: -1.0,
                high: 2.0,
                low: -2.0,
                close: 1.0,
            },
        }
    }

    fn reduce(flag: SignalRow, rsi: f64) -> Signal {
        reduce_latest(&[row(rsi)], &[flag], &OscillatorParams::default())
    }

    #[test]
    fn empty_history_is_none() {
        let signal = compute_signal(&[], &OscillatorParams::default());
        assert_eq!(signal.kind, SignalKind::None);
        assert_eq!(signal.strength, 0);
        assert_eq!(signal.message, "no data");
    }

    #[test]
    fn short_history_is_none() {
        let candles = make_candles(&[100.0, 99.0, 98.0, 97.0, 99.0, 101.0]);
        let signal = compute_signal(&candles, &OscillatorParams::default());
        assert_eq!(signal.kind, SignalKind::None);
        assert_eq!(signal.strength, 0);
        assert_eq!(signal.message, "insufficient history");
        assert!(signal.rsi_value.is_nan());
        assert_eq!(signal.price, 101.0);
    }

    #[test]
    fn confirmed_beats_extreme_cross() {
        let flag = SignalRow {
            confirmed_buy: true,
            cross_upper_extreme: true,
            ..SignalRow::default()
        };
        let signal = reduce(flag, -25.0);
        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.strength, 3);
        assert!(signal.is_confirmed());
    }

    #[test]
    fn confirmed_buy_checked_before_confirmed_sell() {
        let flag = SignalRow {
            confirmed_buy: true,
            confirmed_sell: true,
            ..SignalRow::default()
        };
        assert_eq!(reduce(flag, 0.0).kind, SignalKind::Buy);
    }

    #[test]
    fn extreme_lower_before_extreme_upper() {
        let flag = SignalRow {
            cross_lower_extreme: true,
            cross_upper_extreme: true,
            ..SignalRow::default()
        };
        let signal = reduce(flag, -35.0);
        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.strength, 2);
        assert!(!signal.is_confirmed());
    }

    #[test]
    fn zone_alert_strength_one() {
        let flag = SignalRow {
            cross_upper: true,
            ..SignalRow::default()
        };
        let signal = reduce(flag, 22.0);
        assert_eq!(signal.kind, SignalKind::Sell);
        assert_eq!(signal.strength, 1);
        assert!(signal.message.contains("awaiting reversal"));
    }

    #[test]
    fn reversal_outside_zone() {
        let flag = SignalRow {
            rsi_bull: true,
            ..SignalRow::default()
        };
        assert_eq!(reduce(flag, -5.0).kind, SignalKind::Buy);
        // inside the lower zone, a bare edge without confirmation does not count here
        assert_eq!(reduce(flag, -20.0).kind, SignalKind::None);

        let flag = SignalRow {
            rsi_bear: true,
            ..SignalRow::default()
        };
        assert_eq!(reduce(flag, 5.0).kind, SignalKind::Sell);
        assert_eq!(reduce(flag, 20.0).kind, SignalKind::None);
    }

    #[test]
    fn carries_oscillator_context() {
        let flag = SignalRow {
            ha_bullish: true,
            ..SignalRow::default()
        };
        let signal = reduce(flag, 3.0);
        assert_eq!(signal.kind, SignalKind::None);
        assert_eq!(signal.message, "");
        assert_eq!(signal.rsi_value, 3.0);
        assert_eq!(signal.ha_open, -1.0);
        assert_eq!(signal.ha_close, 1.0);
        assert!(signal.ha_bullish);
        assert_eq!(signal.price, 50.0);
    }

    #[test]
    fn analysis_keeps_every_row() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.5).sin() * 3.0).collect();
        let analysis = analyze(&make_candles(&closes), &OscillatorParams::default());
        assert_eq!(analysis.rows.len(), 40);
        assert_eq!(analysis.flags.len(), 40);
        assert_eq!(analysis.latest.price, *closes.last().unwrap());
    }

    #[test]
    fn kind_display() {
        assert_eq!(SignalKind::Buy.to_string(), "BUY");
        assert_eq!(SignalKind::None.to_string(), "NONE");
    }
}
