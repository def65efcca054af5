//! HARSI Core — oscillator, signal classification, positions and alerts.
//!
//! This crate is the pure heart of the signal system:
//! - Domain types (candles, positions, statistics, alerts)
//! - Heikin-Ashi RSI oscillator over zero-centered RSI
//! - Signal classifier reducing the latest candle to a prioritized signal
//! - Position manager with percentage stop-loss / take-profit and win/loss statistics
//! - Bounded alert log with per-candle de-duplication
//! - Strategy coordinator tying signals to position and alert state
//!
//! No I/O happens here. Loading candles, scheduling and persistence live in
//! `harsi-runner`.

pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod oscillator;
pub mod signals;
pub mod trading;

pub use error::{ParamError, TradingError};
pub use oscillator::{compute_oscillator, OscillatorParams, OscillatorRow};
