//! Signal classification — oscillator rows in, one prioritized signal out.
//!
//! Signals are position-agnostic: they see candles and oscillator output only.
//! Position state is the strategy coordinator's concern.

pub mod classifier;
pub mod signal;

pub use classifier::{classify, SignalRow};
pub use signal::{
    analyze, compute_signal, reduce_latest, Analysis, Signal, SignalKind, CONFIRMED_STRENGTH,
};
