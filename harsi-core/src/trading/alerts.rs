//! Bounded, most-recent-first alert history with per-symbol candle de-duplication.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;

use crate::domain::{Alert, AlertData, AlertKind};

/// Default number of alerts retained.
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

/// Default number of alerts returned by `recent` callers that don't pick a limit.
pub const DEFAULT_ALERT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct AlertLog {
    capacity: usize,
    alerts: VecDeque<Alert>,
    /// Candle timestamp (epoch ms) of the last alert recorded per symbol.
    last_alert_candle: HashMap<String, i64>,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ALERT_CAPACITY)
    }
}

impl AlertLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            alerts: VecDeque::with_capacity(capacity + 1),
            last_alert_candle: HashMap::new(),
        }
    }

    /// Rebuild a log from saved alerts (newest first) and de-duplication stamps.
    pub fn from_parts(
        capacity: usize,
        alerts: Vec<Alert>,
        last_alert_candle: HashMap<String, i64>,
    ) -> Self {
        let mut alerts = VecDeque::from(alerts);
        alerts.truncate(capacity);
        Self {
            capacity,
            alerts,
            last_alert_candle,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True unless an alert was already recorded for this symbol on this candle.
    pub fn should_alert(&self, symbol: &str, candle_timestamp: i64) -> bool {
        self.last_alert_candle
            .get(symbol)
            .map_or(true, |&last| last != candle_timestamp)
    }

    /// Prepend an alert, evicting the oldest entries beyond capacity.
    ///
    /// A supplied candle timestamp becomes the symbol's de-duplication stamp.
    pub fn record(
        &mut self,
        symbol: &str,
        kind: AlertKind,
        message: impl Into<String>,
        data: AlertData,
        candle_timestamp: Option<i64>,
    ) -> Alert {
        let alert = Alert {
            timestamp: Utc::now(),
            symbol: symbol.to_string(),
            kind,
            message: message.into(),
            data,
        };

        if let Some(ts) = candle_timestamp {
            self.last_alert_candle.insert(symbol.to_string(), ts);
        }

        self.alerts.push_front(alert.clone());
        self.alerts.truncate(self.capacity);
        alert
    }

    /// Up to `limit` alerts, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Alert> {
        self.alerts.iter().take(limit).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn last_alert_candles(&self) -> &HashMap<String, i64> {
        &self.last_alert_candle
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Drop the history. De-duplication stamps survive so a cleared log does not
    /// re-alert on the candle it already handled.
    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}
