//! Desk persistence — JSON snapshots of positions, statistics and alerts.
//!
//! A snapshot records the settings hash it was produced under. Loading under
//! different settings still restores the state but logs a warning: open
//! positions keep the levels they were opened with.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use harsi_core::domain::{Alert, Position, Statistics};
use harsi_core::fingerprint::SettingsHash;
use harsi_core::trading::{AlertLog, PositionManager};

use crate::config::MonitorConfig;
use crate::desk::DeskState;

/// Current schema version for snapshot files.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },
}

/// Serializable desk state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub config_hash: SettingsHash,
    pub saved_at: DateTime<Utc>,
    pub positions: BTreeMap<String, Position>,
    pub statistics: BTreeMap<String, Statistics>,
    /// Newest first.
    pub alerts: Vec<Alert>,
    /// Candle timestamp of the last alert per symbol.
    #[serde(default)]
    pub last_alert_candle: HashMap<String, i64>,
}

impl Snapshot {
    pub fn capture(state: &DeskState, config_hash: SettingsHash) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config_hash,
            saved_at: Utc::now(),
            positions: state.positions.positions().clone(),
            statistics: state.positions.all_statistics().clone(),
            alerts: state.alerts.iter().cloned().collect(),
            last_alert_candle: state.alerts.last_alert_candles().clone(),
        }
    }

    /// Rebuild desk state under the given configuration's risk and alert capacity.
    pub fn restore(self, config: &MonitorConfig) -> DeskState {
        DeskState {
            positions: PositionManager::from_parts(config.risk, self.positions, self.statistics),
            alerts: AlertLog::from_parts(
                config.alerts.capacity,
                self.alerts,
                self.last_alert_candle,
            ),
        }
    }
}

/// Write a snapshot as pretty JSON. Creates parent directories if needed.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)?;
    Ok(())
}

/// Read a snapshot. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::SchemaVersion {
            found: snapshot.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(Some(snapshot))
}

/// Desk state from a snapshot file, or an empty desk when none exists yet.
pub fn load_state(path: &Path, config: &MonitorConfig) -> Result<DeskState, SnapshotError> {
    let Some(snapshot) = load(path)? else {
        info!(path = %path.display(), "no snapshot, starting empty");
        return Ok(DeskState {
            positions: PositionManager::new(config.risk),
            alerts: AlertLog::with_capacity(config.alerts.capacity),
        });
    };

    let expected = config.fingerprint();
    if snapshot.config_hash != expected {
        warn!(
            path = %path.display(),
            saved = %snapshot.config_hash,
            current = %expected,
            "snapshot was saved under different strategy settings"
        );
    }
    info!(
        path = %path.display(),
        positions = snapshot.positions.len(),
        alerts = snapshot.alerts.len(),
        "snapshot loaded"
    );
    Ok(snapshot.restore(config))
}

/// Capture and save desk state under the configuration's settings hash.
pub fn save_state(path: &Path, state: &DeskState, config: &MonitorConfig) -> Result<(), SnapshotError> {
    save(path, &Snapshot::capture(state, config.fingerprint()))
}
