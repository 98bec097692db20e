use crate::domain::errors::ExitManagerError;
use crate::domain::trade::ActiveTrade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedState {
    version: String,
    last_saved: DateTime<Utc>,
    trades: HashMap<String, ActiveTrade>,
}

/// Atomic temp-then-rename JSON persistence for the Exit Manager's trade map,
/// grounded in the teacher's `settings_persistence.rs`.
pub struct PersistenceStore {
    file_path: PathBuf,
}

impl PersistenceStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self { file_path: file_path.into() }
    }

    /// Loads the persisted trade map, or an empty one if the file doesn't
    /// exist yet. Does not cross-check against broker positions — the caller
    /// (`ExitManager::load`) does that and re-saves the cleaned state.
    pub fn load(&self) -> Result<HashMap<u64, ActiveTrade>, ExitManagerError> {
        if !self.file_path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.file_path).map_err(|e| ExitManagerError::StateLoadFailed { reason: e.to_string() })?;
        let state: PersistedState =
            serde_json::from_str(&content).map_err(|e| ExitManagerError::StateCorruption { reason: e.to_string() })?;

        state
            .trades
            .into_iter()
            .map(|(ticket_str, trade)| {
                ticket_str
                    .parse::<u64>()
                    .map(|ticket| (ticket, trade))
                    .map_err(|e| ExitManagerError::StateCorruption { reason: format!("non-numeric ticket key '{ticket_str}': {e}") })
            })
            .collect()
    }

    pub fn save(&self, trades: &HashMap<u64, ActiveTrade>, now: DateTime<Utc>) -> Result<(), ExitManagerError> {
        let state = PersistedState {
            version: SCHEMA_VERSION.to_string(),
            last_saved: now,
            trades: trades.iter().map(|(ticket, trade)| (ticket.to_string(), trade.clone())).collect(),
        };
        let content = serde_json::to_string_pretty(&state).map_err(|e| ExitManagerError::StateSaveFailed { reason: e.to_string() })?;

        let temp_path = temp_path_for(&self.file_path);
        fs::write(&temp_path, content).map_err(|e| ExitManagerError::StateSaveFailed { reason: e.to_string() })?;
        fs::rename(&temp_path, &self.file_path).map_err(|e| ExitManagerError::StateSaveFailed { reason: e.to_string() })?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}
