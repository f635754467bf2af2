//! Alert State and Configuration Stores

use crate::model::{AlertConfig, AlertConfigUpdate, AlertState};
use std::path::PathBuf;
use std::sync::Mutex;
use storage::{JsonDocument, StorageError};
use tracing::{info, warn};

/// Durable map of open alerts.
///
/// Not synchronized on its own: the coordinator owns it behind its lock so
/// that a load, the decision and the save form one critical section.
pub struct AlertStateStore {
    document: JsonDocument<AlertState>,
}

impl AlertStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }

    /// Load every open alert; an absent file is an empty state
    pub fn load(&self) -> Result<AlertState, StorageError> {
        self.document.load_or_default()
    }

    /// Overwrite the whole state
    pub fn save(&self, state: &AlertState) -> Result<(), StorageError> {
        self.document.save(state)
    }
}

/// Durable alert configuration
pub struct AlertConfigStore {
    document: JsonDocument<AlertConfig>,
    write_lock: Mutex<()>,
}

impl AlertConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
            write_lock: Mutex::new(()),
        }
    }

    /// Current configuration; an absent file means alerts are enabled
    pub fn load(&self) -> Result<AlertConfig, StorageError> {
        self.document.load_or_default()
    }

    /// Merge `update` into the stored configuration and persist the result.
    ///
    /// A corrupt file is replaced when `update` carries every field; a
    /// partial update against a corrupt file is an error.
    pub fn update(&self, update: &AlertConfigUpdate) -> Result<AlertConfig, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let mut config = match (self.load(), update.complete()) {
            (Ok(config), _) => config,
            (Err(e), Some(fresh)) if e.is_corrupt() => {
                warn!("Replacing unreadable alert configuration: {}", e);
                fresh
            }
            (Err(e), _) => return Err(e),
        };
        config.apply(update);
        self.document.save(&config)?;

        info!("Alert configuration updated: enabled={}", config.enabled);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertKind, ServerAlertRecord};
    use notifier::MessageHandle;

    #[test]
    fn test_state_store_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertStateStore::new(dir.path().join("alert_state.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_state_store_persists_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertStateStore::new(dir.path().join("alert_state.json"));

        let mut state = AlertState::default();
        state.insert(
            "db-1",
            ServerAlertRecord {
                handle: MessageHandle::new("1.0"),
                kind: AlertKind::Warning,
            },
        );
        store.save(&state).unwrap();

        let reopened = AlertStateStore::new(dir.path().join("alert_state.json"));
        assert_eq!(reopened.load().unwrap(), state);
    }

    #[test]
    fn test_state_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alert_state.json");
        std::fs::write(&path, "[not, a, map").unwrap();

        let store = AlertStateStore::new(&path);
        assert!(store.load().unwrap_err().is_corrupt());
    }

    #[test]
    fn test_config_store_defaults_to_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertConfigStore::new(dir.path().join("alert_config.json"));

        assert!(store.load().unwrap().enabled);
    }

    #[test]
    fn test_config_update_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertConfigStore::new(dir.path().join("alert_config.json"));

        let config = store
            .update(&AlertConfigUpdate {
                enabled: Some(false),
            })
            .unwrap();
        assert!(!config.enabled);
        assert!(!store.load().unwrap().enabled);

        let config = store.update(&AlertConfigUpdate::default()).unwrap();
        assert!(!config.enabled);
    }

    #[test]
    fn test_config_update_repairs_corrupt_file_only_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alert_config.json");
        std::fs::write(&path, "{\"enabled\": tru").unwrap();
        let store = AlertConfigStore::new(&path);

        let partial = store.update(&AlertConfigUpdate::default());
        assert!(partial.unwrap_err().is_corrupt());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"enabled\": tru");

        let config = store
            .update(&AlertConfigUpdate {
                enabled: Some(false),
            })
            .unwrap();
        assert!(!config.enabled);
        assert!(!store.load().unwrap().enabled);
    }
}
