//! Server List Store

use crate::{JsonDocument, StorageError};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Pass-through persistence for the monitored server list.
///
/// The document is opaque apart from its top-level `servers` field; whatever
/// the dashboard saves is returned verbatim.
pub struct ServerListStore {
    document: JsonDocument<Value>,
    write_lock: Mutex<()>,
}

impl ServerListStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let document = JsonDocument::new(path);
        info!("Server list stored at {}", document.path().display());
        Self {
            document,
            write_lock: Mutex::new(()),
        }
    }

    /// Whether a submitted document has the shape the dashboard expects
    pub fn is_valid(document: &Value) -> bool {
        document.get("servers").is_some()
    }

    /// Read the whole server-list document (a missing file is an error)
    pub fn load(&self) -> Result<Value, StorageError> {
        self.document
            .load()?
            .ok_or_else(|| StorageError::NotFound(self.document.path().to_path_buf()))
    }

    /// Replace the whole server-list document
    pub fn save(&self, document: &Value) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        self.document.save(document)?;

        let count = document
            .get("servers")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        info!("Saved server list ({} servers)", count);
        Ok(())
    }
}
