//! Storage Layer
//!
//! JSON documents persisted as whole files: every read parses the full
//! document and every write replaces it atomically.

mod document;
mod servers;

pub use document::JsonDocument;
pub use servers::ServerListStore;

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt document {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StorageError {
    /// Whether the persisted document exists but could not be parsed
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }
}
