//! JSON Document File

use crate::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single JSON document stored in one file.
///
/// Reads always parse the whole file. Writes go to a sibling temporary file
/// which is then renamed over the target, so a reader never sees a partially
/// written document. There is no cross-process locking; callers that need
/// read-modify-write consistency must serialize access themselves.
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a handle for the document at `path` (the file need not exist)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, returning `None` if the file does not exist
    pub fn load(&self) -> Result<Option<T>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Document {} absent", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Load the document, falling back to `T::default()` if absent
    pub fn load_or_default(&self) -> Result<T, StorageError>
    where
        T: Default,
    {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Replace the whole document
    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        {
            let mut file =
                fs::File::create(&temp_path).map_err(|source| self.io_error(source))?;
            file.write_all(body.as_bytes())
                .and_then(|_| file.write_all(b"\n"))
                .and_then(|_| file.sync_all())
                .map_err(|source| self.io_error(source))?;
        }
        fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))?;

        debug!("Wrote {} bytes to {}", body.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
