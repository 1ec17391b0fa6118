//! # Bulk Data Cache
//!
//! A whole collection persisted as one pretty-printed JSON file. Either the
//! file is trusted and loaded as-is, or it is discarded and overwritten by a
//! fresh fetch. There is no expiry, merging or locking: last writer wins.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct BulkCache {
    path: PathBuf,
}

impl BulkCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a cache artifact is present. Callers use this as the
    /// trust-or-refetch gate before any network I/O.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn save<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items).map_err(|e| self.error(e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.error(e))?;
        info!("💾 Cached {} records to {}", items.len(), self.path.display());
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let json = fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        let items: Vec<T> = serde_json::from_str(&json).map_err(|e| self.error(e))?;
        info!("📂 Loaded {} records from {}", items.len(), self.path.display());
        Ok(items)
    }

    /// Removes the artifact. A missing file is not an error.
    pub fn invalidate(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error(e)),
        }
    }

    fn error(&self, e: impl std::fmt::Display) -> Error {
        Error::Cache {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
