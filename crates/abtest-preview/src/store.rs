//! Where preview overrides live between runs

use crate::error::PreviewError;
use crate::overrides::PreviewOverrides;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence for one admin's preview overrides
pub trait SessionStore: Send + Sync {
    /// Stored overrides, `None` if nothing was ever applied
    ///
    /// # Errors
    /// Returns [`PreviewError`] if the backing storage cannot be read
    fn load(&self) -> Result<Option<PreviewOverrides>, PreviewError>;

    /// Replace stored overrides
    ///
    /// # Errors
    /// Returns [`PreviewError`] if the backing storage cannot be written
    fn save(&self, overrides: &PreviewOverrides) -> Result<(), PreviewError>;

    /// Remove stored overrides
    ///
    /// # Errors
    /// Returns [`PreviewError`] if the backing storage cannot be written
    fn clear(&self) -> Result<(), PreviewError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<PreviewOverrides>>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<PreviewOverrides>, PreviewError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, overrides: &PreviewOverrides) -> Result<(), PreviewError> {
        *self.inner.lock() = Some(overrides.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), PreviewError> {
        self.inner.lock().take();
        Ok(())
    }
}

/// JSON file store
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> PreviewError {
        PreviewError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<PreviewOverrides>, PreviewError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io(e)),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PreviewError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, overrides: &PreviewOverrides) -> Result<(), PreviewError> {
        let json = serde_json::to_string_pretty(overrides).map_err(PreviewError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io(e))?;

        debug!(path = %self.path.display(), "preview overrides saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), PreviewError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io(e)),
        }
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<PreviewOverrides>, PreviewError> {
        (**self).load()
    }

    fn save(&self, overrides: &PreviewOverrides) -> Result<(), PreviewError> {
        (**self).save(overrides)
    }

    fn clear(&self) -> Result<(), PreviewError> {
        (**self).clear()
    }
}
