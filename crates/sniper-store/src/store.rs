//! Capture record storage.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use sniper_protocols::CaptureState;

use crate::error::StoreError;

/// Storage for the one process-wide capture record.
///
/// Absence of a record means no capture is in progress.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the current record.
    async fn load(&self) -> Result<Option<CaptureState>, StoreError>;

    /// Replace the current record.
    async fn save(&self, state: &CaptureState) -> Result<(), StoreError>;

    /// Remove the record.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStateStore {
    state: RwLock<Option<CaptureState>>,
}

impl MemoryStateStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<CaptureState>, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &CaptureState) -> Result<(), StoreError> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.state.write().await = None;
        Ok(())
    }
}

/// JSON file store.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous record intact.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a file store at `path`, creating its parent directory.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(StoreError::InvalidPath(path.display().to_string()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        debug!("FileStateStore initialized at {:?}", path);

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<CaptureState>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<CaptureState>(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("Discarding unreadable capture record at {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &CaptureState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        fs::write(&temp, json).await?;
        fs::rename(&temp, &self.path).await?;
        debug!(status = %state.status, "Saved capture record");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
