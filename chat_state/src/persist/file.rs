//! JSON file snapshot store.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{PersistError, RuntimeStore, StoredSession};
use crate::config::PersistenceConfig;
use crate::session::{SessionKey, SessionState};

/// Stores each session as `<dir>/<user>_<character>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for a session.
    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl RuntimeStore for JsonFileStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionState>, PersistError> {
        let content = match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&content)?;
        stored.check_version()?;
        Ok(Some(stored.state))
    }

    async fn save(&self, key: &SessionKey, state: &SessionState) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_string_pretty(&StoredSession::new(*key, state.clone()))?;

        // Readers never observe a partially written snapshot.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn reset(&self, key: &SessionKey) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                tracing::info!(session = %key, "session snapshot reset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
