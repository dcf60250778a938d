//! Runtime persistence - load and save session snapshots.
//!
//! The runtime itself never touches storage directly; it talks to a
//! [`RuntimeStore`]. Two stores ship with the crate:
//!
//! - [`MemoryStore`]: process-local, for tests and single-process hosts
//! - [`JsonFileStore`]: one versioned JSON document per session on disk

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::session::{SessionKey, SessionState};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Current stored snapshot version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Load/save boundary for session snapshots.
///
/// `load` returns `Ok(None)` on first contact. `save` must be idempotent
/// for the same snapshot value.
#[async_trait]
pub trait RuntimeStore: Send + Sync {
    /// Load the snapshot for a session, if one was saved.
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionState>, PersistError>;

    /// Save the snapshot for a session, replacing any previous one.
    async fn save(&self, key: &SessionKey, state: &SessionState) -> Result<(), PersistError>;

    /// Delete the snapshot for a session (explicit reset request).
    async fn reset(&self, key: &SessionKey) -> Result<(), PersistError>;
}

#[async_trait]
impl<T: RuntimeStore + ?Sized> RuntimeStore for Arc<T> {
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionState>, PersistError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &SessionKey, state: &SessionState) -> Result<(), PersistError> {
        (**self).save(key, state).await
    }

    async fn reset(&self, key: &SessionKey) -> Result<(), PersistError> {
        (**self).reset(key).await
    }
}

/// Versioned on-disk envelope around a session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Format version for compatibility checking.
    pub version: u32,

    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,

    /// The session this snapshot belongs to.
    pub key: SessionKey,

    pub state: SessionState,
}

impl StoredSession {
    pub fn new(key: SessionKey, state: SessionState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            key,
            state,
        }
    }

    /// Reject envelopes written by an incompatible version.
    pub fn check_version(&self) -> Result<(), PersistError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}
