//! In-process snapshot store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{PersistError, RuntimeStore};
use crate::session::{SessionKey, SessionState};

/// Keeps snapshots in memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionKey, SessionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl RuntimeStore for MemoryStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionState>, PersistError> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn save(&self, key: &SessionKey, state: &SessionState) -> Result<(), PersistError> {
        self.sessions.write().await.insert(*key, state.clone());
        Ok(())
    }

    async fn reset(&self, key: &SessionKey) -> Result<(), PersistError> {
        if self.sessions.write().await.remove(key).is_some() {
            tracing::info!(session = %key, "session snapshot reset");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CharacterId, UserId};
    use crate::variables::Variables;

    #[tokio::test]
    async fn test_first_contact_is_none() {
        let store = MemoryStore::new();
        let key = SessionKey::new(UserId::new(), CharacterId::new());
        assert!(store.load(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_reset() {
        let store = MemoryStore::new();
        let key = SessionKey::new(UserId::new(), CharacterId::new());
        let state = SessionState::with_variables(Variables::new().with("affection", 40));

        store.save(&key, &state).await.unwrap();
        store.save(&key, &state).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.load(&key).await.unwrap(), Some(state));

        store.reset(&key).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let a = SessionKey::new(user, CharacterId::new());
        let b = SessionKey::new(user, CharacterId::new());

        store
            .save(&a, &SessionState::with_variables(Variables::new().with("affection", 90)))
            .await
            .unwrap();

        assert!(store.load(&b).await.unwrap().is_none());
    }
}
