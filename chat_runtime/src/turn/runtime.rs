//! Async turn runner: load, assemble, save.

use chat_state::{PersistError, RuntimeStore, SessionKey, SessionState};
use chrono::{DateTime, Local, Timelike, Utc};

use super::{TurnAssembler, TurnContext};
use crate::events::ChatEvent;
use crate::script::CharacterScript;

/// What happened to the snapshot write at the end of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed(String),
    /// Not attempted because the load failed; writing would clobber the
    /// stored snapshot with one rebuilt from defaults.
    Skipped,
}

/// Persistence outcome of a turn. Failures never abort the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceStatus {
    pub load_error: Option<String>,
    pub save: SaveStatus,
}

impl PersistenceStatus {
    pub fn is_ok(&self) -> bool {
        self.load_error.is_none() && self.save == SaveStatus::Saved
    }
}

/// Result of a full turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub context: TurnContext,

    /// The session state after the turn.
    pub state: SessionState,

    pub persistence: PersistenceStatus,
}

/// Runs turns for any number of sessions over one store.
///
/// Holds no per-session lock: callers must not run two turns for the same
/// session concurrently.
pub struct ConversationRuntime<S> {
    store: S,
    assembler: TurnAssembler,
}

impl<S: RuntimeStore> ConversationRuntime<S> {
    pub fn new(store: S, assembler: TurnAssembler) -> Self {
        Self { store, assembler }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, TurnAssembler::with_defaults())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a session, falling back to an empty state.
    ///
    /// Returns the load error, if any, alongside the state in use.
    pub async fn load_state(&self, key: &SessionKey) -> (SessionState, Option<PersistError>) {
        match self.store.load(key).await {
            Ok(Some(state)) => (state, None),
            Ok(None) => {
                tracing::debug!(session = %key, "first contact, starting empty state");
                (SessionState::new(), None)
            }
            Err(error) => {
                tracing::warn!(session = %key, %error, "failed to load session, using empty state");
                (SessionState::new(), Some(error))
            }
        }
    }

    /// Run a turn at the current time.
    pub async fn run_turn(
        &self,
        key: &SessionKey,
        event: &ChatEvent,
        script: &CharacterScript,
    ) -> TurnOutcome {
        self.run_turn_at(key, event, script, Utc::now(), Local::now().hour())
            .await
    }

    /// Run a turn at an explicit time.
    pub async fn run_turn_at(
        &self,
        key: &SessionKey,
        event: &ChatEvent,
        script: &CharacterScript,
        now: DateTime<Utc>,
        hour: u32,
    ) -> TurnOutcome {
        let (mut state, load_error) = self.load_state(key).await;

        let context = self.assembler.assemble(event, &mut state, script, now, hour);

        let save = if load_error.is_some() {
            SaveStatus::Skipped
        } else {
            match self.store.save(key, &state).await {
                Ok(()) => SaveStatus::Saved,
                Err(error) => {
                    tracing::warn!(session = %key, %error, "failed to save session");
                    SaveStatus::Failed(error.to_string())
                }
            }
        };

        tracing::debug!(
            session = %key,
            fired = ?context.triggers.fired,
            knowledge = context.knowledge.len(),
            "turn assembled"
        );

        TurnOutcome {
            context,
            state,
            persistence: PersistenceStatus {
                load_error: load_error.map(|e| e.to_string()),
                save,
            },
        }
    }

    /// Delete a session's stored state.
    pub async fn reset(&self, key: &SessionKey) -> Result<(), PersistError> {
        self.store.reset(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorebook::{LoreEntry, UnlockPolicy};
    use crate::triggers::{Effect, TriggerRule};
    use chat_state::{CharacterId, MemoryStore, UserId, Variables};

    fn key() -> SessionKey {
        SessionKey::new(UserId::new(), CharacterId::new())
    }

    fn script() -> CharacterScript {
        CharacterScript {
            templates: vec!["Hello {{user_name}}".into()],
            lorebook: vec![LoreEntry::new("secret", "...")
                .with_policy(UnlockPolicy::Affection { min: 10.0 })],
            rules: vec![TriggerRule::new("welcome", "").with_effect(Effect::add("affection", 10.0))],
        }
    }

    #[tokio::test]
    async fn test_first_turn_creates_and_saves_state() {
        let runtime = ConversationRuntime::with_defaults(MemoryStore::new());
        let key = key();

        let outcome = runtime
            .run_turn(&key, &ChatEvent::SessionStarted, &script())
            .await;

        assert!(outcome.persistence.is_ok());
        assert_eq!(outcome.context.triggers.fired, vec!["welcome"]);
        assert_eq!(outcome.context.knowledge_keys(), vec!["secret"]);

        let stored = runtime.store().load(&key).await.unwrap().unwrap();
        assert_eq!(stored, outcome.state);
        assert_eq!(stored.variables.affection(), 10.0);
    }

    #[tokio::test]
    async fn test_one_shot_survives_reload() {
        let runtime = ConversationRuntime::with_defaults(MemoryStore::new());
        let key = key();

        runtime.run_turn(&key, &ChatEvent::SessionStarted, &script()).await;
        let outcome = runtime
            .run_turn(&key, &ChatEvent::user_message("again"), &script())
            .await;

        assert!(outcome.context.triggers.fired.is_empty());
        assert_eq!(outcome.state.variables.affection(), 10.0);
    }

    #[tokio::test]
    async fn test_reset_starts_over() {
        let runtime = ConversationRuntime::with_defaults(MemoryStore::new());
        let key = key();
        runtime
            .store()
            .save(&key, &SessionState::with_variables(Variables::new().with("affection", 99)))
            .await
            .unwrap();

        runtime.reset(&key).await.unwrap();
        let (state, error) = runtime.load_state(&key).await;

        assert!(error.is_none());
        assert_eq!(state, SessionState::new());
    }
}
