//! Turn assembly - the per-turn pipeline over one session's state.
//!
//! A turn runs in a fixed order so that rule writes are visible to gating
//! in the same turn:
//! 1. **Record**: apply the direct state change the event carries
//! 2. **Trigger**: evaluate trigger rules, mutating variables
//! 3. **Gate**: filter the lorebook against the mutated state
//! 4. **Render**: augment variables with derived values and interpolate
//!    prompt templates and visible lorebook values
//!
//! Steps 1-4 are synchronous and pure apart from the `&mut SessionState`.
//! [`ConversationRuntime`] wraps them with load/save.

mod runtime;

pub use runtime::*;

use chat_state::{DerivedConfig, RuntimeConfig, SessionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::ChatEvent;
use crate::lorebook::{self, LoreEntry, UnlockContext};
use crate::script::CharacterScript;
use crate::template::{augment, interpolate};
use crate::triggers::{evaluate_rules, TriggerReport};

/// Runs the synchronous part of a turn.
#[derive(Debug, Clone, Default)]
pub struct TurnAssembler {
    config: DerivedConfig,
}

impl TurnAssembler {
    pub fn new(config: DerivedConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.derived.clone())
    }

    pub fn config(&self) -> &DerivedConfig {
        &self.config
    }

    /// Run one turn against `state`.
    ///
    /// `now` stamps fired rules; `hour` (0-23, local) buckets `time_of_day`.
    pub fn assemble(
        &self,
        event: &ChatEvent,
        state: &mut SessionState,
        script: &CharacterScript,
        now: DateTime<Utc>,
        hour: u32,
    ) -> TurnContext {
        if event.apply_to(state) {
            state.touch(now);
        }

        let report = evaluate_rules(&script.rules, event, state, now);

        let state = &*state;
        let visible = lorebook::filter(&script.lorebook, Some(&UnlockContext::from(state)));

        let vars = augment(&state.variables, hour, &self.config);
        let fragments = script
            .templates
            .iter()
            .map(|template| interpolate(template, &vars))
            .collect();
        let knowledge = visible
            .into_iter()
            .map(|entry| LoreEntry {
                value: interpolate(&entry.value, &vars),
                ..entry.clone()
            })
            .collect();

        TurnContext {
            fragments,
            knowledge,
            triggers: report,
        }
    }
}

/// What a turn hands to the prompt assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnContext {
    /// Interpolated prompt templates, in script order.
    pub fragments: Vec<String>,

    /// Visible lorebook entries with interpolated values, in script order.
    pub knowledge: Vec<LoreEntry>,

    /// Rules fired or rejected this turn.
    pub triggers: TriggerReport,
}

impl TurnContext {
    /// Keys of the visible lorebook entries.
    pub fn knowledge_keys(&self) -> Vec<&str> {
        self.knowledge.iter().map(|e| e.key.as_str()).collect()
    }

    /// Format the context as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        for fragment in &self.fragments {
            prompt.push_str(fragment);
            prompt.push_str("\n\n");
        }

        if !self.knowledge.is_empty() {
            prompt.push_str("## Lorebook\n");
            prompt.push_str(&lorebook::format_entries(&self.knowledge));
            prompt.push('\n');
        }

        prompt
    }

    /// Serializable summary for logs and debugging endpoints.
    pub fn summary(&self) -> TurnSummary {
        TurnSummary {
            fragments: self.fragments.len(),
            knowledge: self.knowledge.iter().map(|e| e.key.clone()).collect(),
            fired: self.triggers.fired.clone(),
        }
    }
}

/// Compact description of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub fragments: usize,
    pub knowledge: Vec<String>,
    pub fired: Vec<String>,
}
