//! Trigger rule definitions.

use chat_state::{VarValue, Variables};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::EventKind;

/// Why a rule's effects could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("effect has an empty variable name")]
    EmptyVariable,

    #[error("adding {delta} to '{var}' gives a non-finite result")]
    NonFiniteResult { var: String, delta: f64 },
}

/// A single variable mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    /// Assign `value` to `var`.
    Set { var: String, value: VarValue },

    /// Add `value` to `var` (absent or non-numeric reads as 0).
    Add { var: String, value: f64 },
}

impl Effect {
    pub fn set(var: impl Into<String>, value: impl Into<VarValue>) -> Self {
        Effect::Set {
            var: var.into(),
            value: value.into(),
        }
    }

    pub fn add(var: impl Into<String>, value: f64) -> Self {
        Effect::Add {
            var: var.into(),
            value,
        }
    }

    /// The variable this effect writes.
    pub fn var(&self) -> &str {
        match self {
            Effect::Set { var, .. } | Effect::Add { var, .. } => var,
        }
    }
}

/// An IF-THEN rule: when `condition` holds, apply `effects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub id: String,

    /// Comparison expression; empty means always.
    #[serde(default, alias = "if")]
    pub condition: String,

    #[serde(default, alias = "then")]
    pub effects: Vec<Effect>,

    /// Fire at most once per session.
    #[serde(default = "default_once", alias = "one_shot")]
    pub once: bool,

    /// Only evaluate for this event kind; `None` means every event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<EventKind>,
}

fn default_once() -> bool {
    true
}

impl TriggerRule {
    /// Create a one-shot rule with no effects.
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
            effects: Vec::new(),
            once: true,
            on: None,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Allow the rule to fire on every qualifying evaluation.
    pub fn repeatable(mut self) -> Self {
        self.once = false;
        self
    }

    /// Restrict the rule to one event kind.
    pub fn on(mut self, kind: EventKind) -> Self {
        self.on = Some(kind);
        self
    }

    /// Whether the rule listens to `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.on.map_or(true, |on| on == kind)
    }

    /// Compute every write this rule would make, without touching `vars`.
    ///
    /// Names resolve like [`Variables::assign`], so an effect on either
    /// half of an alias pair updates the stored one. Later effects see
    /// earlier ones. Any failure rejects the whole set.
    pub fn stage(&self, vars: &Variables) -> Result<Vec<(String, VarValue)>, EffectError> {
        let mut scratch = vars.clone();
        let mut staged = Vec::with_capacity(self.effects.len());

        for effect in &self.effects {
            let var = effect.var().trim();
            if var.is_empty() {
                return Err(EffectError::EmptyVariable);
            }

            let next = match effect {
                Effect::Set { value, .. } => value.clone(),
                Effect::Add { value: delta, .. } => {
                    let sum = scratch.get_number(var) + delta;
                    if !sum.is_finite() {
                        return Err(EffectError::NonFiniteResult {
                            var: var.to_string(),
                            delta: *delta,
                        });
                    }
                    VarValue::number(sum)
                }
            };
            let key = scratch.assign(var, next.clone());
            staged.push((key, next));
        }

        Ok(staged)
    }
}
