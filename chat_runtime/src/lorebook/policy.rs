//! Unlock policies - the rule class that decides whether an entry is visible.

use chat_state::{EndingProgress, SessionState, Variables};
use std::collections::BTreeSet;

use crate::condition;

/// Runtime context a policy is evaluated against.
///
/// Every part is optional in the sense that its absence makes the
/// corresponding policy include the entry.
#[derive(Debug, Clone, Copy)]
pub struct UnlockContext<'a> {
    pub variables: &'a Variables,
    pub ending: Option<&'a EndingProgress>,
    pub owned_items: Option<&'a BTreeSet<String>>,
}

impl<'a> UnlockContext<'a> {
    /// Context carrying only variables.
    pub fn from_variables(variables: &'a Variables) -> Self {
        Self {
            variables,
            ending: None,
            owned_items: None,
        }
    }

    pub fn with_ending(mut self, ending: &'a EndingProgress) -> Self {
        self.ending = Some(ending);
        self
    }
}

impl<'a> From<&'a SessionState> for UnlockContext<'a> {
    fn from(state: &'a SessionState) -> Self {
        Self {
            variables: &state.variables,
            ending: state.ending.as_ref(),
            owned_items: Some(&state.owned_items),
        }
    }
}

/// How an entry is unlocked.
///
/// Each variant evaluates explicitly in [`UnlockPolicy::is_visible`]; a new
/// variant must state its own inclusion default there.
///
/// Serialized through the flat lorebook row (see [`super::LoreEntry`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UnlockPolicy {
    /// Always visible.
    #[default]
    Public,

    /// Visible once affection reaches `min`. Reads
    /// [`Variables::affection`], the same lookup condition expressions use.
    Affection { min: f64 },

    /// Visible once `sku` is owned. Not enforced yet: always visible.
    PaidItem { sku: Option<String> },

    /// Visible while the comparison `expr` holds.
    Condition { expr: Option<String> },

    /// Visible once an ending is reached and/or an episode cleared.
    ///
    /// With `min_episode` set and no `ending_key`, clearing the episode is
    /// enough; no ending needs to be unlocked. Only a route with neither
    /// gate falls back to "any ending unlocked".
    EndingRoute {
        ending_key: Option<String>,
        min_episode: Option<u32>,
    },

    /// A policy tag this version does not know. Always visible.
    Unknown { tag: String },
}

impl UnlockPolicy {
    /// The wire tag for this policy.
    pub fn tag(&self) -> &str {
        match self {
            UnlockPolicy::Public => "public",
            UnlockPolicy::Affection { .. } => "affection",
            UnlockPolicy::PaidItem { .. } => "paid_item",
            UnlockPolicy::Condition { .. } => "condition",
            UnlockPolicy::EndingRoute { .. } => "ending_route",
            UnlockPolicy::Unknown { tag } => tag,
        }
    }

    /// Decide visibility. Pure with respect to `runtime`.
    ///
    /// Missing context always resolves to visible.
    pub fn is_visible(&self, runtime: Option<&UnlockContext<'_>>) -> bool {
        match self {
            UnlockPolicy::Public => true,

            UnlockPolicy::Affection { min } => match runtime {
                Some(rt) => rt.variables.affection() >= *min,
                None => true,
            },

            UnlockPolicy::PaidItem { sku } => {
                if let (Some(sku), Some(owned)) = (sku, runtime.and_then(|rt| rt.owned_items)) {
                    if !owned.contains(sku) {
                        tracing::trace!(sku = %sku, "paid item not owned; policy is advisory");
                    }
                }
                true
            }

            UnlockPolicy::Condition { expr } => match (expr, runtime) {
                (Some(expr), Some(rt)) => condition::evaluate(expr, rt.variables),
                _ => true,
            },

            UnlockPolicy::EndingRoute {
                ending_key,
                min_episode,
            } => {
                let Some(ending) = runtime.and_then(|rt| rt.ending) else {
                    return true;
                };
                if let Some(episode) = min_episode {
                    if !ending.has_cleared(*episode) {
                        return false;
                    }
                }
                match (ending_key, min_episode) {
                    (Some(key), _) => ending.has_ending(key),
                    (None, Some(_)) => true,
                    (None, None) => ending.has_any_ending(),
                }
            }

            UnlockPolicy::Unknown { .. } => true,
        }
    }
}
