//! Ending progress - which endings and episodes a session has reached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unlocked ending keys plus cleared episode numbers for one session.
///
/// Only consulted by `ending_route` lorebook policies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EndingProgress {
    #[serde(default)]
    pub unlocked: BTreeSet<String>,

    #[serde(default, rename = "epCleared", alias = "ep_cleared")]
    pub ep_cleared: BTreeSet<u32>,
}

impl EndingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an ending as reached. Returns `false` if it already was.
    pub fn unlock(&mut self, key: impl Into<String>) -> bool {
        self.unlocked.insert(key.into())
    }

    /// Mark an episode as cleared. Returns `false` if it already was.
    pub fn clear_episode(&mut self, episode: u32) -> bool {
        self.ep_cleared.insert(episode)
    }

    pub fn has_ending(&self, key: &str) -> bool {
        self.unlocked.contains(key)
    }

    pub fn has_any_ending(&self) -> bool {
        !self.unlocked.is_empty()
    }

    pub fn has_cleared(&self, episode: u32) -> bool {
        self.ep_cleared.contains(&episode)
    }
}
