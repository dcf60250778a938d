//! Session state - everything the runtime knows about one (user, character) pair.

mod ending;

pub use ending::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::variables::Variables;

/// Unique identifier for users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub user: UserId,
    pub character: CharacterId,
}

impl SessionKey {
    pub fn new(user: UserId, character: CharacterId) -> Self {
        Self { user, character }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.user, self.character)
    }
}

/// One-shot trigger bookkeeping: rule id -> last firing time.
///
/// Stored next to the variables, not inside them, so resetting variables
/// leaves it intact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiredRules {
    fired_at: BTreeMap<String, DateTime<Utc>>,
}

impl FiredRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self, rule_id: &str) -> bool {
        self.fired_at.contains_key(rule_id)
    }

    /// When the rule last fired.
    pub fn fired_at(&self, rule_id: &str) -> Option<DateTime<Utc>> {
        self.fired_at.get(rule_id).copied()
    }

    pub fn record(&mut self, rule_id: impl Into<String>, at: DateTime<Utc>) {
        self.fired_at.insert(rule_id.into(), at);
    }

    /// Forget a single rule's firing, letting a one-shot rule fire again.
    pub fn forget(&mut self, rule_id: &str) -> bool {
        self.fired_at.remove(rule_id).is_some()
    }

    pub fn clear(&mut self) {
        self.fired_at.clear();
    }

    pub fn len(&self) -> usize {
        self.fired_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired_at.is_empty()
    }
}

/// The complete runtime state of one session at a point in time.
///
/// Created empty on first contact; every field defaults so snapshots
/// written by older clients still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Runtime variables.
    #[serde(default)]
    pub variables: Variables,

    /// Ending progress; absent until the first ending or episode event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<EndingProgress>,

    /// One-shot trigger bookkeeping.
    #[serde(default, rename = "firedAt", alias = "fired_at")]
    pub fired: FiredRules,

    /// SKUs the user owns for this character.
    #[serde(default)]
    pub owned_items: BTreeSet<String>,

    /// Last time the state changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Create a new empty session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session state seeded with variables.
    pub fn with_variables(variables: Variables) -> Self {
        Self {
            variables,
            ..Self::default()
        }
    }

    /// Ending progress, created on first use.
    pub fn ending_mut(&mut self) -> &mut EndingProgress {
        self.ending.get_or_insert_with(EndingProgress::default)
    }

    /// Record that the user owns an item.
    pub fn add_owned_item(&mut self, sku: impl Into<String>) -> bool {
        self.owned_items.insert(sku.into())
    }

    pub fn owns(&self, sku: &str) -> bool {
        self.owned_items.contains(sku)
    }

    /// Clear conversation variables, keeping trigger bookkeeping,
    /// ending progress and purchases.
    pub fn reset_variables(&mut self) {
        self.variables.clear();
    }

    /// Clear everything, including trigger bookkeeping.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Stamp the state as changed.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
