//! Lorebook - gated background knowledge for the language model.
//!
//! Each [`LoreEntry`] carries an [`UnlockPolicy`]. [`filter`] keeps the
//! entries visible for the current runtime, in input order. Every policy
//! resolves missing context to "visible", so clients that predate a policy
//! never lose content they could already see.

mod policy;

pub use policy::*;

use serde::{Deserialize, Serialize};

/// A key/value piece of in-world knowledge plus its unlock policy.
///
/// On the wire an entry is a flat row:
///
/// ```json
/// {"key": "k2", "value": "...", "unlock_type": "affection", "unlock_affection_min": 50}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LoreRow", into = "LoreRow")]
pub struct LoreEntry {
    pub key: String,
    pub value: String,
    pub policy: UnlockPolicy,
}

impl LoreEntry {
    /// Create a public entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            policy: UnlockPolicy::Public,
        }
    }

    /// Set the unlock policy.
    pub fn with_policy(mut self, policy: UnlockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether this entry is visible for `runtime`.
    pub fn is_visible(&self, runtime: Option<&UnlockContext<'_>>) -> bool {
        self.policy.is_visible(runtime)
    }
}

/// Flat lorebook row as stored by the knowledge source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoreRow {
    key: String,
    #[serde(default)]
    value: String,
    #[serde(default, alias = "policy", skip_serializing_if = "Option::is_none")]
    unlock_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_affection_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_ending_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_ep_min: Option<u32>,
}

/// Blank strings from form-backed rows mean "unset".
fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

impl From<LoreRow> for LoreEntry {
    fn from(row: LoreRow) -> Self {
        let tag = non_blank(row.unlock_type).map(|t| t.trim().to_lowercase());
        let policy = match tag.as_deref() {
            None | Some("public") => UnlockPolicy::Public,
            Some("affection") => UnlockPolicy::Affection {
                min: row.unlock_affection_min.unwrap_or(0.0),
            },
            Some("paid_item") => UnlockPolicy::PaidItem {
                sku: non_blank(row.unlock_sku),
            },
            Some("condition") => UnlockPolicy::Condition {
                expr: non_blank(row.unlock_expr),
            },
            Some("ending_route") => UnlockPolicy::EndingRoute {
                ending_key: non_blank(row.unlock_ending_key),
                min_episode: row.unlock_ep_min,
            },
            Some(other) => UnlockPolicy::Unknown {
                tag: other.to_string(),
            },
        };

        Self {
            key: row.key,
            value: row.value,
            policy,
        }
    }
}

impl From<LoreEntry> for LoreRow {
    fn from(entry: LoreEntry) -> Self {
        let mut row = LoreRow {
            key: entry.key,
            value: entry.value,
            unlock_type: Some(entry.policy.tag().to_string()),
            ..LoreRow::default()
        };
        match entry.policy {
            UnlockPolicy::Public | UnlockPolicy::Unknown { .. } => {}
            UnlockPolicy::Affection { min } => row.unlock_affection_min = Some(min),
            UnlockPolicy::PaidItem { sku } => row.unlock_sku = sku,
            UnlockPolicy::Condition { expr } => row.unlock_expr = expr,
            UnlockPolicy::EndingRoute {
                ending_key,
                min_episode,
            } => {
                row.unlock_ending_key = ending_key;
                row.unlock_ep_min = min_episode;
            }
        }
        row
    }
}

/// Keep the entries visible for `runtime`, preserving order.
///
/// `runtime = None` means no runtime context at all; every entry is kept.
pub fn filter<'a>(entries: &'a [LoreEntry], runtime: Option<&UnlockContext<'_>>) -> Vec<&'a LoreEntry> {
    let visible: Vec<_> = entries
        .iter()
        .filter(|entry| {
            let visible = entry.is_visible(runtime);
            tracing::trace!(key = %entry.key, policy = entry.policy.tag(), visible, "lorebook gate");
            visible
        })
        .collect();

    tracing::debug!(
        total = entries.len(),
        visible = visible.len(),
        "lorebook filtered"
    );
    visible
}

/// Render entries as `- key: value` lines.
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a LoreEntry>) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("- {}: {}\n", entry.key, entry.value));
    }
    out
}
