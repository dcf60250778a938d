//! The Variable Store - a flat map of named runtime variables per session.
//!
//! Lookups never fail: an unknown name reads as the type's default
//! (`0`, `""` or `false`), so partial or legacy snapshots stay valid.
//! Reads and read-modify-writes resolve names case-insensitively and through
//! the `affection` / `affection_score` alias pair.

mod value;

pub use value::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primary name of the affection variable.
pub const AFFECTION: &str = "affection";

/// Legacy alias of [`AFFECTION`]; either name resolves to the same value.
pub const AFFECTION_SCORE: &str = "affection_score";

/// A snapshot of all runtime variables for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    values: BTreeMap<String, VarValue>,
}

impl Variables {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a stored value by exact name.
    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.values.get(name)
    }

    /// Get a value the way rules and gates read it: exact name first, then a
    /// case-insensitive match, then the same two steps for the name's alias.
    pub fn resolve(&self, name: &str) -> Option<&VarValue> {
        self.resolve_key(name).and_then(|key| self.values.get(key))
    }

    /// The stored name [`Variables::resolve`] reads for `name`, if any.
    pub fn resolve_key(&self, name: &str) -> Option<&str> {
        self.find_key(name)
            .or_else(|| alias_of(name).and_then(|alias| self.find_key(alias)))
    }

    fn find_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.values.get_key_value(name) {
            return Some(key);
        }
        let wanted = name.to_lowercase();
        self.values
            .keys()
            .find(|key| key.to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Numeric value of a variable, `0` when absent.
    pub fn get_number(&self, name: &str) -> f64 {
        self.resolve(name).map(VarValue::as_number).unwrap_or(0.0)
    }

    /// Text value of a variable, empty when absent.
    pub fn get_text(&self, name: &str) -> String {
        self.resolve(name).map(VarValue::as_text).unwrap_or_default()
    }

    /// Boolean value of a variable, `false` when absent.
    pub fn get_bool(&self, name: &str) -> bool {
        self.resolve(name).map(VarValue::as_bool).unwrap_or(false)
    }

    /// Affection, read through the `affection` / `affection_score` alias pair.
    pub fn affection(&self) -> f64 {
        self.get_number(AFFECTION)
    }

    /// Check whether a variable is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<VarValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Write `value` to the stored name `name` resolves to, or to `name`
    /// itself when nothing resolves. Returns the name written.
    ///
    /// Writing through an alias keeps the pair pointing at one value.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<VarValue>) -> String {
        let name = name.into();
        let key = self.resolve_key(&name).map(str::to_owned).unwrap_or(name);
        self.values.insert(key.clone(), value.into());
        key
    }

    /// Add `delta` to a variable (absent or non-numeric reads as 0),
    /// resolving the name like [`Variables::assign`].
    ///
    /// Returns the new value.
    pub fn increment(&mut self, name: impl Into<String>, delta: f64) -> f64 {
        let name = name.into();
        let next = self.get_number(&name) + delta;
        self.assign(name, VarValue::number(next));
        next
    }

    /// Overlay `partial` onto this snapshot; values in `partial` win.
    pub fn merge(&mut self, partial: Variables) -> &mut Self {
        self.values.extend(partial.values);
        self
    }

    /// Return a new snapshot with `partial` overlaid.
    pub fn merged(&self, partial: &Variables) -> Self {
        let mut out = self.clone();
        out.values
            .extend(partial.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    /// Clear every variable.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VarValue)> {
        self.values.iter()
    }
}

/// The other half of an alias pair.
fn alias_of(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        AFFECTION => Some(AFFECTION_SCORE),
        AFFECTION_SCORE => Some(AFFECTION),
        _ => None,
    }
}

impl<K: Into<String>, V: Into<VarValue>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_read_as_defaults() {
        let vars = Variables::new();
        assert_eq!(vars.get_number("trust"), 0.0);
        assert_eq!(vars.get_text("user_name"), "");
        assert!(!vars.get_bool("met_before"));
        assert!(vars.get("trust").is_none());
    }

    #[test]
    fn test_set_and_increment() {
        let mut vars = Variables::new().with("affection", 40);
        assert_eq!(vars.increment("affection", 20.0), 60.0);
        assert_eq!(vars.get("affection"), Some(&VarValue::Int(60)));

        // Numeric-like strings take part in arithmetic.
        vars.set("trust", "5");
        assert_eq!(vars.increment("trust", 1.5), 6.5);
    }

    #[test]
    fn test_merge_overrides() {
        let mut vars = Variables::new().with("a", 1).with("b", "x");
        vars.merge(Variables::new().with("b", "y").with("c", true));

        assert_eq!(vars.len(), 3);
        assert_eq!(vars.get_text("b"), "y");
        assert!(vars.get_bool("c"));
    }

    #[test]
    fn test_merged_leaves_original() {
        let base = Variables::new().with("a", 1);
        let next = base.merged(&Variables::new().with("a", 2));
        assert_eq!(base.get_number("a"), 1.0);
        assert_eq!(next.get_number("a"), 2.0);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let vars = Variables::new().with("Affection", 30);
        assert!(vars.get("affection").is_none());
        assert_eq!(vars.resolve("affection").map(VarValue::as_number), Some(30.0));
        assert_eq!(vars.get_number("AFFECTION"), 30.0);
        assert_eq!(vars.affection(), 30.0);
    }

    #[test]
    fn test_affection_alias() {
        let legacy = Variables::new().with(AFFECTION_SCORE, 55);
        assert_eq!(legacy.affection(), 55.0);
        assert_eq!(legacy.get_number(AFFECTION), 55.0);
        assert_eq!(legacy.resolve_key(AFFECTION), Some(AFFECTION_SCORE));

        let current = Variables::new().with(AFFECTION, 20);
        assert_eq!(current.get_number(AFFECTION_SCORE), 20.0);

        // Both stored: each name reads its own value.
        let both = Variables::new().with(AFFECTION, 10).with(AFFECTION_SCORE, 55);
        assert_eq!(both.affection(), 10.0);
        assert_eq!(both.get_number(AFFECTION_SCORE), 55.0);

        assert!(Variables::new().with("trust", 1).resolve("trust_score").is_none());
    }

    #[test]
    fn test_increment_through_alias_writes_stored_name() {
        let mut vars = Variables::new().with(AFFECTION_SCORE, 40);

        assert_eq!(vars.increment(AFFECTION, 20.0), 60.0);
        assert!(!vars.contains(AFFECTION));
        assert_eq!(vars.get(AFFECTION_SCORE), Some(&VarValue::Int(60)));
        assert_eq!(vars.affection(), 60.0);
    }

    #[test]
    fn test_assign_resolves_but_set_is_exact() {
        let mut vars = Variables::new().with("Trust", 1);
        assert_eq!(vars.assign("trust", 2), "Trust");
        assert_eq!(vars.len(), 1);

        vars.set("trust", 3);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.assign("new_flag", true), "new_flag");
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let vars = Variables::new().with("affection", 40).with("user_name", "민수");
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"affection":40,"user_name":"민수"}"#);

        let back: Variables = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vars);
    }
}
