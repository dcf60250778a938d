//! Character scripts - the authored lorebook, rules and prompt templates
//! for one character.
//!
//! ```toml
//! templates = ["You are Haru. Address the user as {{call_sign}}."]
//!
//! [[lorebook]]
//! key = "secret"
//! value = "Haru once lived in Busan."
//! unlock_type = "affection"
//! unlock_affection_min = 50
//!
//! [[rules]]
//! id = "first_gift"
//! if = "affection >= 10"
//! effects = [{ op = "add", var = "affection", value = 20 }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::lorebook::LoreEntry;
use crate::triggers::{TriggerEngine, TriggerRule};

/// Errors from loading a character script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only per-turn input for one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterScript {
    /// Prompt fragments, interpolated every turn.
    pub templates: Vec<String>,

    /// Ordered knowledge entries.
    pub lorebook: Vec<LoreEntry>,

    /// Ordered trigger rules.
    pub rules: Vec<TriggerRule>,
}

impl CharacterScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a `.json` or `.toml` script; anything else is read as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// A trigger engine over this script's rules.
    pub fn trigger_engine(&self) -> TriggerEngine {
        TriggerEngine::new(self.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorebook::UnlockPolicy;
    use crate::triggers::Effect;

    const SCRIPT: &str = r#"
templates = ["You are Haru. Address the user as {{call_sign}}."]

[[lorebook]]
key = "hometown"
value = "Seoul"

[[lorebook]]
key = "secret"
value = "Haru once lived in Busan."
unlock_type = "affection"
unlock_affection_min = 50

[[rules]]
id = "first_gift"
if = "affection >= 10"
effects = [{ op = "add", var = "affection", value = 20 }]

[[rules]]
id = "greeting"
once = false
on = "session_started"
effects = [{ op = "set", var = "greeted", value = true }]
"#;

    #[test]
    fn test_parse_toml_script() {
        let script = CharacterScript::from_toml_str(SCRIPT).unwrap();

        assert_eq!(script.templates.len(), 1);
        assert_eq!(script.lorebook.len(), 2);
        assert_eq!(script.lorebook[1].policy, UnlockPolicy::Affection { min: 50.0 });

        assert_eq!(script.rules[0].condition, "affection >= 10");
        assert!(script.rules[0].once);
        assert_eq!(script.rules[0].effects, vec![Effect::add("affection", 20.0)]);
        assert!(!script.rules[1].once);
        assert_eq!(script.rules[1].effects, vec![Effect::set("greeted", true)]);
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(CharacterScript::from_toml_str("").unwrap(), CharacterScript::new());
    }

    #[test]
    fn test_json_and_file_load() {
        let script = CharacterScript::from_toml_str(SCRIPT).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(CharacterScript::from_json_str(&json).unwrap(), script);

        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("haru.toml");
        std::fs::write(&toml_path, SCRIPT).unwrap();
        assert_eq!(CharacterScript::load(&toml_path).unwrap(), script);

        let json_path = dir.path().join("haru.json");
        std::fs::write(&json_path, &json).unwrap();
        assert_eq!(CharacterScript::load(&json_path).unwrap(), script);
    }

    #[test]
    fn test_trigger_engine_from_script() {
        let script = CharacterScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.trigger_engine().rules().len(), 2);
    }
}
