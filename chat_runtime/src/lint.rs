//! Authoring lint pass.
//!
//! Reports script problems that runtime evaluation deliberately tolerates.
//! Nothing here changes what the evaluators return.

use chat_state::{DerivedConfig, Variables};
use std::collections::HashSet;
use thiserror::Error;

use crate::condition::{Condition, ConditionError};
use crate::lorebook::UnlockPolicy;
use crate::script::CharacterScript;
use crate::template::{augment, unresolved};

/// A problem found in a character script.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LintIssue {
    #[error("lorebook entry '{key}': unlock expression always passes ({error})")]
    MalformedUnlockExpr { key: String, error: ConditionError },

    #[error("lorebook entry '{key}': unknown unlock type '{tag}' is always visible")]
    UnknownPolicy { key: String, tag: String },

    #[error("lorebook entry '{key}': paid_item without a SKU")]
    PaidItemWithoutSku { key: String },

    #[error("rule '{rule}': condition always passes ({error})")]
    MalformedCondition { rule: String, error: ConditionError },

    #[error("rule '{rule}': no effects")]
    NoEffects { rule: String },

    #[error("rule '{rule}': effect with an empty variable name")]
    EmptyEffectVariable { rule: String },

    #[error("rule id '{rule}' is used more than once")]
    DuplicateRuleId { rule: String },

    #[error("{location}: placeholder '{{{{{name}}}}}' does not resolve")]
    UnresolvedPlaceholder { location: String, name: String },
}

/// Lint a single expression. Same grammar as runtime evaluation.
pub fn lint_expression(expr: &str) -> Result<Condition, ConditionError> {
    Condition::parse(expr)
}

/// Lint a whole script.
///
/// Placeholders are checked against `sample` augmented with derived
/// variables, so `time_of_day` and friends count as resolved.
pub fn lint_script(
    script: &CharacterScript,
    sample: &Variables,
    config: &DerivedConfig,
) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let vars = augment(sample, 12, config);

    for (i, template) in script.templates.iter().enumerate() {
        for name in unresolved(template, &vars) {
            issues.push(LintIssue::UnresolvedPlaceholder {
                location: format!("template #{}", i + 1),
                name: name.to_string(),
            });
        }
    }

    for entry in &script.lorebook {
        match &entry.policy {
            UnlockPolicy::Condition { expr: Some(expr) } => {
                if let Err(error) = lint_expression(expr) {
                    issues.push(LintIssue::MalformedUnlockExpr {
                        key: entry.key.clone(),
                        error,
                    });
                }
            }
            UnlockPolicy::PaidItem { sku: None } => {
                issues.push(LintIssue::PaidItemWithoutSku {
                    key: entry.key.clone(),
                });
            }
            UnlockPolicy::Unknown { tag } => issues.push(LintIssue::UnknownPolicy {
                key: entry.key.clone(),
                tag: tag.clone(),
            }),
            _ => {}
        }

        for name in unresolved(&entry.value, &vars) {
            issues.push(LintIssue::UnresolvedPlaceholder {
                location: format!("lorebook entry '{}'", entry.key),
                name: name.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    for rule in &script.rules {
        if !seen.insert(rule.id.as_str()) {
            issues.push(LintIssue::DuplicateRuleId {
                rule: rule.id.clone(),
            });
        }
        if !rule.condition.trim().is_empty() {
            if let Err(error) = lint_expression(&rule.condition) {
                issues.push(LintIssue::MalformedCondition {
                    rule: rule.id.clone(),
                    error,
                });
            }
        }
        if rule.effects.is_empty() {
            issues.push(LintIssue::NoEffects {
                rule: rule.id.clone(),
            });
        }
        if rule.effects.iter().any(|e| e.var().trim().is_empty()) {
            issues.push(LintIssue::EmptyEffectVariable {
                rule: rule.id.clone(),
            });
        }
    }

    issues
}
