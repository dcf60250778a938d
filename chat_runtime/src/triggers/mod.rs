//! Trigger Rule Engine - ordered IF-THEN rules that mutate session variables.
//!
//! For each event, rules run in order:
//! 1. **Scope**: skip rules listening to a different event kind
//! 2. **Once**: skip one-shot rules that already fired this session
//! 3. **Condition**: evaluate against the current snapshot, which includes
//!    writes made by earlier rules in the same pass
//! 4. **Apply**: stage all effects, then commit them together; a rule whose
//!    effects fail to stage writes nothing and is not marked fired
//! 5. **Record**: stamp the firing time in the session's fired-rule map
//!
//! Applied effects are never rolled back.

mod rule;

pub use rule::*;

use chat_state::SessionState;
use chrono::{DateTime, Utc};

use crate::condition;
use crate::events::ChatEvent;

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerReport {
    /// Ids of rules that fired, in firing order.
    pub fired: Vec<String>,

    /// Rules whose condition held but whose effects were rejected.
    pub rejected: Vec<(String, EffectError)>,
}

impl TriggerReport {
    pub fn has_fired(&self, rule_id: &str) -> bool {
        self.fired.iter().any(|id| id == rule_id)
    }
}

/// An ordered rule set for one character.
#[derive(Debug, Clone, Default)]
pub struct TriggerEngine {
    rules: Vec<TriggerRule>,
}

impl TriggerEngine {
    pub fn new(rules: Vec<TriggerRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    /// Evaluate every rule against `event`, mutating `state` in place.
    pub fn evaluate(
        &self,
        event: &ChatEvent,
        state: &mut SessionState,
        now: DateTime<Utc>,
    ) -> TriggerReport {
        evaluate_rules(&self.rules, event, state, now)
    }
}

/// Evaluate an ordered rule slice. See the module docs for the steps.
pub fn evaluate_rules(
    rules: &[TriggerRule],
    event: &ChatEvent,
    state: &mut SessionState,
    now: DateTime<Utc>,
) -> TriggerReport {
    let mut report = TriggerReport::default();
    let kind = event.kind();

    for rule in rules {
        if !rule.listens_to(kind) {
            continue;
        }
        if rule.once && state.fired.has_fired(&rule.id) {
            continue;
        }

        let holds =
            rule.condition.trim().is_empty() || condition::evaluate(&rule.condition, &state.variables);
        if !holds {
            continue;
        }

        let staged = match rule.stage(&state.variables) {
            Ok(staged) => staged,
            Err(error) => {
                tracing::warn!(rule = %rule.id, %error, "trigger effects rejected");
                report.rejected.push((rule.id.clone(), error));
                continue;
            }
        };

        for (var, value) in staged {
            state.variables.set(var, value);
        }
        state.fired.record(rule.id.clone(), now);
        report.fired.push(rule.id.clone());
    }

    if !report.fired.is_empty() {
        state.touch(now);
    }

    tracing::debug!(
        event = ?kind,
        fired = ?report.fired,
        rejected = report.rejected.len(),
        "trigger rules evaluated"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use chat_state::Variables;

    fn msg() -> ChatEvent {
        ChatEvent::user_message("hi")
    }

    #[test]
    fn test_one_shot_fires_once() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("welcome", "").with_effect(Effect::add("affection", 5.0))
        ]);
        let mut state = SessionState::new();

        let first = engine.evaluate(&msg(), &mut state, Utc::now());
        let second = engine.evaluate(&msg(), &mut state, Utc::now());

        assert_eq!(first.fired, vec!["welcome"]);
        assert!(second.fired.is_empty());
        assert_eq!(state.variables.get_number("affection"), 5.0);
        assert!(state.fired.has_fired("welcome"));
    }

    #[test]
    fn test_repeatable_fires_every_time() {
        let engine = TriggerEngine::new(vec![TriggerRule::new("chat", "")
            .with_effect(Effect::add("affection", 1.0))
            .repeatable()]);
        let mut state = SessionState::new();

        for _ in 0..3 {
            engine.evaluate(&msg(), &mut state, Utc::now());
        }
        assert_eq!(state.variables.get_number("affection"), 3.0);
    }

    #[test]
    fn test_later_rules_see_earlier_writes() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("gift", "").with_effect(Effect::add("affection", 20.0)),
            TriggerRule::new("close", "affection >= 60").with_effect(Effect::set("stage", "close")),
        ]);
        let mut state = SessionState::with_variables(Variables::new().with("affection", 40));

        let report = engine.evaluate(&msg(), &mut state, Utc::now());

        assert_eq!(report.fired, vec!["gift", "close"]);
        assert_eq!(state.variables.get_text("stage"), "close");
    }

    #[test]
    fn test_order_matters() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("close", "affection >= 60").with_effect(Effect::set("stage", "close")),
            TriggerRule::new("gift", "").with_effect(Effect::add("affection", 20.0)),
        ]);
        let mut state = SessionState::with_variables(Variables::new().with("affection", 40));

        let report = engine.evaluate(&msg(), &mut state, Utc::now());
        assert_eq!(report.fired, vec!["gift"]);

        // Next event: the condition now holds.
        let report = engine.evaluate(&msg(), &mut state, Utc::now());
        assert_eq!(report.fired, vec!["close"]);
    }

    #[test]
    fn test_false_condition_does_not_mark_fired() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("late", "affection >= 50").with_effect(Effect::set("late", true))
        ]);
        let mut state = SessionState::new();

        engine.evaluate(&msg(), &mut state, Utc::now());
        assert!(!state.fired.has_fired("late"));

        state.variables.set("affection", 50);
        let report = engine.evaluate(&msg(), &mut state, Utc::now());
        assert!(report.has_fired("late"));
    }

    #[test]
    fn test_rules_read_and_write_legacy_affection_score() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("gift", "affection >= 30").with_effect(Effect::add("affection", 20.0))
        ]);
        let mut state = SessionState::with_variables(Variables::new().with("affection_score", 40));

        let report = engine.evaluate(&msg(), &mut state, Utc::now());

        assert_eq!(report.fired, vec!["gift"]);
        assert_eq!(state.variables.affection(), 60.0);
        assert_eq!(state.variables.get_number("affection_score"), 60.0);
        assert!(!state.variables.contains("affection"));
    }

    #[test]
    fn test_malformed_condition_fires() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("typo", "affection ~~ 50").with_effect(Effect::set("hit", true))
        ]);
        let mut state = SessionState::new();

        engine.evaluate(&msg(), &mut state, Utc::now());
        assert!(state.variables.get_bool("hit"));
    }

    #[test]
    fn test_event_scope() {
        let engine = TriggerEngine::new(vec![TriggerRule::new("thanks", "")
            .on(EventKind::Purchase)
            .with_effect(Effect::add("affection", 10.0))]);
        let mut state = SessionState::new();

        engine.evaluate(&msg(), &mut state, Utc::now());
        assert_eq!(state.variables.get_number("affection"), 0.0);

        engine.evaluate(
            &ChatEvent::Purchase { sku: "rose".into() },
            &mut state,
            Utc::now(),
        );
        assert_eq!(state.variables.get_number("affection"), 10.0);
    }

    #[test]
    fn test_rejected_effects_apply_nothing() {
        let engine = TriggerEngine::new(vec![TriggerRule::new("broken", "")
            .with_effect(Effect::set("first", 1))
            .with_effect(Effect::add("", 1.0))]);
        let mut state = SessionState::new();

        let report = engine.evaluate(&msg(), &mut state, Utc::now());

        assert!(report.fired.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert!(!state.variables.contains("first"));
        assert!(!state.fired.has_fired("broken"));
    }

    #[test]
    fn test_reset_variables_keeps_one_shot_bookkeeping() {
        let engine = TriggerEngine::new(vec![
            TriggerRule::new("welcome", "").with_effect(Effect::add("affection", 5.0))
        ]);
        let mut state = SessionState::new();

        engine.evaluate(&msg(), &mut state, Utc::now());
        state.reset_variables();
        engine.evaluate(&msg(), &mut state, Utc::now());

        assert_eq!(state.variables.get_number("affection"), 0.0);
    }

    #[test]
    fn test_fired_timestamp_and_touch() {
        let engine = TriggerEngine::new(vec![TriggerRule::new("r", "")]);
        let mut state = SessionState::new();
        let now = Utc::now();

        engine.evaluate(&msg(), &mut state, now);

        assert_eq!(state.fired.fired_at("r"), Some(now));
        assert_eq!(state.updated_at, Some(now));
    }
}
