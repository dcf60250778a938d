//! # Chat Runtime
//!
//! The per-turn engine of the conversation runtime. Reads and mutates the
//! `chat_state` session model and produces the context handed to the
//! prompt assembler.
//!
//! ## Core Components
//!
//! - **condition**: The Condition Evaluator - single `<name> <op> <int>` comparisons
//! - **template**: The Template Interpolator and derived variables (`time_of_day`, `call_sign`)
//! - **lorebook**: The Unlock Filter - gated knowledge entries
//! - **triggers**: The Trigger Rule Engine - conditional, optionally one-shot variable writes
//! - **events**: Chat event types that drive a turn
//! - **turn**: Turn assembly and the async load/assemble/save runner
//! - **script**: Authored per-character input (templates, lorebook, rules)
//! - **lint**: Authoring checks for scripts
//!
//! ## Design Philosophy
//!
//! - **Fail-Open**: Malformed authored content never blocks a conversation
//! - **Ordered**: Rules fire before gating, so a rule's writes unlock entries in the same turn
//! - **Storage-Agnostic**: The runtime talks to a `RuntimeStore`, never to storage directly

pub mod condition;
pub mod events;
pub mod lint;
pub mod lorebook;
pub mod script;
pub mod template;
pub mod triggers;
pub mod turn;

pub use condition::{CompareOp, Condition, ConditionError};
pub use events::*;
pub use lint::{lint_script, LintIssue};
pub use lorebook::*;
pub use script::*;
pub use template::{augment, interpolate, render};
pub use triggers::*;
pub use turn::*;
