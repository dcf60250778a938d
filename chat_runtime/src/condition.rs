//! Condition Evaluator - `<name> <op> <integer>` comparisons over a snapshot.
//!
//! Runtime evaluation is fail-open: an expression that does not match the
//! grammar evaluates to `true`. Strict parsing through [`Condition::parse`]
//! is available for authoring checks (see [`crate::lint`]) and never changes
//! what [`evaluate`] returns.

use chat_state::Variables;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an expression does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("expression is empty")]
    Empty,

    #[error("no comparison operator in '{0}'")]
    MissingOperator(String),

    #[error("invalid variable name '{0}'")]
    InvalidName(String),

    #[error("right-hand side '{0}' is not an integer")]
    InvalidLiteral(String),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Ge,
    Le,
    Gt,
    Lt,
    /// Written as `=` or `==`.
    Eq,
}

impl CompareOp {
    /// Apply the comparison.
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Ge => left >= right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Lt => left < right,
            CompareOp::Eq => left == right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "==",
        }
    }

    /// Split a leading operator off `s`, returning it and the remainder.
    fn split_prefix(s: &str) -> Option<(CompareOp, &str)> {
        const OPS: [(&str, CompareOp); 6] = [
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            ("==", CompareOp::Eq),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
            ("=", CompareOp::Eq),
        ];
        OPS.iter()
            .find(|(token, _)| s.starts_with(token))
            .map(|(token, op)| (*op, &s[token.len()..]))
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed single comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub variable: String,
    pub op: CompareOp,
    pub value: i64,
}

impl Condition {
    /// Parse an expression strictly.
    pub fn parse(expr: &str) -> Result<Self, ConditionError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(ConditionError::Empty);
        }

        let op_at = expr
            .find(['<', '>', '='])
            .ok_or_else(|| ConditionError::MissingOperator(expr.to_string()))?;

        let variable = expr[..op_at].trim();
        if variable.is_empty() || !variable.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ConditionError::InvalidName(variable.to_string()));
        }

        let (op, rest) = CompareOp::split_prefix(&expr[op_at..])
            .ok_or_else(|| ConditionError::MissingOperator(expr.to_string()))?;

        let literal = rest.trim();
        let value = literal
            .parse::<i64>()
            .map_err(|_| ConditionError::InvalidLiteral(literal.to_string()))?;

        Ok(Self {
            variable: variable.to_string(),
            op,
            value,
        })
    }

    /// Evaluate against a snapshot. The variable is resolved like every
    /// other read ([`Variables::resolve`]) and coerced to a number
    /// (absent or non-numeric is 0).
    pub fn evaluate(&self, vars: &Variables) -> bool {
        self.op.compare(vars.get_number(&self.variable), self.value as f64)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.variable, self.op, self.value)
    }
}

impl std::str::FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Evaluate an expression against a snapshot, failing open.
///
/// Malformed expressions (including the empty string) return `true`.
pub fn evaluate(expr: &str, vars: &Variables) -> bool {
    match Condition::parse(expr) {
        Ok(condition) => condition.evaluate(vars),
        Err(error) => {
            tracing::debug!(expr, %error, "malformed condition, treating as true");
            true
        }
    }
}
