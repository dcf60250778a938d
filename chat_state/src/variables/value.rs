//! Runtime variable values.

use serde::{Deserialize, Serialize};

/// A single runtime variable value.
///
/// Serialized untagged so a snapshot reads as a plain JSON/TOML table
/// (`{"affection": 40, "user_name": "민수"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Anything else an external writer stored (arrays, objects, null).
    Json(serde_json::Value),
}

impl VarValue {
    /// Numeric view of the value.
    ///
    /// Coercion is permissive: numeric-like strings parse, booleans map to
    /// 1/0, and everything else is 0.
    pub fn as_number(&self) -> f64 {
        match self {
            VarValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            VarValue::Int(i) => *i as f64,
            VarValue::Float(f) if f.is_finite() => *f,
            VarValue::Float(_) => 0.0,
            VarValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            VarValue::Json(v) => v.as_f64().unwrap_or(0.0),
        }
    }

    /// String form used for template substitution.
    pub fn as_text(&self) -> String {
        match self {
            VarValue::Bool(b) => b.to_string(),
            VarValue::Int(i) => i.to_string(),
            VarValue::Float(f) => format_number(*f),
            VarValue::Text(s) => s.clone(),
            VarValue::Json(serde_json::Value::String(s)) => s.clone(),
            VarValue::Json(v) => v.to_string(),
        }
    }

    /// Truthiness of the value.
    pub fn as_bool(&self) -> bool {
        match self {
            VarValue::Bool(b) => *b,
            VarValue::Int(i) => *i != 0,
            VarValue::Float(f) => *f != 0.0 && !f.is_nan(),
            VarValue::Text(s) => !s.is_empty(),
            VarValue::Json(v) => !v.is_null(),
        }
    }

    /// Build a numeric value, keeping whole numbers as integers.
    pub fn number(n: f64) -> Self {
        if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
            VarValue::Int(n as i64)
        } else {
            VarValue::Float(n)
        }
    }
}

/// Format a float without a trailing `.0` when it is a whole number.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Int(value)
    }
}

impl From<i32> for VarValue {
    fn from(value: i32) -> Self {
        VarValue::Int(value as i64)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::Text(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::Text(value)
    }
}

impl std::fmt::Display for VarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}
