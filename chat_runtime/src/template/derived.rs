//! Derived variables - computed on every read, never stored.

use chat_state::{DerivedConfig, VarValue, Variables, AFFECTION, AFFECTION_SCORE};

pub const TIME_OF_DAY: &str = "time_of_day";
pub const USER_NAME: &str = "user_name";
pub const CALL_SIGN: &str = "call_sign";

/// Return a copy of `vars` with derived variables filled in.
///
/// - `time_of_day`: bucket of `hour`, if not stored
/// - `affection` / `affection_score`: whichever is missing mirrors the other
/// - `call_sign`: `user_name`, with a familiar suffix once affection reaches
///   the configured threshold, if not stored
///
/// Stored values always win over derived ones. The result must not be
/// persisted, or `call_sign` would freeze at the current affection.
pub fn augment(vars: &Variables, hour: u32, config: &DerivedConfig) -> Variables {
    let mut out = vars.clone();

    if !out.contains(TIME_OF_DAY) {
        out.set(TIME_OF_DAY, config.time_of_day(hour));
    }

    for name in [AFFECTION, AFFECTION_SCORE] {
        if !out.contains(name) {
            if let Some(value) = vars.resolve(name).cloned() {
                out.set(name, value);
            }
        }
    }

    if !out.contains(CALL_SIGN) {
        if let Some(call_sign) = call_sign(vars, config) {
            out.set(CALL_SIGN, call_sign);
        }
    }

    out
}

/// Synthesize a call sign from `user_name` and current affection.
pub fn call_sign(vars: &Variables, config: &DerivedConfig) -> Option<String> {
    let name = vars.get(USER_NAME).map(VarValue::as_text)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if vars.affection() >= config.familiar_threshold {
        Some(familiar_form(name))
    } else {
        Some(name.to_string())
    }
}

/// Append the Korean vocative particle: `아` after a final consonant,
/// `야` otherwise. Names not ending in a Hangul syllable are unchanged.
pub fn familiar_form(name: &str) -> String {
    match name.chars().last().and_then(has_final_consonant) {
        Some(true) => format!("{}아", name),
        Some(false) => format!("{}야", name),
        None => name.to_string(),
    }
}

/// `None` when `c` is not a precomposed Hangul syllable.
fn has_final_consonant(c: char) -> Option<bool> {
    const FIRST: u32 = 0xAC00;
    const LAST: u32 = 0xD7A3;
    const FINALS: u32 = 28;

    let code = c as u32;
    if !(FIRST..=LAST).contains(&code) {
        return None;
    }
    Some((code - FIRST) % FINALS != 0)
}
