//! Template Interpolator - resolves `{{name}}` placeholders from a snapshot.
//!
//! A placeholder whose variable is absent stays in the output verbatim so
//! prompt authors can see what did not resolve. Callers should interpolate
//! against an [`augment`]ed snapshot so derived variables resolve too.

mod derived;

pub use derived::*;

use chat_state::{DerivedConfig, Variables};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replace every `{{name}}` with the string form of `vars[name]`.
pub fn interpolate(template: &str, vars: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];

        let Some(end) = after.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = after[..end].trim();
        if !is_placeholder_name(name) {
            // Not a placeholder; keep the braces and rescan after them.
            out.push_str(OPEN);
            rest = after;
            continue;
        }

        match vars.get(name) {
            Some(value) => out.push_str(&value.as_text()),
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Augment `vars` with derived variables for `hour`, then interpolate.
pub fn render(template: &str, vars: &Variables, hour: u32, config: &DerivedConfig) -> String {
    interpolate(template, &augment(vars, hour, config))
}

/// Names of all placeholders in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        let name = after[..end].trim();
        if is_placeholder_name(name) {
            names.push(name);
            rest = &after[end + CLOSE.len()..];
        } else {
            rest = after;
        }
    }

    names
}

/// Placeholders that would be left unresolved against `vars`.
pub fn unresolved<'a>(template: &'a str, vars: &Variables) -> Vec<&'a str> {
    placeholders(template)
        .into_iter()
        .filter(|name| !vars.contains(name))
        .collect()
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
