//! # Memory & Variable Substitution
//!
//! Values remembered from earlier responses in a scenario run, and the two
//! ways later steps consume them:
//!
//! - `$(name)` placeholders spliced as text into headers and request content
//! - `"$name"` variable values replaced by the remembered value itself

use std::collections::HashMap;

use crate::value::{lookup, render, Map, Value};

/// Prefix marking a variable value as a reference into memory.
pub const VAR_SIGIL: char = '$';

/// Per-run store of remembered values. Each scenario run owns a fresh one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memory {
    values: HashMap<String, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store the value found at `path` inside `target` under `record_key`.
    /// A path that does not resolve stores nothing and returns `false`.
    pub fn remember<S: AsRef<str>>(&mut self, target: &Value, record_key: &str, path: &[S]) -> bool {
        if path.is_empty() {
            return false;
        }
        match lookup(target, path) {
            Some(found) => {
                self.values.insert(record_key.to_string(), found.clone());
                true
            }
            None => false,
        }
    }

    /// Replace `$(name)` placeholders with the rendered remembered value.
    /// Unknown names stay as literal text. Substituted text is not rescanned.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("$(") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find(')') {
                Some(end) => {
                    let name = &after[..end];
                    match self.values.get(name) {
                        Some(value) => result.push_str(&render(value)),
                        None => {
                            result.push_str("$(");
                            result.push_str(name);
                            result.push(')');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Resolve a step's variables: string values starting with `$` are
    /// replaced by the remembered value of that name (null when unknown).
    pub fn resolve_vars(&self, vars: &Map<String, Value>) -> Map<String, Value> {
        vars.iter()
            .map(|(name, value)| {
                let resolved = match value {
                    Value::String(text) if text.starts_with(VAR_SIGIL) => self
                        .values
                        .get(&text[VAR_SIGIL.len_utf8()..])
                        .cloned()
                        .unwrap_or(Value::Null),
                    other => other.clone(),
                };
                (name.clone(), resolved)
            })
            .collect()
    }
}
