use std::fmt::{self, Display};

use regex::Regex;

use crate::value::{render, render_opt, Number, Value};

/// Key that turns an expected object from subset matching into exact
/// membership: populated keys of the actual object that the expectation
/// does not name become mismatches.
pub const EXACT_KEYS_SENTINEL: &str = "*";

/// First divergence found between an actual and an expected tree.
///
/// `path` holds object keys and array indices from the root down to the
/// diverging node. `None` on either side means the value was absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub path: Vec<String>,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
}

impl Mismatch {
    fn here(actual: Option<&Value>, expected: Option<&Value>) -> Self {
        Self {
            path: Vec::new(),
            actual: actual.cloned(),
            expected: expected.cloned(),
        }
    }

    fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Dot-joined locator, `(root)` when the root itself diverges.
    pub fn locator(&self) -> String {
        if self.path.is_empty() {
            "(root)".to_string()
        } else {
            self.path.join(".")
        }
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} != {}",
            self.locator(),
            render_opt(self.actual.as_ref()),
            render_opt(self.expected.as_ref())
        )
    }
}

/// Match `actual` against the partial tree `expected`, returning the first
/// mismatch or `None` when the expectation is satisfied.
///
/// Rules by the kind of the expected node:
/// - object: every expected key must match the actual key (absent counts as
///   null); with the `"*"` key present, any other populated actual key fails
/// - array: element-wise, lengths must agree
/// - string: `/…/` is a regular expression against the actual text,
///   anything else is exact string equality
/// - number: numeric equality across integer and float forms
/// - bool and null: exact equality
pub fn match_value(actual: &Value, expected: &Value) -> Option<Mismatch> {
    match_at(Some(actual), expected)
}

fn match_at(actual: Option<&Value>, expected: &Value) -> Option<Mismatch> {
    match expected {
        Value::Object(expected_map) => {
            let Some(Value::Object(actual_map)) = actual else {
                return Some(Mismatch::here(actual, Some(expected)));
            };

            let mut exact = false;
            for (key, expected_child) in expected_map {
                if key == EXACT_KEYS_SENTINEL {
                    exact = true;
                    continue;
                }
                if let Some(mismatch) = match_at(actual_map.get(key), expected_child) {
                    return Some(mismatch.within(key.clone()));
                }
            }

            if exact {
                for (key, actual_child) in actual_map {
                    let checked = key != EXACT_KEYS_SENTINEL && expected_map.contains_key(key);
                    if !checked && !actual_child.is_null() {
                        return Some(Mismatch::here(Some(actual_child), None).within(key.clone()));
                    }
                }
            }
            None
        }
        Value::Array(expected_items) => {
            let Some(Value::Array(actual_items)) = actual else {
                return Some(Mismatch::here(actual, Some(expected)));
            };

            for (index, expected_item) in expected_items.iter().enumerate() {
                let Some(actual_item) = actual_items.get(index) else {
                    return Some(Mismatch::here(None, Some(expected_item)).within(index.to_string()));
                };
                if let Some(mismatch) = match_at(Some(actual_item), expected_item) {
                    return Some(mismatch.within(index.to_string()));
                }
            }

            let surplus = expected_items.len();
            if let Some(extra) = actual_items.get(surplus) {
                return Some(Mismatch::here(Some(extra), None).within(surplus.to_string()));
            }
            None
        }
        Value::String(pattern) => {
            (!string_matches(actual, pattern)).then(|| Mismatch::here(actual, Some(expected)))
        }
        Value::Number(expected_number) => match actual {
            Some(Value::Number(actual_number)) if numbers_equal(actual_number, expected_number) => None,
            _ => Some(Mismatch::here(actual, Some(expected))),
        },
        Value::Bool(expected_flag) => match actual {
            Some(Value::Bool(actual_flag)) if actual_flag == expected_flag => None,
            _ => Some(Mismatch::here(actual, Some(expected))),
        },
        Value::Null => match actual {
            None | Some(Value::Null) => None,
            Some(other) => Some(Mismatch::here(Some(other), Some(expected))),
        },
    }
}

/// String rule shared with text expectations: a pattern wrapped in slashes
/// is a regular expression matched against the rendered actual value;
/// otherwise the actual value must be the identical string.
pub(crate) fn string_matches(actual: Option<&Value>, pattern: &str) -> bool {
    if let Some(regex) = regex_body(pattern) {
        let Ok(regex) = Regex::new(regex) else {
            return false;
        };
        return match actual {
            Some(Value::String(text)) => regex.is_match(text),
            Some(other) => regex.is_match(&render(other)),
            None => regex.is_match(&render(&Value::Null)),
        };
    }

    matches!(actual, Some(Value::String(text)) if text == pattern)
}

fn regex_body(pattern: &str) -> Option<&str> {
    if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        Some(&pattern[1..pattern.len() - 1])
    } else {
        None
    }
}

fn numbers_equal(actual: &Number, expected: &Number) -> bool {
    if let (Some(a), Some(b)) = (actual.as_i64(), expected.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (actual.as_u64(), expected.as_u64()) {
        return a == b;
    }
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
