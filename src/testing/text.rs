use std::fmt::{self, Display};

use crate::value::Value;

use super::string_matches;

/// Position of the first divergence in a text expectation, 1-based.
/// Column 0 means the actual text ran out of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMismatch {
    pub line: usize,
    pub column: usize,
}

impl Display for TextMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mismatch at line {} column {}", self.line, self.column)
    }
}

/// Compare `actual` against `expected` line by line.
///
/// Each expected line is either a prefix of the actual line or, written as
/// `/…/`, a regular expression the actual line must match. Lines in `actual`
/// beyond the last expected line are ignored.
pub fn compare_text(expected: &str, actual: &str) -> Option<TextMismatch> {
    let actual_lines: Vec<&str> = actual.split('\n').collect();

    for (index, expected_line) in expected.split('\n').enumerate() {
        let line = index + 1;
        let Some(actual_line) = actual_lines.get(index) else {
            return Some(TextMismatch { line, column: 0 });
        };

        let actual_value = Value::String((*actual_line).to_string());
        if actual_line.starts_with(expected_line)
            || string_matches(Some(&actual_value), expected_line)
        {
            continue;
        }

        return Some(TextMismatch {
            line,
            column: first_divergent_column(expected_line, actual_line),
        });
    }

    None
}

fn first_divergent_column(expected: &str, actual: &str) -> usize {
    let mut actual_chars = actual.chars();
    let mut column = 1;
    for expected_char in expected.chars() {
        match actual_chars.next() {
            Some(actual_char) if actual_char == expected_char => column += 1,
            _ => return column,
        }
    }
    column
}
