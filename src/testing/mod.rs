//! # Testing & Assertions
//!
//! Decides whether a response satisfies a step's expectation.
//!
//! - [`match_value`] compares a parsed response tree against a partial
//!   expected tree.
//! - [`sort_by_key`] normalizes array ordering before comparison.
//! - [`compare_text`] handles plain-text expectations line by line.

mod matcher;
mod sort;
mod text;

pub use matcher::{match_value, Mismatch, EXACT_KEYS_SENTINEL};
pub use sort::sort_by_key;
pub use text::{compare_text, TextMismatch};

pub(crate) use matcher::string_matches;
