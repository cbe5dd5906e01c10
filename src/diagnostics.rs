//! Diagnostics sink. Output goes through `tracing`; formatting and colour
//! belong to whichever subscriber the host installs.

use std::fmt::{self, Display};

use crate::config::ShowOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Comment,
    Request,
    Response,
    Debug,
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Comment => "comment",
            Category::Request => "request",
            Category::Response => "response",
            Category::Debug => "debug",
        };
        write!(f, "{label}")
    }
}

/// Emit `message` under `category` if `show` enables it.
pub fn emit(show: &ShowOptions, category: Category, message: impl Display) {
    if !show.enabled(category) {
        return;
    }
    match category {
        Category::Debug => tracing::debug!(category = %category, "{message}"),
        _ => tracing::info!(category = %category, "{message}"),
    }
}
