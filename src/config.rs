//! Runner configuration, passed explicitly into the runner and executor.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Category;

/// Default URL base path for query endpoints.
pub const DEFAULT_BASE: &str = "/graphql";

/// Which diagnostic categories are emitted during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowOptions {
    #[serde(default)]
    pub comments: bool,
    #[serde(default)]
    pub requests: bool,
    #[serde(default)]
    pub responses: bool,
}

impl ShowOptions {
    pub fn all() -> Self {
        Self {
            comments: true,
            requests: true,
            responses: true,
        }
    }

    pub fn enabled(&self, category: Category) -> bool {
        match category {
            Category::Comment => self.comments,
            Category::Request => self.requests,
            Category::Response => self.responses,
            Category::Debug => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Scheme, host and port, e.g. `http://localhost:8080`.
    #[serde(default)]
    pub server: String,
    /// Path prefix for relative step paths.
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default)]
    pub show: ShowOptions,
    /// Indentation for logged response trees; 0 logs them compact.
    #[serde(default)]
    pub indent: usize,
}

fn default_base() -> String {
    DEFAULT_BASE.to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            base: default_base(),
            show: ShowOptions::default(),
            indent: 0,
        }
    }
}

impl RunnerConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_show(mut self, show: ShowOptions) -> Self {
        self.show = show;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
