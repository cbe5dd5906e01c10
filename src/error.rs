//! Error types for loading and running scenarios.

use std::path::PathBuf;

use thiserror::Error;

use crate::testing::Mismatch;

/// Failure of the request capability itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("request failed: {0}")]
    Failed(String),
}

/// Why a single step failed. Every variant is local to the step that raised
/// it; the scenario runner decides whether later steps still execute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("configuration error in step `{label}`: {reason}")]
    Configuration { label: String, reason: String },

    #[error("transport error in step `{label}`: {source}")]
    Transport {
        label: String,
        #[source]
        source: TransportError,
    },

    #[error("status code mismatch in step `{label}`. Expected {expected}, received {actual}")]
    StatusMismatch {
        label: String,
        expected: u16,
        actual: u16,
    },

    #[error("response of step `{label}` is not valid JSON: {message}")]
    Parse {
        label: String,
        message: String,
        body: String,
    },

    #[error("step `{label}` result does not match expected at {mismatch}")]
    Match { label: String, mismatch: Mismatch },

    #[error("step `{label}` mismatch at line {line} column {column}")]
    TextMismatch {
        label: String,
        line: usize,
        column: usize,
    },
}

impl StepError {
    pub fn configuration(label: &str, reason: impl Into<String>) -> Self {
        StepError::Configuration {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    /// Short category name used in run reports.
    pub fn category(&self) -> &'static str {
        match self {
            StepError::Configuration { .. } => "configuration",
            StepError::Transport { .. } => "transport",
            StepError::StatusMismatch { .. } => "status",
            StepError::Parse { .. } => "parse",
            StepError::Match { .. } => "match",
            StepError::TextMismatch { .. } => "text",
        }
    }
}

/// Errors raised while reading scenario files.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid step in `{}`: {message}", .path.display())]
    InvalidStep { path: PathBuf, message: String },

    #[error("include cycle detected at `{}`", .path.display())]
    IncludeCycle { path: PathBuf },
}

/// A use case in a multi-scenario run failed.
#[derive(Debug, Error)]
#[error("{source_name}: {error}")]
pub struct RunError {
    pub source_name: String,
    pub error: StepError,
}
