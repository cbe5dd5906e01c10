use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::value::Value;

use super::step::{serialize_lines, text_or_lines, Step};

/// An ordered list of steps sharing one memory per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UseCase {
    #[serde(serialize_with = "serialize_lines", skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// Where the use case was read from, for diagnostics.
    #[serde(skip)]
    pub source: String,

    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct UseCaseFile {
    #[serde(default, deserialize_with = "text_or_lines")]
    comment: String,
    #[serde(default)]
    steps: Value,
}

impl UseCase {
    pub fn new(source: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            comment: String::new(),
            source: source.into(),
            steps,
        }
    }

    /// Read a use case file. String entries in `steps` include further
    /// files, relative to the including file, whose top level is an array
    /// of steps and includes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = read_file(path)?;
        let file: UseCaseFile = serde_json::from_str(&raw).map_err(|source| ScenarioError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let mut loader = StepLoader {
            stack: vec![identity(path)],
            steps: Vec::new(),
        };
        loader.add(path, file.steps)?;

        Ok(Self {
            comment: file.comment,
            source: path.display().to_string(),
            steps: loader.steps,
        })
    }

    /// The use case as a scenario document, for debug dumps.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

struct StepLoader {
    stack: Vec<PathBuf>,
    steps: Vec<Step>,
}

impl StepLoader {
    fn add(&mut self, origin: &Path, entry: Value) -> Result<(), ScenarioError> {
        match entry {
            Value::Null => Ok(()),
            Value::Array(entries) => {
                for entry in entries {
                    self.add(origin, entry)?;
                }
                Ok(())
            }
            Value::String(include) => self.include(origin, &include),
            Value::Object(_) => {
                let step: Step = serde_json::from_value(entry).map_err(|err| ScenarioError::InvalidStep {
                    path: origin.to_path_buf(),
                    message: err.to_string(),
                })?;
                self.steps.push(step);
                Ok(())
            }
            other => Err(ScenarioError::InvalidStep {
                path: origin.to_path_buf(),
                message: format!("{other} is not a valid steps type"),
            }),
        }
    }

    fn include(&mut self, origin: &Path, include: &str) -> Result<(), ScenarioError> {
        let path = origin
            .parent()
            .map(|dir| dir.join(include))
            .unwrap_or_else(|| PathBuf::from(include));

        let id = identity(&path);
        if self.stack.contains(&id) {
            return Err(ScenarioError::IncludeCycle { path });
        }

        let raw = read_file(&path)?;
        let entries: Vec<Value> = serde_json::from_str(&raw).map_err(|source| ScenarioError::Json {
            path: path.clone(),
            source,
        })?;

        self.stack.push(id);
        for entry in entries {
            self.add(&path, entry)?;
        }
        self.stack.pop();
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ScenarioError> {
    fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
