use std::time::Duration;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::HttpMethod;
use crate::value::{Map, Value};

/// Timeout applied when a step does not carry a usable one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// What a step expects in the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Compared line by line against the raw body.
    Text(String),
    /// Compared structurally against the parsed body.
    Tree(Value),
}

impl Expectation {
    /// Classify a scenario `expect` value. Null means nothing is checked; a
    /// string or a list of strings is a text expectation.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Expectation::Text(text)),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                let lines: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                Some(Expectation::Text(lines.join("\n")))
            }
            other => Some(Expectation::Tree(other)),
        }
    }
}

impl Serialize for Expectation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expectation::Text(text) => serialize_lines(text, serializer),
            Expectation::Tree(value) => value.serialize(serializer),
        }
    }
}

/// One request/response cycle of a use case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub label: String,

    #[serde(
        default,
        deserialize_with = "text_or_lines",
        serialize_with = "serialize_lines",
        skip_serializing_if = "String::is_empty"
    )]
    pub comment: String,

    /// Relative to the configured base unless it starts with `/`.
    #[serde(default)]
    pub path: String,

    /// Request body. Non-empty content makes the step a POST.
    #[serde(
        default,
        deserialize_with = "text_or_lines",
        serialize_with = "serialize_lines",
        skip_serializing_if = "String::is_empty"
    )]
    pub content: String,

    #[serde(default, rename = "json", skip_serializing_if = "is_false")]
    pub use_json: bool,

    /// Memory key to dot-path into the response.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub remember: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub op: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,

    /// Dot-path of an array to the element key it is sorted by.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sort_by: IndexMap<String, String>,

    #[serde(
        default,
        deserialize_with = "expectation",
        skip_serializing_if = "Option::is_none"
    )]
    pub expect: Option<Expectation>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub always: bool,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,

    #[serde(default = "default_timeout", deserialize_with = "timeout_seconds")]
    pub timeout: u64,

    /// Expected HTTP status, 0 to skip the check.
    #[serde(default, deserialize_with = "status_code", skip_serializing_if = "is_zero")]
    pub status: u16,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            label: String::new(),
            comment: String::new(),
            path: String::new(),
            content: String::new(),
            use_json: false,
            remember: IndexMap::new(),
            op: String::new(),
            vars: Map::new(),
            sort_by: IndexMap::new(),
            expect: None,
            always: false,
            headers: IndexMap::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            status: 0,
        }
    }
}

impl Step {
    pub fn method(&self) -> HttpMethod {
        if self.content.is_empty() {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        }
    }

    pub fn timeout(&self) -> Duration {
        let seconds = if self.timeout == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout
        };
        Duration::from_secs(seconds)
    }

    /// `label: comment`, or whichever of the two is present.
    pub fn description(&self) -> Option<String> {
        let parts: Vec<&str> = [self.label.as_str(), self.comment.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(": "))
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn is_zero(status: &u16) -> bool {
    *status == 0
}

/// Join a string or a list of strings into one newline-separated string.
pub(crate) fn join_lines(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("{item} is not a valid string element"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n")),
        other => Err(format!("{other} is not a valid string element")),
    }
}

pub(crate) fn text_or_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    join_lines(&value).map_err(D::Error::custom)
}

/// Multi-line text is written back as a list of lines.
pub(crate) fn serialize_lines<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if text.contains('\n') {
        serializer.collect_seq(text.split('\n'))
    } else {
        serializer.serialize_str(text)
    }
}

fn expectation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Expectation>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(Expectation::from_value(value))
}

fn timeout_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|seconds| *seconds >= 1.0)
        .map(|seconds| seconds as u64)
        .unwrap_or(DEFAULT_TIMEOUT_SECS))
}

fn status_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|code| (0.0..=f64::from(u16::MAX)).contains(code))
        .map(|code| code as u16)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Step {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn minimal_step_uses_defaults() {
        let step = parse(json!({"label": "ping"}));
        assert_eq!(step.label, "ping");
        assert_eq!(step.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(step.status, 0);
        assert_eq!(step.expect, None);
        assert_eq!(step.method(), HttpMethod::Get);
        assert!(!step.use_json);
    }

    #[test]
    fn full_step_parses_every_field() {
        let step = parse(json!({
            "label": "create",
            "comment": ["Create a song", "and remember it"],
            "path": "/api",
            "content": "mutation { createSong(name: \"x\") { id } }",
            "json": true,
            "remember": {"sid": "data.createSong.id"},
            "op": "Create",
            "vars": {"n": 1, "id": "$sid"},
            "sortBy": {"data.songs": "name", "data.artists": "name"},
            "expect": {"data": {"createSong": {"id": "/.+/"}}},
            "always": true,
            "headers": {"X-Id": "$(sid)"},
            "timeout": 3,
            "status": 200
        }));

        assert_eq!(step.comment, "Create a song\nand remember it");
        assert_eq!(step.method(), HttpMethod::Post);
        assert!(step.use_json);
        assert!(step.always);
        assert_eq!(step.remember["sid"], "data.createSong.id");
        assert_eq!(step.vars["id"], json!("$sid"));
        let sort_paths: Vec<&str> = step.sort_by.keys().map(String::as_str).collect();
        assert_eq!(sort_paths, vec!["data.songs", "data.artists"]);
        assert_eq!(step.headers["X-Id"], "$(sid)");
        assert_eq!(step.timeout(), Duration::from_secs(3));
        assert_eq!(step.status, 200);
        assert!(matches!(step.expect, Some(Expectation::Tree(_))));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        assert_eq!(parse(json!({"timeout": "soon"})).timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse(json!({"timeout": 0})).timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse(json!({"timeout": 2.0})).timeout, 2);
    }

    #[test]
    fn expect_strings_and_lines_are_text() {
        let step = parse(json!({"expect": ["<html>", "</html>"]}));
        assert_eq!(step.expect, Some(Expectation::Text("<html>\n</html>".into())));

        let step = parse(json!({"expect": "ok"}));
        assert_eq!(step.expect, Some(Expectation::Text("ok".into())));

        let step = parse(json!({"expect": null}));
        assert_eq!(step.expect, None);

        let step = parse(json!({"expect": [1, 2]}));
        assert_eq!(step.expect, Some(Expectation::Tree(json!([1, 2]))));
    }

    #[test]
    fn wrongly_typed_fields_are_rejected() {
        assert!(serde_json::from_value::<Step>(json!({"remember": {"a": 1}})).is_err());
        assert!(serde_json::from_value::<Step>(json!({"comment": [1]})).is_err());
        assert!(serde_json::from_value::<Step>(json!({"headers": "X: y"})).is_err());
    }

    #[test]
    fn serializes_back_with_lines() {
        let step = parse(json!({
            "label": "page",
            "comment": "line one\nline two",
            "expect": "a\nb",
            "status": 200
        }));
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["comment"], json!(["line one", "line two"]));
        assert_eq!(value["expect"], json!(["a", "b"]));
        assert_eq!(value["status"], json!(200));
        assert!(value.get("json").is_none());
        assert!(value.get("vars").is_none());
    }

    #[test]
    fn description_joins_label_and_comment() {
        let step = Step {
            label: "list".into(),
            comment: "all artists".into(),
            ..Step::default()
        };
        assert_eq!(step.description().as_deref(), Some("list: all artists"));
        assert_eq!(Step::default().description(), None);
    }
}
