//! # Value Model
//!
//! Parsed request/response trees are plain `serde_json::Value`s. This module
//! holds the few helpers shared by the matcher, the sorter and the memory
//! store: dot-path splitting, path lookup and the default text rendering.

pub use serde_json::{Map, Number, Value};

/// Parse a response body into a tree. Object keys keep their document order.
pub fn parse_tree(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Split a dot-delimited path into segments. An empty path has no segments.
pub fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').map(str::to_string).collect()
}

/// Resolve `segments` against `value`, walking objects by key and arrays by
/// integer index. Returns `None` as soon as a segment cannot be followed.
pub fn lookup<'a, S: AsRef<str>>(value: &'a Value, segments: &[S]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Default text rendering: strings are emitted raw, everything else as
/// compact JSON (`null`, `true`, `12.5`, `{"a":1}`).
pub fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Render an optional value, with absence shown as `<absent>`.
pub fn render_opt(value: Option<&Value>) -> String {
    match value {
        Some(value) => render(value),
        None => "<absent>".to_string(),
    }
}

/// Serialize a response tree for logging, indented by `indent` spaces when
/// non-zero.
pub fn to_log_string(value: &Value, indent: usize) -> String {
    if indent == 0 {
        return value.to_string();
    }

    let pad = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    match serde::Serialize::serialize(value, &mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_tree_keeps_key_order() {
        let tree = parse_tree(r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#).unwrap();
        let keys: Vec<&str> = tree.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(tree.to_string(), r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#);
        assert!(parse_tree("<html>").is_err());
    }

    #[test]
    fn split_empty_path_has_no_segments() {
        assert!(split_path("").is_empty());
        assert_eq!(split_path("data.songs.0.id"), vec!["data", "songs", "0", "id"]);
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let tree = json!({"data": {"songs": [{"id": 7}, {"id": 9}]}});
        assert_eq!(lookup(&tree, &["data", "songs", "1", "id"]), Some(&json!(9)));
        assert_eq!(lookup(&tree, &["data", "songs", "2"]), None);
        assert_eq!(lookup(&tree, &["data", "songs", "x"]), None);
        assert_eq!(lookup(&tree, &["data", "missing"]), None);
    }

    #[test]
    fn lookup_with_no_segments_returns_root() {
        let tree = json!([1, 2]);
        let empty: [&str; 0] = [];
        assert_eq!(lookup(&tree, &empty), Some(&tree));
    }

    #[test]
    fn render_strings_raw_and_others_as_json() {
        assert_eq!(render(&json!("Fazerdaze")), "Fazerdaze");
        assert_eq!(render(&json!(null)), "null");
        assert_eq!(render(&json!(12)), "12");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!({"a": [1]})), r#"{"a":[1]}"#);
        assert_eq!(render_opt(None), "<absent>");
    }

    #[test]
    fn log_string_respects_indent() {
        let tree = json!({"a": 1});
        assert_eq!(to_log_string(&tree, 0), r#"{"a":1}"#);
        assert_eq!(to_log_string(&tree, 2), "{\n  \"a\": 1\n}");
    }
}
