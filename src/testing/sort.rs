use crate::value::{render, Value};

/// Sort the array found at `path` by the rendered value of `key` in each
/// element, ascending.
///
/// Objects are followed by key; reaching an array before the path is used up
/// applies the remaining path to every element. Paths that do not resolve
/// leave `value` untouched.
pub fn sort_by_key<S: AsRef<str>>(value: &mut Value, path: &[S], key: &str) {
    match value {
        Value::Object(map) => {
            if let Some((first, rest)) = path.split_first() {
                if let Some(child) = map.get_mut(first.as_ref()) {
                    sort_by_key(child, rest, key);
                }
            }
        }
        Value::Array(items) => {
            if path.is_empty() {
                items.sort_by_cached_key(|item| sort_key(item, key));
            } else {
                for item in items.iter_mut() {
                    sort_by_key(item, path, key);
                }
            }
        }
        _ => {}
    }
}

fn sort_key(item: &Value, key: &str) -> String {
    match item {
        Value::Object(map) => match map.get(key) {
            Some(Value::Null) | None => String::new(),
            Some(value) => render(value),
        },
        _ => String::new(),
    }
}
