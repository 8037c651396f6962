//! Path-based access into configuration trees.

use serde_json::{Map, Value};

/// Looks up a nested value by key path.
pub(crate) fn get_in<'a, S: AsRef<str>>(tree: &'a Map<String, Value>, path: &[S]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = tree.get(first.as_ref())?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(map) => get_in(map, rest),
        _ => None,
    }
}

/// Looks up a nested object by key path.
pub(crate) fn get_object<'a, S: AsRef<str>>(
    tree: &'a Map<String, Value>,
    path: &[S],
) -> Option<&'a Map<String, Value>> {
    match get_in(tree, path) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Sets a nested value by key path, creating intermediate objects.
/// Intermediate non-object values are replaced.
pub(crate) fn set_in<S: AsRef<str>>(tree: &mut Map<String, Value>, path: &[S], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        tree.insert(first.as_ref().to_string(), value);
        return;
    }
    let entry = tree
        .entry(first.as_ref().to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(map) = entry {
        set_in(map, rest, value);
    }
}
