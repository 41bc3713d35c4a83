//! Dot-notation projection of translation trees.

use serde_json::{
    Map,
    Value,
};

use crate::Translations;

/// Joins nested keys in the flat projection.
pub const KEY_SEPARATOR: char = '.';

/// A key containing this sequence is a sentence, not a path, and is never split.
pub const ATOMIC_KEY_MARKER: &str = ". ";

/// Flatten a nested translation tree into dot-separated keys.
///
/// Every leaf becomes one entry whose key is the path from the root. Array
/// items use their index as path segment; empty maps produce no entry.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use chained_translator::keys::flatten;
///
/// let tree = json!({
///     "auth": {
///         "failed": "Wrong password",
///         "throttle": "Slow down"
///     }
/// });
///
/// let flattened = flatten(tree.as_object().unwrap());
/// assert_eq!(flattened["auth.failed"], "Wrong password");
/// assert_eq!(flattened["auth.throttle"], "Slow down");
/// ```
#[must_use]
pub fn flatten(translations: &Translations) -> Translations {
    let mut result = Map::new();
    for (key, value) in translations {
        flatten_value(value, key, &mut result);
    }
    result
}

fn flatten_value(value: &Value, prefix: &str, result: &mut Translations) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_value(child, &format!("{prefix}{KEY_SEPARATOR}{key}"), result);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_value(child, &format!("{prefix}{KEY_SEPARATOR}{index}"), result);
            }
        }
        leaf => {
            result.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Expand dot-separated keys into a nested tree.
///
/// Keys containing [`ATOMIC_KEY_MARKER`] are kept as they are. When a path
/// runs through a value that is not a map, that value is replaced by a map.
#[must_use]
pub fn unflatten(translations: &Translations) -> Translations {
    let mut result = Map::new();
    for (key, value) in translations {
        if key.contains(ATOMIC_KEY_MARKER) {
            result.insert(key.clone(), value.clone());
        } else {
            set_dotted(&mut result, key, value.clone());
        }
    }
    result
}

fn set_dotted(target: &mut Translations, key: &str, value: Value) {
    let Some((head, rest)) = key.split_once(KEY_SEPARATOR) else {
        target.insert(key.to_string(), value);
        return;
    };

    let entry = target.entry(head).or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        set_dotted(child, rest, value);
    }
}

/// Deep merge where `overlay` wins.
///
/// Nested maps present on both sides are merged recursively. Lists are
/// merged by index: overlay items replace the base items at the same
/// position, and base items past the end of the overlay are kept. Any other
/// overlay value replaces the base value.
#[must_use]
pub fn replace_recursive(mut base: Translations, overlay: Translations) -> Translations {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => replace_value(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn replace_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(existing), Value::Object(incoming)) => {
            let merged = replace_recursive(std::mem::take(existing), incoming);
            *existing = merged;
        }
        (Value::Array(existing), Value::Array(incoming)) => {
            for (index, item) in incoming.into_iter().enumerate() {
                match existing.get_mut(index) {
                    Some(slot) => replace_value(slot, item),
                    None => existing.push(item),
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
