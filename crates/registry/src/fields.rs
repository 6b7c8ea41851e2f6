//! Lenient extraction of header fields.
//!
//! Headers are hand-written, so every accessor tolerates both hyphenated
//! and underscored key spellings and coerces near-miss shapes (a
//! comma-separated string where a list is expected, a quoted number)
//! rather than failing.

use {
    serde_yaml::{Mapping, Value},
    std::collections::BTreeMap,
};

/// First value present under any of the candidate keys.
pub fn lookup<'a>(map: &'a Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Remove every candidate key, returning the first value that was present.
pub fn take(map: &mut Mapping, keys: &[&str]) -> Option<Value> {
    let mut first = None;
    for key in keys {
        let removed = map.remove(*key);
        if first.is_none() {
            first = removed;
        }
    }
    first
}

/// String-valued field; bare numbers and booleans are rendered, not
/// rejected.
pub fn string_at(map: &Mapping, keys: &[&str]) -> Option<String> {
    lookup(map, keys).and_then(scalar_string)
}

/// Boolean-valued field; accepts quoted `"true"`/`"false"` as well.
pub fn bool_at(map: &Mapping, keys: &[&str]) -> Option<bool> {
    match lookup(map, keys)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric field; accepts quoted numbers as well.
pub fn f64_at(map: &Mapping, keys: &[&str]) -> Option<f64> {
    match lookup(map, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize a tolerant list: a YAML list passes through, a single string
/// splits on commas with segments trimmed and empties dropped, anything
/// else is absent.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// List-valued field run through [`string_list`].
pub fn string_list_at(map: &Mapping, keys: &[&str]) -> Option<Vec<String>> {
    lookup(map, keys).and_then(string_list)
}

/// Mapping of provider id to the tool names it exposes. Each value gets
/// the same shape tolerance as [`string_list`]; entries of the wrong shape
/// are dropped.
pub fn tool_map_at(map: &Mapping, keys: &[&str]) -> Option<BTreeMap<String, Vec<String>>> {
    let Value::Mapping(entries) = lookup(map, keys)? else {
        return None;
    };
    let mut out = BTreeMap::new();
    for (key, value) in entries {
        let Some(provider) = scalar_string(key) else {
            continue;
        };
        let Some(tools) = string_list(value) else {
            continue;
        };
        out.insert(provider, tools);
    }
    Some(out)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
