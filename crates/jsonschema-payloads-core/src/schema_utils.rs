//! Shared schema utilities for path construction, traversal and merging.
//!
//! Provides the helpers every processor leans on:
//! 1. **JSON Pointer escaping** (RFC 6901) for property keys with `/` or `~`
//! 2. **Shared traversal** that visits ALL schema-bearing keywords consistently
//! 3. **Pure merges** of schema fragments and payload objects

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// JSON Pointer escaping (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// # Example
/// ```
/// use jsonschema_payloads_core::build_path;
/// assert_eq!(build_path("#", &["user", "a/b"]), "#/user/a~1b");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Unescape a single path segment per RFC 6901.
///
/// Order matters: unescape `~1` first to avoid double-unescaping.
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Split a JSON Pointer path into decoded segments.
///
/// # Example
/// ```
/// use jsonschema_payloads_core::split_path;
/// assert_eq!(split_path("#/definitions/a~1b"), vec!["definitions", "a/b"]);
/// assert_eq!(split_path("#"), Vec::<String>::new());
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    let stripped = path.strip_prefix('#').unwrap_or(path);

    if stripped.is_empty() {
        return Vec::new();
    }

    let mut segments_iter = stripped.split('/');

    // A leading "/" yields an initial empty segment for the root. Later empty
    // segments are significant ("#/" → [""] is the empty-string key).
    if stripped.starts_with('/') {
        segments_iter.next();
    }

    segments_iter
        .map(|s| unescape_pointer_segment(s).into_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Schema introspection
// ---------------------------------------------------------------------------

/// The `required` list of a schema object, in declaration order.
pub fn extract_required(obj: &Map<String, Value>) -> Vec<String> {
    obj.get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// The effective type name of a schema fragment.
///
/// - `type: "x"` → `x`
/// - `type: [..]` → first non-`null` entry
/// - no `type` but `enum` → `string`
/// - no `type` but `properties` → `object`
pub fn effective_type_name(schema: &Value) -> Option<String> {
    let obj = schema.as_object()?;
    match obj.get("type") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            return names
                .iter()
                .find(|t| **t != "null")
                .or(names.first())
                .map(|t| t.to_string());
        }
        _ => {}
    }
    if obj.contains_key("enum") {
        return Some("string".to_string());
    }
    if obj.contains_key("properties") {
        return Some("object".to_string());
    }
    None
}

// ---------------------------------------------------------------------------
// Shared schema traversal
// ---------------------------------------------------------------------------

/// Recursively visit all schema-bearing children of a JSON Schema object.
///
/// Calls `walk_fn` for each child schema found under any recognised keyword
/// and reinserts the returned value. Uses the extract-recurse-reinsert
/// pattern to avoid borrow conflicts.
///
/// | Category       | Keywords                                                       |
/// |----------------|----------------------------------------------------------------|
/// | Object         | `properties`, `patternProperties`, `additionalProperties`,     |
/// |                | `propertyNames`                                                |
/// | Array          | `items` (object + array), `additionalItems`, `contains`        |
/// | Composition    | `anyOf`, `oneOf`, `allOf`                                      |
/// | Conditional    | `if`, `then`, `else`, `not`                                    |
/// | Definitions    | `$defs`, `definitions`, `dependentSchemas`                     |
pub fn recurse_into_children<F, E>(
    obj: &mut Map<String, Value>,
    path: &str,
    depth: usize,
    walk_fn: &mut F,
) -> Result<(), E>
where
    F: FnMut(&Value, &str, usize) -> Result<Value, E>,
{
    for keyword in [
        "properties",
        "patternProperties",
        "$defs",
        "definitions",
        "dependentSchemas",
    ] {
        if let Some(val) = obj.remove(keyword) {
            match val {
                Value::Object(map) => {
                    let mut new_map = Map::new();
                    for (key, val) in map {
                        let child_path = build_path(path, &[keyword, &key]);
                        new_map.insert(key, walk_fn(&val, &child_path, depth + 1)?);
                    }
                    obj.insert(keyword.to_string(), Value::Object(new_map));
                }
                other => {
                    obj.insert(keyword.to_string(), other);
                }
            }
        }
    }

    for keyword in [
        "additionalProperties",
        "propertyNames",
        "contains",
        "not",
        "if",
        "then",
        "else",
        "additionalItems",
    ] {
        if let Some(val) = obj.remove(keyword) {
            if val.is_object() {
                let child_path = build_path(path, &[keyword]);
                let walked = walk_fn(&val, &child_path, depth + 1)?;
                obj.insert(keyword.to_string(), walked);
            } else {
                // `additionalProperties: false` and friends are not schemas
                obj.insert(keyword.to_string(), val);
            }
        }
    }

    for keyword in ["anyOf", "oneOf", "allOf"] {
        if let Some(val) = obj.remove(keyword) {
            match val {
                Value::Array(variants) => {
                    let mut walked = Vec::with_capacity(variants.len());
                    for (i, variant) in variants.into_iter().enumerate() {
                        let child_path = build_path(path, &[keyword, &i.to_string()]);
                        walked.push(walk_fn(&variant, &child_path, depth + 1)?);
                    }
                    obj.insert(keyword.to_string(), Value::Array(walked));
                }
                other => {
                    obj.insert(keyword.to_string(), other);
                }
            }
        }
    }

    if let Some(items) = obj.remove("items") {
        match items {
            Value::Object(_) => {
                let child_path = build_path(path, &["items"]);
                let walked = walk_fn(&items, &child_path, depth + 1)?;
                obj.insert("items".to_string(), walked);
            }
            Value::Array(arr) => {
                let mut walked = Vec::with_capacity(arr.len());
                for (i, item) in arr.into_iter().enumerate() {
                    let child_path = build_path(path, &["items", &i.to_string()]);
                    walked.push(walk_fn(&item, &child_path, depth + 1)?);
                }
                obj.insert("items".to_string(), Value::Array(walked));
            }
            other => {
                obj.insert("items".to_string(), other);
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Deep-merge `overlay` onto `base`, returning a new value.
///
/// Objects merge key by key (recursively); anything else in `overlay`
/// replaces the base value. Used both for schema fragments and payloads.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            let mut result = base_obj.clone();
            for (key, overlay_val) in overlay_obj {
                let merged = match result.get(key) {
                    Some(existing) => deep_merge(existing, overlay_val),
                    None => overlay_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Value::Object(result)
        }
        _ => overlay.clone(),
    }
}

/// Merge a composition alternative into a copy of `base` and drop `keyword`.
///
/// The alternative wins on conflicts, including its `required` list.
pub fn merge_fragment(base: &Value, alternative: &Value, keyword: &str) -> Value {
    let mut merged = deep_merge(base, alternative);
    if let Some(obj) = merged.as_object_mut() {
        obj.remove(keyword);
    }
    merged
}

/// Union `required` lists, deduplicated in first-seen order.
pub fn union_required<'a>(lists: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for list in lists {
        let Some(arr) = list.as_array() else {
            continue;
        };
        for item in arr {
            if let Some(s) = item.as_str() {
                if seen.insert(s.to_string()) {
                    result.push(item.clone());
                }
            }
        }
    }
    result
}

// ===========================================================================
// Tests
// ===========================================================================
