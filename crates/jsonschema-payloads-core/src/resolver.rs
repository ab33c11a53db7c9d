//! `$ref` dereferencing.
//!
//! Payload enumeration needs a fully inlined schema. [`SchemaResolver`] is the
//! seam for plugging in a different dereferencer; [`LocalRefResolver`] is the
//! default and only understands root-relative JSON Pointers.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::schema_utils::{deep_merge, recurse_into_children, split_path};

/// Turns a schema that may contain `$ref` into a fully dereferenced one.
pub trait SchemaResolver: Send + Sync {
    fn dereference(&self, schema: &Value) -> Result<Value, ResolveError>;
}

/// Sibling keywords of a `$ref` that override the target's value instead of
/// being merged into it structurally.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "description",
    "title",
    "$comment",
    "examples",
    "default",
    "deprecated",
    "readOnly",
    "writeOnly",
];

/// Inlines `#`, `#/definitions/..` and `#/$defs/..` style references.
///
/// Remote documents, `$anchor` fragments and recursive references are
/// rejected: a recursive schema has no finite set of payloads.
#[derive(Debug, Clone)]
pub struct LocalRefResolver {
    max_depth: usize,
}

impl LocalRefResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for LocalRefResolver {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SchemaResolver for LocalRefResolver {
    fn dereference(&self, schema: &Value) -> Result<Value, ResolveError> {
        let mut ctx = RefContext {
            root: schema,
            max_depth: self.max_depth,
            visiting: HashSet::new(),
        };
        resolve_refs(schema, "#", 0, &mut ctx)
    }
}

struct RefContext<'a> {
    root: &'a Value,
    max_depth: usize,
    /// Pointers currently being expanded on the DFS stack.
    visiting: HashSet<String>,
}

fn resolve_refs(
    node: &Value,
    path: &str,
    depth: usize,
    ctx: &mut RefContext<'_>,
) -> Result<Value, ResolveError> {
    if depth > ctx.max_depth {
        return Err(ResolveError::RecursionDepthExceeded {
            path: path.to_string(),
            max_depth: ctx.max_depth,
        });
    }

    let Some(obj) = node.as_object() else {
        return Ok(node.clone());
    };

    if let Some(ref_val) = obj.get("$ref").and_then(Value::as_str) {
        return resolve_single_ref(obj, ref_val, path, depth, ctx);
    }

    let mut result = obj.clone();
    recurse_into_children(&mut result, path, depth, &mut |child: &Value,
                                                           child_path: &str,
                                                           child_depth: usize| {
        resolve_refs(child, child_path, child_depth, ctx)
    })?;

    Ok(Value::Object(result))
}

fn resolve_single_ref(
    obj: &Map<String, Value>,
    ref_str: &str,
    path: &str,
    depth: usize,
    ctx: &mut RefContext<'_>,
) -> Result<Value, ResolveError> {
    if ref_str != "#" && !ref_str.starts_with("#/") {
        // Either a remote document or an `$anchor` fragment.
        return Err(ResolveError::UnsupportedRef {
            path: path.to_string(),
            reference: ref_str.to_string(),
        });
    }

    if ctx.visiting.contains(ref_str) {
        return Err(ResolveError::CircularRef {
            path: path.to_string(),
            reference: ref_str.to_string(),
        });
    }

    let target = resolve_pointer(ctx.root, ref_str).ok_or_else(|| ResolveError::UnresolvableRef {
        path: path.to_string(),
        reference: ref_str.to_string(),
    })?;

    ctx.visiting.insert(ref_str.to_string());
    let resolved = resolve_refs(target, path, depth + 1, ctx);
    ctx.visiting.remove(ref_str);
    let resolved = resolved?;

    let mut annotations = Map::new();
    let mut structural = Map::new();
    for (k, v) in obj.iter().filter(|(k, _)| k.as_str() != "$ref") {
        if ANNOTATION_KEYWORDS.contains(&k.as_str()) {
            annotations.insert(k.clone(), v.clone());
        } else {
            structural.insert(k.clone(), v.clone());
        }
    }

    if annotations.is_empty() && structural.is_empty() {
        return Ok(resolved);
    }

    // Structural siblings may carry refs of their own.
    let mut structural_resolved = structural;
    recurse_into_children(
        &mut structural_resolved,
        path,
        depth,
        &mut |child: &Value, child_path: &str, child_depth: usize| {
            resolve_refs(child, child_path, child_depth, ctx)
        },
    )?;

    let mut merged = deep_merge(&resolved, &Value::Object(structural_resolved));
    if let Some(merged_obj) = merged.as_object_mut() {
        for (k, v) in annotations {
            merged_obj.insert(k, v);
        }
    }

    Ok(merged)
}

/// Resolve a JSON Pointer (`#/definitions/Thing`) against the root document.
fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in split_path(pointer) {
        current = match current {
            Value::Object(obj) => obj.get(&segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
