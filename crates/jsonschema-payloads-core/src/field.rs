//! Field descriptors: a schema fragment positioned in the schema tree.

use std::sync::Arc;

use serde_json::Value;

use crate::schema_utils::{build_path, extract_required};

/// One schema fragment as positioned in the tree currently being processed.
///
/// `parent` points at the enclosing *object* field. Synthetic wrappers
/// (array items, expanded composition alternatives) inherit their wrapper's
/// parent instead of pointing at the wrapper itself.
#[derive(Debug, Clone)]
pub struct Field {
    /// The schema fragment for this field.
    pub schema: Value,
    /// The enclosing object field, if any.
    pub parent: Option<Arc<Field>>,
    /// Property name in the parent's `properties`.
    pub key_in_parent: Option<String>,
    /// Property name after the configured key transform.
    pub transformed_key: Option<String>,
    /// JSON Pointer style path from the schema root (e.g. `#/user/name`).
    pub full_path: String,
}

impl Field {
    /// A master field rooted at `full_path`.
    pub fn root(schema: Value, full_path: impl Into<String>) -> Self {
        Self {
            schema,
            parent: None,
            key_in_parent: None,
            transformed_key: None,
            full_path: full_path.into(),
        }
    }

    /// A property field nested under `parent`. The path gains one escaped segment.
    pub fn property(parent: &Arc<Field>, key: &str, transformed_key: String, schema: Value) -> Self {
        Self {
            schema,
            parent: Some(Arc::clone(parent)),
            key_in_parent: Some(key.to_string()),
            transformed_key: Some(transformed_key),
            full_path: build_path(&parent.full_path, &[key]),
        }
    }

    /// A synthetic field standing in for `self` with a different schema
    /// (array items, merged composition alternatives). Position metadata is shared.
    pub fn with_schema(&self, schema: Value) -> Self {
        Self {
            schema,
            parent: self.parent.clone(),
            key_in_parent: self.key_in_parent.clone(),
            transformed_key: self.transformed_key.clone(),
            full_path: self.full_path.clone(),
        }
    }

    /// The key to use when this field's value is placed into an object payload.
    pub fn payload_key(&self) -> &str {
        self.transformed_key
            .as_deref()
            .or(self.key_in_parent.as_deref())
            .unwrap_or_default()
    }

    /// Whether this field's key is listed in the parent's `required`.
    pub fn is_required_in_parent(&self) -> bool {
        match (&self.parent, &self.key_in_parent) {
            (Some(parent), Some(key)) => parent
                .schema
                .as_object()
                .map(|obj| extract_required(obj).iter().any(|r| r == key))
                .unwrap_or(false),
            _ => false,
        }
    }
}
