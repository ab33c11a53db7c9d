//! Composition resolver: expands `oneOf`, `allOf` and `anyOf` into plain
//! schemas and runs them back through the full processor chain.
//!
//! Only one keyword is honoured per field (`oneOf` > `allOf` > `anyOf`). Any
//! other keyword survives in the merged schema and is expanded when the
//! merged field is processed.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::Engine;
use crate::candidate::{rewrap_candidates, wrap_raw_values, Candidate};
use crate::error::GeneratorError;
use crate::field::Field;
use crate::schema_utils::{deep_merge, extract_required, merge_fragment, union_required};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Composition {
    OneOf,
    AllOf,
    AnyOf,
}

impl Composition {
    /// The keyword to honour for `schema`, if any.
    fn detect(schema: &Value) -> Option<Self> {
        [Composition::OneOf, Composition::AllOf, Composition::AnyOf]
            .into_iter()
            .find(|c| schema.get(c.keyword()).is_some_and(Value::is_array))
    }

    /// The keyword to expand for `schema`, whose effective type is
    /// `type_name`. Only objects and fields without an explicit `type` are
    /// expanded; other typed fields go straight to their type handler.
    pub(super) fn applicable(schema: &Value, type_name: Option<&str>) -> Option<Self> {
        let untyped = schema.get("type").is_none();
        if untyped || type_name == Some("object") {
            Self::detect(schema)
        } else {
            None
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Composition::OneOf => "oneOf",
            Composition::AllOf => "allOf",
            Composition::AnyOf => "anyOf",
        }
    }
}

fn alternatives<'a>(field: &'a Field, composition: Composition) -> &'a [Value] {
    field
        .schema
        .get(composition.keyword())
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// One field per alternative, each merged into a copy of the field's schema.
fn expand(field: &Field, composition: Composition) -> Vec<Arc<Field>> {
    alternatives(field, composition)
        .iter()
        .map(|alternative| {
            let merged = merge_fragment(&field.schema, alternative, composition.keyword());
            Arc::new(field.with_schema(merged))
        })
        .collect()
}

/// All alternatives folded into one schema; `required` is the union of the
/// field's own list and every alternative's, first-seen order.
fn combine_all_of(field: &Field) -> Arc<Field> {
    let alternatives = alternatives(field, Composition::AllOf);
    let mut combined = alternatives
        .iter()
        .fold(field.schema.clone(), |acc, alternative| deep_merge(&acc, alternative));

    let empty = Value::Array(Vec::new());
    let lists = std::iter::once(field.schema.get("required").unwrap_or(&empty))
        .chain(alternatives.iter().map(|a| a.get("required").unwrap_or(&empty)));
    let required = union_required(lists);

    if let Some(obj) = combined.as_object_mut() {
        obj.remove("allOf");
        if required.is_empty() {
            obj.remove("required");
        } else {
            obj.insert("required".to_string(), Value::Array(required));
        }
    }

    Arc::new(field.with_schema(combined))
}

/// Whether an `anyOf` alternative qualifies for the synthetic empty possibility.
fn declares_required(field: &Field) -> bool {
    field
        .schema
        .as_object()
        .is_some_and(|obj| !extract_required(obj).is_empty())
}

pub(super) fn generate(
    engine: &Engine<'_>,
    field: &Arc<Field>,
    composition: Composition,
) -> Result<Vec<Arc<Candidate>>, GeneratorError> {
    debug!(path = %field.full_path, keyword = composition.keyword(), "expanding composition");

    match composition {
        Composition::OneOf => {
            let mut candidates = Vec::new();
            for alternative in expand(field, composition) {
                candidates.extend(engine.process_field(&alternative)?);
            }
            Ok(rewrap_candidates(field, candidates))
        }
        Composition::AllOf => {
            let combined = combine_all_of(field);
            Ok(rewrap_candidates(field, engine.process_field(&combined)?))
        }
        Composition::AnyOf => {
            let mut added_empty = false;
            let mut products = vec![Value::Object(Map::new())];

            for alternative in expand(field, composition) {
                let mut values: Vec<Value> = engine
                    .process_field(&alternative)?
                    .iter()
                    .map(|c| c.value.clone())
                    .collect();
                if !added_empty && declares_required(&alternative) {
                    // Only the first qualifying alternative gets one.
                    added_empty = true;
                    values.push(Value::Object(Map::new()));
                }

                products = products
                    .iter()
                    .flat_map(|acc| values.iter().map(move |value| deep_merge(acc, value)))
                    .collect();
            }

            Ok(wrap_raw_values(field, products))
        }
    }
}

pub(super) fn count(
    engine: &Engine<'_>,
    field: &Arc<Field>,
    composition: Composition,
) -> Result<u64, GeneratorError> {
    match composition {
        Composition::OneOf => {
            let mut total: u64 = 0;
            for alternative in expand(field, composition) {
                total = total.saturating_add(engine.count_field(&alternative)?);
            }
            Ok(total)
        }
        Composition::AllOf => engine.count_field(&combine_all_of(field)),
        Composition::AnyOf => {
            let mut added_empty = false;
            let mut total: u64 = 1;
            for alternative in expand(field, composition) {
                let mut count = engine.count_field(&alternative)?;
                if !added_empty && declares_required(&alternative) {
                    added_empty = true;
                    count = count.saturating_add(1);
                }
                total = total.saturating_mul(count);
            }
            Ok(total)
        }
    }
}
