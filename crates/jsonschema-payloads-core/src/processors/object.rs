//! Object flattener: per-property candidate lists → object candidates.
//!
//! Two folds:
//! 1. **Minimal payloads** fold the `required` properties as a cartesian
//!    product, starting from one empty object.
//! 2. **Optional layering** folds every other property onto the existing
//!    candidates, keeping the un-extended ones. Each optional property grows
//!    the set by a factor of `count + 1`.
//!
//! `max_object_payload_combinations` is checked before every push, so no
//! intermediate list ever exceeds it.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::Engine;
use crate::candidate::{finalize_ids, Candidate};
use crate::config::{ObjectCombinations, PropertyCandidates};
use crate::error::GeneratorError;
use crate::field::Field;
use crate::schema_utils::{deep_merge, extract_required};

/// Hard ceiling on the candidates of one object field.
fn object_cap(limits: &ObjectCombinations) -> usize {
    limits
        .max_object_payload_combinations
        .map_or(usize::MAX, NonZeroUsize::get)
}

fn required_keys(field: &Field) -> Vec<String> {
    field.schema.as_object().map(extract_required).unwrap_or_default()
}

/// Declared properties as `(key, property field)`, in declaration order.
fn property_fields(engine: &Engine<'_>, field: &Arc<Field>) -> Vec<(String, Arc<Field>)> {
    let Some(properties) = field.schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .map(|(key, schema)| {
            let transformed = engine.options().key_transform.apply(key);
            let property = Field::property(field, key, transformed, schema.clone());
            (key.clone(), Arc::new(property))
        })
        .collect()
}

/// `base` with `key` set to `value`, merged the way payloads are merged.
fn with_property(base: &Value, key: &str, value: &Value) -> Value {
    let mut overlay = Map::new();
    overlay.insert(key.to_string(), value.clone());
    deep_merge(base, &Value::Object(overlay))
}

pub(super) fn generate(
    engine: &Engine<'_>,
    field: &Arc<Field>,
) -> Result<Vec<Arc<Candidate>>, GeneratorError> {
    let limits = &engine.options().combinations.objects;
    let max_per_property = limits
        .max_properties_combinations
        .map_or(usize::MAX, NonZeroUsize::get);

    let mut properties = Vec::new();
    for (key, property) in property_fields(engine, field) {
        let mut candidates = engine.process_field(&property)?;
        candidates.truncate(max_per_property);
        properties.push(PropertyCandidates {
            key,
            field: property,
            candidates,
        });
    }

    let required = required_keys(field);
    let minimal = minimal_payloads(limits, field, &properties, &required);
    let payloads = optional_payloads(limits, field, &properties, &required, minimal);

    finalize_ids(field, &payloads);

    debug!(path = %field.full_path, count = payloads.len(), "flattened object field");
    engine.reporter().report(format_args!(
        "Generated {} values for object path {}",
        payloads.len(),
        field.full_path
    ));

    Ok(payloads)
}

fn minimal_payloads(
    limits: &ObjectCombinations,
    field: &Arc<Field>,
    properties: &[PropertyCandidates],
    required: &[String],
) -> Vec<Arc<Candidate>> {
    let cap = object_cap(limits);

    if let Some(generator) = &limits.minimal_payload_combination_generator {
        let required_properties: Vec<PropertyCandidates> = required
            .iter()
            .filter_map(|key| properties.iter().find(|p| &p.key == key).cloned())
            .collect();
        if let Some(raw) = generator(field, &required_properties) {
            return raw
                .into_vec()
                .into_iter()
                .take(cap)
                .map(|value| Arc::new(Candidate::new(Arc::clone(field), value, None)))
                .collect();
        }
    }

    let empty = Candidate::new(Arc::clone(field), Value::Object(Map::new()), None);
    let mut payloads = vec![Arc::new(empty)];

    for key in required {
        let Some(property) = properties.iter().find(|p| &p.key == key) else {
            continue;
        };
        if property.candidates.is_empty() {
            continue;
        }

        let payload_key = property.field.payload_key();
        let mut result = Vec::new();
        'fold: for candidate in &property.candidates {
            for existing in &payloads {
                if result.len() >= cap {
                    break 'fold;
                }
                let value = with_property(&existing.value, payload_key, &candidate.value);
                // Lineage follows the property value that drove this branch.
                result.push(Arc::new(Candidate::new(
                    Arc::clone(field),
                    value,
                    Some(Arc::clone(candidate)),
                )));
            }
        }
        payloads = result;
    }

    payloads
}

fn optional_payloads(
    limits: &ObjectCombinations,
    field: &Arc<Field>,
    properties: &[PropertyCandidates],
    required: &[String],
    minimal: Vec<Arc<Candidate>>,
) -> Vec<Arc<Candidate>> {
    let cap = object_cap(limits);
    let optional: Vec<&PropertyCandidates> = properties
        .iter()
        .filter(|p| !required.contains(&p.key))
        .collect();

    if let Some(generator) = &limits.optional_payload_combinations_generator {
        let optional_owned: Vec<PropertyCandidates> = optional.iter().map(|p| (*p).clone()).collect();
        if let Some(raw) = generator(field, &minimal, &optional_owned) {
            let mut payloads = minimal;
            for partial in raw.into_vec() {
                payloads = layer(field, payloads, std::slice::from_ref(&partial), cap);
            }
            return payloads;
        }
    }

    let mut payloads = minimal;
    for property in optional {
        let payload_key = property.field.payload_key();
        let overlays: Vec<Value> = property
            .candidates
            .iter()
            .map(|candidate| with_property(&Value::Object(Map::new()), payload_key, &candidate.value))
            .collect();
        payloads = layer(field, payloads, &overlays, cap);
    }
    payloads
}

/// Keep `existing`, then append every `overlay` merged onto every existing
/// candidate (overlay-major order), stopping at `cap`.
fn layer(
    field: &Arc<Field>,
    existing: Vec<Arc<Candidate>>,
    overlays: &[Value],
    cap: usize,
) -> Vec<Arc<Candidate>> {
    let mut result = existing.clone();
    'fold: for overlay in overlays {
        for base in &existing {
            if result.len() >= cap {
                break 'fold;
            }
            let value = deep_merge(&base.value, overlay);
            result.push(Arc::new(Candidate::new(
                Arc::clone(field),
                value,
                Some(Arc::clone(base)),
            )));
        }
    }
    result
}

pub(super) fn count(engine: &Engine<'_>, field: &Arc<Field>) -> Result<u64, GeneratorError> {
    let limits = &engine.options().combinations.objects;
    if limits.has_custom_generator() {
        return Ok(generate(engine, field)?.len() as u64);
    }

    let cap = limits
        .max_object_payload_combinations
        .map_or(u64::MAX, |c| c.get() as u64);
    let max_per_property = limits
        .max_properties_combinations
        .map_or(u64::MAX, |c| c.get() as u64);

    let mut counts = Vec::new();
    for (key, property) in property_fields(engine, field) {
        let count = engine.count_field(&property)?.min(max_per_property);
        counts.push((key, count));
    }

    let required = required_keys(field);
    let mut total: u64 = 1;
    for key in &required {
        match counts.iter().find(|(k, _)| k == key) {
            Some(&(_, n)) if n > 0 => total = total.saturating_mul(n).min(cap),
            _ => {}
        }
    }
    for (_, n) in counts.iter().filter(|(k, _)| !required.contains(k)) {
        total = total.saturating_mul(n.saturating_add(1)).min(cap);
    }

    debug!(path = %field.full_path, count = total, "counted object field");
    engine.reporter().report(format_args!(
        "Counted {} values for object path {}",
        total, field.full_path
    ));

    Ok(total)
}
