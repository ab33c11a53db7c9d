//! Primitive value handlers: boolean, integer/number and string/enum.

use std::sync::Arc;

use rand::Rng;
use serde_json::{json, Value};
use tracing::warn;

use super::Engine;
use crate::candidate::{wrap_raw_values, Candidate};
use crate::field::Field;

const DEFAULT_MINIMUM: f64 = 1.0;
const DEFAULT_MAXIMUM: f64 = 100.0;

pub(super) fn generate_boolean(field: &Arc<Field>) -> Vec<Arc<Candidate>> {
    wrap_raw_values(field, vec![json!(true), json!(false)])
}

/// `[min, max, sample]` with `sample` drawn uniformly from `[min, max]`.
pub(super) fn generate_numeric(
    engine: &Engine<'_>,
    field: &Arc<Field>,
    integer: bool,
) -> Vec<Arc<Candidate>> {
    let (min, max) = numeric_bounds(&field.schema);

    let raw = if integer || (min.fract() == 0.0 && max.fract() == 0.0) {
        let (lo, hi) = (min.ceil() as i64, max.floor() as i64);
        let sample = if lo <= hi {
            engine.with_rng(|rng| rng.gen_range(lo..=hi))
        } else {
            lo
        };
        vec![json!(lo), json!(hi), json!(sample)]
    } else {
        // rand rejects float ranges whose width overflows.
        let sample = if min < max && (max - min).is_finite() {
            engine.with_rng(|rng| rng.gen_range(min..=max))
        } else {
            min
        };
        vec![Value::from(min), Value::from(max), Value::from(sample)]
    };

    wrap_raw_values(field, raw)
}

/// Resolve `(min, max)` from `minimum`/`maximum` and either style of
/// `exclusiveMinimum`/`exclusiveMaximum`.
fn numeric_bounds(schema: &Value) -> (f64, f64) {
    let minimum = schema.get("minimum").and_then(Value::as_f64);
    let maximum = schema.get("maximum").and_then(Value::as_f64);

    let min = match schema.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => minimum.unwrap_or(DEFAULT_MINIMUM) + 1.0,
        Some(Value::Number(n)) => {
            let bound = n.as_f64().unwrap_or(DEFAULT_MINIMUM) + 1.0;
            minimum.map_or(bound, |m| m.max(bound))
        }
        _ => minimum.unwrap_or(DEFAULT_MINIMUM),
    };
    let max = match schema.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => maximum.unwrap_or(DEFAULT_MAXIMUM) - 1.0,
        Some(Value::Number(n)) => {
            let bound = n.as_f64().unwrap_or(DEFAULT_MAXIMUM) - 1.0;
            maximum.map_or(bound, |m| m.min(bound))
        }
        _ => maximum.unwrap_or(DEFAULT_MAXIMUM),
    };

    (min, max)
}

/// A non-array `enum` is a one-element enum.
fn enum_values(schema: &Value) -> Option<Vec<Value>> {
    match schema.get("enum")? {
        Value::Array(values) => Some(values.clone()),
        single => Some(vec![single.clone()]),
    }
}

pub(super) fn generate_string(engine: &Engine<'_>, field: &Arc<Field>) -> Vec<Arc<Candidate>> {
    if let Some(values) = enum_values(&field.schema) {
        return wrap_raw_values(field, values);
    }

    let fabricated = engine.with_rng(|rng| engine.fabricator().fabricate(&field.schema, rng));
    let value = match fabricated {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %field.full_path, error = %err, "string fabrication failed, using placeholder");
            engine.reporter().report(format_args!(
                "Warn - value fabrication failed for field {}: {}",
                field.full_path, err
            ));
            format!("Value for {}", field.full_path)
        }
    };

    wrap_raw_values(field, vec![Value::String(value)])
}

pub(super) fn count_string(field: &Field) -> u64 {
    enum_values(&field.schema).map_or(1, |values| values.len() as u64)
}
