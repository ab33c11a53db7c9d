//! Array combiner: item candidates → array candidates.
//!
//! Primitive items are sampled pairwise: every single item, then every
//! unordered pair `(i, j)` with `i < j`. Object items are not combined, since
//! their per-property explosion already happened inside the item.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde_json::Value;

use super::Engine;
use crate::candidate::{finalize_ids, wrap_raw_values, Candidate};
use crate::error::GeneratorError;
use crate::field::Field;
use crate::schema_utils::effective_type_name;

/// The synthetic field for `items`. It shares the array's position.
fn items_field(field: &Field) -> Option<Arc<Field>> {
    field
        .schema
        .get("items")
        .filter(|items| items.is_object())
        .map(|items| Arc::new(field.with_schema(items.clone())))
}

fn has_object_items(items: &Field) -> bool {
    effective_type_name(&items.schema).as_deref() == Some("object")
}

pub(super) fn generate(
    engine: &Engine<'_>,
    field: &Arc<Field>,
) -> Result<Vec<Arc<Candidate>>, GeneratorError> {
    let Some(items) = items_field(field) else {
        return Ok(wrap_raw_values(field, vec![Value::Array(Vec::new())]));
    };

    let item_candidates = engine.process_field(&items)?;
    let limits = &engine.options().combinations.arrays;

    if let Some(generator) = &limits.combination_generator {
        let raw_items: Vec<Value> = item_candidates.iter().map(|c| c.value.clone()).collect();
        if let Some(raw) = generator(field, &raw_items) {
            return Ok(wrap_raw_values(field, raw.into_vec()));
        }
    }

    if has_object_items(&items) {
        let candidates: Vec<Arc<Candidate>> = item_candidates
            .into_iter()
            .map(|item| {
                let value = Value::Array(vec![item.value.clone()]);
                Arc::new(Candidate::new(Arc::clone(field), value, Some(item)))
            })
            .collect();
        finalize_ids(field, &candidates);
        return Ok(candidates);
    }

    let values: Vec<&Value> = item_candidates.iter().map(|c| &c.value).collect();
    let n = values.len();
    let singles = values.iter().map(|v| Value::Array(vec![(*v).clone()]));
    let pairs = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| Value::Array(vec![values[i].clone(), values[j].clone()]));

    let raw: Vec<Value> = singles
        .chain(pairs)
        .take(limits.max_combinations.map_or(usize::MAX, NonZeroUsize::get))
        .collect();

    Ok(wrap_raw_values(field, raw))
}

pub(super) fn count(engine: &Engine<'_>, field: &Arc<Field>) -> Result<u64, GeneratorError> {
    let Some(items) = items_field(field) else {
        return Ok(1);
    };

    let limits = &engine.options().combinations.arrays;
    if limits.combination_generator.is_some() {
        return Ok(generate(engine, field)?.len() as u64);
    }

    let n = engine.count_field(&items)?;
    if has_object_items(&items) {
        return Ok(n);
    }

    let pairs = n.saturating_mul(n.saturating_sub(1)) / 2;
    let total = n.saturating_add(pairs);
    Ok(match limits.max_combinations {
        Some(max) => total.min(max.get() as u64),
        None => total,
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::{field, values, with_engine};
    use crate::config::{GeneratorOptions, RawValues};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::num::NonZeroUsize;

    fn six_enum() -> Value {
        json!({ "type": "array", "items": { "type": "string", "enum": [1, 2, 3, 4, 5, 6] } })
    }

    fn render(values: &[Value]) -> String {
        values
            .iter()
            .map(|v| {
                v.as_array()
                    .unwrap()
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    fn count(options: &GeneratorOptions, schema: Value) -> u64 {
        with_engine(options, |engine| engine.count_field(&field(schema)).unwrap())
    }

    #[test]
    fn test_pairwise_law() {
        let options = GeneratorOptions::default();
        let out = values(&options, six_enum());
        assert_eq!(out.len(), 21);
        assert_eq!(
            render(&out),
            "1;2;3;4;5;6;1,2;1,3;1,4;1,5;1,6;2,3;2,4;2,5;2,6;3,4;3,5;3,6;4,5;4,6;5,6"
        );
        assert_eq!(count(&options, six_enum()), 21);
    }

    #[test]
    fn test_max_combinations_truncates() {
        let mut options = GeneratorOptions::default();
        options.combinations.arrays.max_combinations = NonZeroUsize::new(10);
        let out = values(&options, six_enum());
        assert_eq!(render(&out), "1;2;3;4;5;6;1,2;1,3;1,4;1,5");
        assert_eq!(count(&options, six_enum()), 10);
    }

    #[test]
    fn test_custom_combination_generator() {
        let options = GeneratorOptions::default().with_array_combination_generator(|_, items| {
            Some(RawValues::Many(items.iter().rev().cloned().collect()))
        });
        let out = values(&options, six_enum());
        assert_eq!(out, vec![json!(6), json!(5), json!(4), json!(3), json!(2), json!(1)]);
        assert_eq!(count(&options, six_enum()), 6);
    }

    #[test]
    fn test_object_items_are_wrapped_not_combined() {
        let schema = json!({
            "type": "array",
            "items": { "properties": { "flag": { "type": "boolean" } } }
        });
        let options = GeneratorOptions::default();
        let candidates = with_engine(&options, |engine| {
            engine.process_field(&field(schema.clone())).unwrap()
        });
        let out: Vec<Value> = candidates.iter().map(|c| c.value.clone()).collect();
        assert_eq!(out, vec![json!([{}]), json!([{ "flag": true }]), json!([{ "flag": false }])]);
        assert!(candidates.iter().all(|c| c.parent.is_some()));
        assert_eq!(count(&options, schema), 3);
    }

    #[test]
    fn test_missing_items() {
        let options = GeneratorOptions::default();
        assert_eq!(values(&options, json!({ "type": "array" })), vec![json!([])]);
        assert_eq!(count(&options, json!({ "type": "array", "items": true })), 1);
    }
}
