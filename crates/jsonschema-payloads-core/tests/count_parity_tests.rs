//! `count()` must equal `generate().len()` for every schema shape.

use std::num::NonZeroUsize;
use std::path::Path;

use jsonschema_payloads_core::{GeneratorOptions, PayloadGenerator, RawValues};
use serde_json::{json, Value};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/schemas");

fn assert_parity(options: GeneratorOptions, schema: Value, expected: u64) {
    let mut generator = PayloadGenerator::new(options);
    generator.load(schema.clone()).expect("schema should load");

    let generated = generator.generate(None).expect("generate should succeed");
    let counted = generator.count(None).expect("count should succeed");

    assert_eq!(
        counted,
        generated.len() as u64,
        "count/generate mismatch for {schema}"
    );
    assert_eq!(counted, expected, "unexpected count for {schema}");
}

fn shapes() -> Vec<(&'static str, Value, u64)> {
    vec![
        ("boolean", json!({ "type": "boolean" }), 2),
        ("integer", json!({ "type": "integer" }), 3),
        ("number", json!({ "type": "number", "minimum": 0.25 }), 3),
        ("string", json!({ "type": "string" }), 1),
        ("enum", json!({ "type": "string", "enum": [1, 2, 3] }), 3),
        ("typeless enum", json!({ "type": "object", "required": ["e"], "properties": { "e": { "enum": ["x", "y"] } } }), 2),
        ("type array", json!({ "type": ["null", "boolean"] }), 2),
        ("empty array", json!({ "type": "array" }), 1),
        (
            "array of 4",
            json!({ "type": "array", "items": { "type": "string", "enum": ["a", "b", "c", "d"] } }),
            10,
        ),
        (
            "array of arrays",
            json!({ "type": "array", "items": { "type": "array", "items": { "type": "boolean" } } }),
            6,
        ),
        (
            "array of objects",
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id"],
                    "properties": { "id": { "type": "integer" }, "on": { "type": "boolean" } }
                }
            }),
            9,
        ),
        (
            "nested objects",
            json!({
                "type": "object",
                "required": ["inner"],
                "properties": {
                    "inner": {
                        "type": "object",
                        "properties": { "x": { "type": "boolean" }, "y": { "type": "boolean" } }
                    },
                    "z": { "type": "string", "enum": ["z"] }
                }
            }),
            18,
        ),
        (
            "required empty array items",
            json!({
                "type": "object",
                "required": ["none", "flag"],
                "properties": {
                    "none": { "type": "array", "items": { "enum": [] } },
                    "flag": { "type": "boolean" }
                }
            }),
            2,
        ),
        (
            "oneOf",
            json!({
                "type": "object",
                "properties": { "base": { "type": "boolean" } },
                "oneOf": [
                    { "required": ["a"], "properties": { "a": { "type": "boolean" } } },
                    { "properties": { "b": { "type": "integer" } } }
                ]
            }),
            6 + 12,
        ),
        (
            "allOf",
            json!({
                "type": "object",
                "required": ["a"],
                "allOf": [
                    { "properties": { "a": { "type": "boolean" } } },
                    { "required": ["b"], "properties": { "b": { "type": "boolean" } } },
                    { "properties": { "c": { "type": "integer" } } }
                ]
            }),
            16,
        ),
        (
            "anyOf",
            json!({
                "type": "object",
                "anyOf": [
                    { "properties": { "a": { "type": "boolean" } } },
                    { "required": ["b"], "properties": { "b": { "type": "boolean" } } },
                    { "required": ["c"], "properties": { "c": { "type": "boolean" } } }
                ]
            }),
            3 * 3 * 2,
        ),
        (
            "nested composition",
            json!({
                "type": "object",
                "oneOf": [
                    {
                        "anyOf": [
                            { "required": ["a"], "properties": { "a": { "type": "boolean" } } }
                        ]
                    },
                    { "allOf": [{ "required": ["b"], "properties": { "b": { "type": "boolean" } } }] }
                ]
            }),
            3 + 2,
        ),
        (
            "composition without type",
            json!({
                "type": "object",
                "required": ["v"],
                "properties": { "v": { "oneOf": [{ "type": "boolean" }, { "type": "integer" }] } }
            }),
            5,
        ),
        (
            "string ignores anyOf",
            json!({ "type": "string", "anyOf": [{ "enum": ["a", "b"] }, { "enum": ["c"] }] }),
            1,
        ),
        (
            "array ignores oneOf",
            json!({
                "type": "array",
                "items": { "type": "boolean" },
                "oneOf": [{ "maxItems": 1 }, { "minItems": 1 }]
            }),
            3,
        ),
        (
            "refs",
            json!({
                "type": "object",
                "required": ["a", "b"],
                "properties": {
                    "a": { "$ref": "#/definitions/flag" },
                    "b": { "$ref": "#/definitions/flag" }
                },
                "definitions": { "flag": { "type": "boolean" } }
            }),
            4,
        ),
    ]
}

#[test]
fn test_parity_default_options() {
    for (name, schema, expected) in shapes() {
        let mut generator = PayloadGenerator::new(GeneratorOptions::default());
        generator.load(schema.clone()).unwrap();
        let generated = generator.generate(None).unwrap().len() as u64;
        let counted = generator.count(None).unwrap();
        assert_eq!(counted, generated, "{name}: count/generate mismatch");
        assert_eq!(counted, expected, "{name}: unexpected count");
    }
}

#[test]
fn test_parity_with_caps() {
    let mut options = GeneratorOptions::default();
    options.combinations.arrays.max_combinations = NonZeroUsize::new(3);
    options.combinations.objects.max_properties_combinations = NonZeroUsize::new(2);
    options.combinations.objects.max_object_payload_combinations = NonZeroUsize::new(5);

    for (name, schema, _) in shapes() {
        let mut generator = PayloadGenerator::new(options.clone());
        generator.load(schema).unwrap();
        let generated = generator.generate(None).unwrap().len() as u64;
        let counted = generator.count(None).unwrap();
        assert_eq!(counted, generated, "{name}: count/generate mismatch with caps");
    }
}

#[test]
fn test_parity_with_hooks() {
    let options = GeneratorOptions::default()
        .with_array_combination_generator(|_, items| {
            Some(RawValues::Many(vec![Value::Array(items.to_vec())]))
        })
        .with_minimal_payload_generator(|_, required| {
            (!required.is_empty()).then(|| RawValues::One(json!({ "minimal": true })))
        })
        .with_optional_payload_generator(|_, _, optional| {
            Some(RawValues::Many(optional.iter().map(|p| json!({ p.key.clone(): 0 })).collect()))
        })
        .with_type_processor("integer", |_| RawValues::Many(vec![json!(0), json!(1)]));

    for (name, schema, _) in shapes() {
        let mut generator = PayloadGenerator::new(options.clone());
        generator.load(schema).unwrap();
        let generated = generator.generate(None).unwrap().len() as u64;
        let counted = generator.count(None).unwrap();
        assert_eq!(counted, generated, "{name}: count/generate mismatch with hooks");
    }
}

#[test]
fn test_parity_required_optional_law() {
    assert_parity(
        GeneratorOptions::default(),
        json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": { "type": "boolean" },
                "b": { "type": "integer" },
                "c": { "type": "string" }
            }
        }),
        16,
    );
}

#[test]
fn test_parity_fixtures() {
    let cases = [("person.json", None, 560), ("pets.json", Some("pet"), 10), ("pets.json", Some("owner"), 30), ("wide.json", None, 215_040)];

    for (file, definition, expected) in cases {
        let mut generator = PayloadGenerator::new(GeneratorOptions::default());
        generator.load(Path::new(FIXTURES_DIR).join(file)).unwrap();
        assert_eq!(generator.count(definition).unwrap(), expected, "{file} {definition:?}");
    }

    // Materialising `wide.json` is expensive; check its parity under a cap.
    let mut options = GeneratorOptions::default();
    options.combinations.objects.max_object_payload_combinations = NonZeroUsize::new(500);
    for (file, definition) in [("person.json", None), ("pets.json", Some("owner")), ("wide.json", None)] {
        let mut generator = PayloadGenerator::new(options.clone());
        generator.load(Path::new(FIXTURES_DIR).join(file)).unwrap();
        let generated = generator.generate(definition).unwrap().len() as u64;
        assert_eq!(generator.count(definition).unwrap(), generated, "{file}");
    }
}
