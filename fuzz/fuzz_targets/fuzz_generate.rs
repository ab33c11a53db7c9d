#![no_main]

use std::num::NonZeroUsize;

use jsonschema_payloads_core::{GeneratorOptions, PayloadGenerator};
use libfuzzer_sys::fuzz_target;

const MAX_GENERATED: u64 = 100_000;

// Accepts arbitrary bytes, attempts to parse as JSON, then loads, counts and
// generates. Goal: no panics, and count == generate().len() whenever both
// succeed. Caps plus a count ceiling keep combinatorial schemas from
// exhausting memory (anyOf products are not capped).
fuzz_target!(|data: &[u8]| {
    let Ok(schema) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let mut options = GeneratorOptions {
        seed: Some(0),
        max_depth: 16,
        ..Default::default()
    };
    options.combinations.arrays.max_combinations = NonZeroUsize::new(16);
    options.combinations.objects.max_object_payload_combinations = NonZeroUsize::new(16);

    let mut generator = PayloadGenerator::new(options);
    if generator.load(schema).is_err() {
        return;
    }
    let Ok(count) = generator.count(None) else {
        return;
    };
    if count > MAX_GENERATED {
        return;
    }
    if let Ok(candidates) = generator.generate(None) {
        assert_eq!(count, candidates.len() as u64);
    }
});
