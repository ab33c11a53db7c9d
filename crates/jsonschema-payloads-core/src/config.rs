//! Configuration for payload generation.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::Candidate;
use crate::error::GeneratorError;
use crate::field::Field;
use crate::processors::Engine;

/// A caller-supplied function plugged into the generator.
///
/// Wrapped in an `Arc` so options stay cheap to clone and can be shared
/// across threads.
pub struct Hook<F: ?Sized>(pub Arc<F>);

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Hook(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

impl<F: ?Sized> std::ops::Deref for Hook<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

/// Raw values returned by a hook: either a single value or a list.
///
/// A single value is shorthand for a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValues {
    One(Value),
    Many(Vec<Value>),
}

impl RawValues {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            RawValues::One(value) => vec![value],
            RawValues::Many(values) => values,
        }
    }
}

impl From<Value> for RawValues {
    fn from(value: Value) -> Self {
        RawValues::One(value)
    }
}

impl From<Vec<Value>> for RawValues {
    fn from(values: Vec<Value>) -> Self {
        RawValues::Many(values)
    }
}

/// Candidates already generated for one property of an object field.
#[derive(Debug, Clone)]
pub struct PropertyCandidates {
    /// Property name as declared in the schema.
    pub key: String,
    pub field: Arc<Field>,
    pub candidates: Vec<Arc<Candidate>>,
}

/// Field-level override: `(field, root schema, engine)`. `Ok(None)` falls
/// through to the next processor.
pub type FieldProcessorFn = dyn Fn(&Arc<Field>, &Value, &Engine<'_>) -> Result<Option<RawValues>, GeneratorError>
    + Send
    + Sync;

/// Type-level override, given the field's schema fragment.
pub type TypeProcessorFn = dyn Fn(&Value) -> RawValues + Send + Sync;

/// Replaces the built-in array combiner: `(field, raw item values)`.
pub type ArrayCombinationFn = dyn Fn(&Field, &[Value]) -> Option<RawValues> + Send + Sync;

/// Builds minimal (required-only) objects from the required properties.
pub type MinimalPayloadFn = dyn Fn(&Field, &[PropertyCandidates]) -> Option<RawValues> + Send + Sync;

/// Builds partial objects layered onto every minimal payload.
pub type OptionalPayloadFn =
    dyn Fn(&Field, &[Arc<Candidate>], &[PropertyCandidates]) -> Option<RawValues> + Send + Sync;

pub type KeyTransformFn = dyn Fn(&str) -> String + Send + Sync;

/// How property names are turned into payload keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyTransform {
    /// `first_name` → `firstName`.
    #[default]
    CamelCase,
    /// Keep property names as declared.
    Identity,
    #[serde(skip)]
    Custom(Hook<KeyTransformFn>),
}

impl KeyTransform {
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyTransform::CamelCase => key.to_lower_camel_case(),
            KeyTransform::Identity => key.to_string(),
            KeyTransform::Custom(transform) => transform(key),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArrayCombinations {
    /// Truncates the singles-then-pairs sequence.
    pub max_combinations: Option<NonZeroUsize>,
    #[serde(skip)]
    pub combination_generator: Option<Hook<ArrayCombinationFn>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObjectCombinations {
    /// Truncates every property's candidate list before flattening.
    pub max_properties_combinations: Option<NonZeroUsize>,
    /// Hard ceiling on the candidates of one object field.
    pub max_object_payload_combinations: Option<NonZeroUsize>,
    #[serde(skip)]
    pub minimal_payload_combination_generator: Option<Hook<MinimalPayloadFn>>,
    #[serde(skip)]
    pub optional_payload_combinations_generator: Option<Hook<OptionalPayloadFn>>,
}

impl ObjectCombinations {
    pub(crate) fn has_custom_generator(&self) -> bool {
        self.minimal_payload_combination_generator.is_some()
            || self.optional_payload_combinations_generator.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CombinationOptions {
    pub arrays: ArrayCombinations,
    pub objects: ObjectCombinations,
}

/// Options for payload generation.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `max-depth`,
/// `max-object-payload-combinations`). Hooks are programmatic only and are
/// skipped by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorOptions {
    /// Suppress progress reports. Default: true.
    pub silent: bool,
    /// Property name → payload key. Default: lower camel case.
    pub key_transform: KeyTransform,
    /// Seed for numeric samples and fabricated strings. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Maximum traversal depth while dereferencing `$ref` (stack overflow guard).
    pub max_depth: usize,
    pub combinations: CombinationOptions,
    /// Tried in order before type dispatch; the first `Some` wins.
    #[serde(skip)]
    pub custom_field_processors: Vec<Hook<FieldProcessorFn>>,
    /// Keyed by schema type name, checked before the built-in handler.
    #[serde(skip)]
    pub custom_type_processors: HashMap<String, Hook<TypeProcessorFn>>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            silent: true,
            key_transform: KeyTransform::CamelCase,
            seed: None,
            max_depth: 50,
            combinations: CombinationOptions::default(),
            custom_field_processors: Vec::new(),
            custom_type_processors: HashMap::new(),
        }
    }
}

impl GeneratorOptions {
    pub fn with_field_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&Arc<Field>, &Value, &Engine<'_>) -> Result<Option<RawValues>, GeneratorError>
            + Send
            + Sync
            + 'static,
    {
        self.custom_field_processors.push(Hook(Arc::new(processor)));
        self
    }

    pub fn with_type_processor<F>(mut self, type_name: impl Into<String>, processor: F) -> Self
    where
        F: Fn(&Value) -> RawValues + Send + Sync + 'static,
    {
        self.custom_type_processors
            .insert(type_name.into(), Hook(Arc::new(processor)));
        self
    }

    pub fn with_key_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.key_transform = KeyTransform::Custom(Hook(Arc::new(transform)));
        self
    }

    pub fn with_array_combination_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Field, &[Value]) -> Option<RawValues> + Send + Sync + 'static,
    {
        self.combinations.arrays.combination_generator = Some(Hook(Arc::new(generator)));
        self
    }

    pub fn with_minimal_payload_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Field, &[PropertyCandidates]) -> Option<RawValues> + Send + Sync + 'static,
    {
        self.combinations.objects.minimal_payload_combination_generator =
            Some(Hook(Arc::new(generator)));
        self
    }

    pub fn with_optional_payload_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Field, &[Arc<Candidate>], &[PropertyCandidates]) -> Option<RawValues>
            + Send
            + Sync
            + 'static,
    {
        self.combinations.objects.optional_payload_combinations_generator =
            Some(Hook(Arc::new(generator)));
        self
    }
}
