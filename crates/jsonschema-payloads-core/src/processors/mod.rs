//! Field processors.
//!
//! Every field goes through the same chain, in both generation and counting
//! mode:
//!
//! 1. custom field processors (first `Some` wins)
//! 2. custom type processors, keyed by the effective type name
//! 3. composition expansion (`oneOf` > `allOf` > `anyOf`)
//! 4. built-in type dispatch over [`SchemaType`]
//!
//! The two modes must agree exactly: `count_field(f) == process_field(f).len()`
//! for every field. Each handler module therefore keeps its `generate` and
//! `count` functions side by side.

mod array;
mod composition;
mod custom;
mod object;
mod values;

use std::cell::RefCell;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::candidate::{wrap_raw_values, Candidate};
use crate::config::GeneratorOptions;
use crate::error::GeneratorError;
use crate::fabricator::StringFabricator;
use crate::field::Field;
use crate::report::Reporter;
use crate::schema_utils::effective_type_name;

/// The built-in schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SchemaType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(SchemaType::Boolean),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            "string" => Some(SchemaType::String),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            _ => None,
        }
    }

    fn resolve(type_name: Option<&str>) -> Result<Self, GeneratorError> {
        type_name
            .and_then(SchemaType::from_name)
            .ok_or_else(|| GeneratorError::UnknownTypeHandler {
                type_name: type_name.unwrap_or("undefined").to_string(),
            })
    }
}

/// Per-call processing state shared by every field of one `generate`/`count`.
///
/// Custom field processors receive the engine so they can recurse into
/// [`Engine::process_field`] / [`Engine::count_field`] themselves.
pub struct Engine<'a> {
    options: &'a GeneratorOptions,
    root_schema: &'a Value,
    fabricator: &'a dyn StringFabricator,
    reporter: &'a Reporter,
    rng: RefCell<StdRng>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        options: &'a GeneratorOptions,
        root_schema: &'a Value,
        fabricator: &'a dyn StringFabricator,
        reporter: &'a Reporter,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            options,
            root_schema,
            fabricator,
            reporter,
            rng: RefCell::new(rng),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        self.options
    }

    /// The whole dereferenced schema currently loaded.
    pub fn root_schema(&self) -> &Value {
        self.root_schema
    }

    /// Generate every candidate for `field`, ids assigned.
    pub fn process_field(&self, field: &Arc<Field>) -> Result<Vec<Arc<Candidate>>, GeneratorError> {
        if let Some(raw) = custom::run_field_processors(self, field)? {
            return Ok(wrap_raw_values(field, raw));
        }

        let type_name = effective_type_name(&field.schema);
        if let Some(raw) = custom::run_type_processor(self, type_name.as_deref(), field) {
            return Ok(wrap_raw_values(field, raw));
        }

        if let Some(composition) =
            composition::Composition::applicable(&field.schema, type_name.as_deref())
        {
            return composition::generate(self, field, composition);
        }

        let candidates = match SchemaType::resolve(type_name.as_deref())? {
            SchemaType::Boolean => values::generate_boolean(field),
            SchemaType::Integer | SchemaType::Number => {
                let integral = type_name.as_deref() == Some("integer");
                values::generate_numeric(self, field, integral)
            }
            SchemaType::String => values::generate_string(self, field),
            SchemaType::Array => array::generate(self, field)?,
            SchemaType::Object => object::generate(self, field)?,
        };
        Ok(candidates)
    }

    /// How many candidates [`Engine::process_field`] would return for `field`.
    ///
    /// Only materialises values where a custom hook makes the count unknowable.
    pub fn count_field(&self, field: &Arc<Field>) -> Result<u64, GeneratorError> {
        if let Some(raw) = custom::run_field_processors(self, field)? {
            return Ok(raw.len() as u64);
        }

        let type_name = effective_type_name(&field.schema);
        if let Some(raw) = custom::run_type_processor(self, type_name.as_deref(), field) {
            return Ok(raw.len() as u64);
        }

        if let Some(composition) =
            composition::Composition::applicable(&field.schema, type_name.as_deref())
        {
            return composition::count(self, field, composition);
        }

        let count = match SchemaType::resolve(type_name.as_deref())? {
            SchemaType::Boolean => 2,
            SchemaType::Integer | SchemaType::Number => 3,
            SchemaType::String => values::count_string(field),
            SchemaType::Array => array::count(self, field)?,
            SchemaType::Object => object::count(self, field)?,
        };
        Ok(count)
    }

    pub(crate) fn reporter(&self) -> &Reporter {
        self.reporter
    }

    pub(crate) fn fabricator(&self) -> &dyn StringFabricator {
        self.fabricator
    }

    /// Borrow the per-call random source. Must not be re-entered.
    pub(crate) fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        f(&mut self.rng.borrow_mut())
    }
}
