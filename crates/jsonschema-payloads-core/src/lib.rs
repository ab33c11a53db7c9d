//! Enumerate bounded, deterministic sets of test payloads from a JSON Schema.
//!
//! For every field the engine produces a list of candidate values covering
//! type boundaries, enum values, required/optional property combinations and
//! `oneOf`/`allOf`/`anyOf` alternatives. A parallel counting pass computes
//! the size of that list without building it, and always agrees with it:
//!
//! ```
//! use jsonschema_payloads_core::{GeneratorOptions, PayloadGenerator};
//! use serde_json::json;
//!
//! let mut generator = PayloadGenerator::new(GeneratorOptions::default());
//! generator
//!     .load(json!({
//!         "type": "object",
//!         "required": ["enabled"],
//!         "properties": {
//!             "enabled": { "type": "boolean" },
//!             "retries": { "type": "integer", "minimum": 0, "maximum": 3 }
//!         }
//!     }))
//!     .unwrap();
//!
//! assert_eq!(generator.count(None).unwrap(), 8);
//! assert_eq!(generator.generate(None).unwrap().len(), 8);
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod fabricator;
pub mod field;
pub mod generator;
pub mod processors;
pub mod report;
pub mod resolver;
pub mod schema_utils;

pub use candidate::Candidate;
pub use config::{
    ArrayCombinations, CombinationOptions, GeneratorOptions, Hook, KeyTransform,
    ObjectCombinations, PropertyCandidates, RawValues,
};
pub use error::{FabricationError, GeneratorError, ResolveError};
pub use fabricator::{FakeStringFabricator, StringFabricator};
pub use field::Field;
pub use generator::{PayloadGenerator, SchemaSource};
pub use processors::{Engine, SchemaType};
pub use report::Reporter;
pub use resolver::{LocalRefResolver, SchemaResolver};
pub use schema_utils::{build_path, split_path};
