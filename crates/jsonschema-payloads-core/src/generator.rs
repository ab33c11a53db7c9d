//! The payload generator facade.
//!
//! Owns the dereferenced schema and the configuration, and exposes the two
//! public entry points: [`PayloadGenerator::generate`] and
//! [`PayloadGenerator::count`].

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use crate::candidate::Candidate;
use crate::config::GeneratorOptions;
use crate::error::GeneratorError;
use crate::fabricator::{FakeStringFabricator, StringFabricator};
use crate::field::Field;
use crate::processors::Engine;
use crate::report::Reporter;
use crate::resolver::{LocalRefResolver, SchemaResolver};
use crate::schema_utils::build_path;

/// Keywords ignored when deciding whether a schema only holds definitions.
const METADATA_KEYWORDS: &[&str] = &["$schema", "$id", "$comment", "title", "description"];

const DEFINITION_KEYWORDS: &[&str] = &["definitions", "$defs"];

/// Where to load a schema from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    Value(Value),
    /// A JSON file, resolved relative to the working directory.
    Path(PathBuf),
}

impl From<Value> for SchemaSource {
    fn from(value: Value) -> Self {
        SchemaSource::Value(value)
    }
}

impl From<PathBuf> for SchemaSource {
    fn from(path: PathBuf) -> Self {
        SchemaSource::Path(path)
    }
}

impl From<&Path> for SchemaSource {
    fn from(path: &Path) -> Self {
        SchemaSource::Path(path.to_path_buf())
    }
}

impl From<&str> for SchemaSource {
    fn from(path: &str) -> Self {
        SchemaSource::Path(PathBuf::from(path))
    }
}

/// Enumerates representative payloads for a JSON Schema.
///
/// ```
/// use jsonschema_payloads_core::{GeneratorOptions, PayloadGenerator};
/// use serde_json::json;
///
/// let mut generator = PayloadGenerator::new(GeneratorOptions::default());
/// generator.load(json!({ "type": "boolean" })).unwrap();
///
/// let payloads = generator.generate(None).unwrap();
/// assert_eq!(payloads.len(), 2);
/// assert_eq!(generator.count(None).unwrap(), 2);
/// ```
pub struct PayloadGenerator {
    options: GeneratorOptions,
    schema: Option<Value>,
    resolver: Box<dyn SchemaResolver>,
    fabricator: Box<dyn StringFabricator>,
    reporter: Reporter,
}

impl PayloadGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            resolver: Box::new(LocalRefResolver::new(options.max_depth)),
            fabricator: Box::new(FakeStringFabricator),
            reporter: Reporter::new(options.silent),
            schema: None,
            options,
        }
    }

    /// Replace the default `$ref` dereferencer.
    pub fn with_resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the default string fabricator.
    pub fn with_fabricator(mut self, fabricator: impl StringFabricator + 'static) -> Self {
        self.fabricator = Box::new(fabricator);
        self
    }

    /// Send progress reports somewhere other than stdout.
    pub fn with_report_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.reporter = Reporter::with_sink(self.options.silent, Box::new(sink));
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// The loaded, dereferenced schema.
    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    /// Load and dereference a schema, replacing any previously loaded one.
    ///
    /// # Errors
    ///
    /// - [`GeneratorError::SchemaLoad`] if a path cannot be read as JSON.
    /// - [`GeneratorError::SchemaParse`] if dereferencing fails or the result is empty.
    pub fn load(&mut self, source: impl Into<SchemaSource>) -> Result<(), GeneratorError> {
        let raw = match source.into() {
            SchemaSource::Value(value) => value,
            SchemaSource::Path(path) => read_schema_file(&path)?,
        };

        let schema = self.resolver.dereference(&raw)?;
        if schema.is_null() || schema.as_object().is_some_and(Map::is_empty) {
            return Err(GeneratorError::SchemaParse {
                message: "(empty result)".to_string(),
            });
        }

        let definition_count: usize = definition_maps(&schema).map(|(_, defs)| defs.len()).sum();
        let has_direct_object = schema.get("type").is_some();
        info!(definition_count, has_direct_object, "loaded schema");
        self.reporter.report(format_args!(
            "Loaded schema with {} definitions{}",
            definition_count,
            if has_direct_object { ", and a direct object" } else { "" }
        ));

        self.schema = Some(schema);
        Ok(())
    }

    /// Every payload candidate for the schema root, or for `definition`.
    ///
    /// # Errors
    ///
    /// Fails if no schema is loaded, the master field cannot be resolved, or a
    /// field has no type handler.
    pub fn generate(&self, definition: Option<&str>) -> Result<Vec<Arc<Candidate>>, GeneratorError> {
        let (schema, field, name) = self.master_field(definition)?;

        info!(target_name = %name, "generating payloads");
        self.reporter.report(format_args!("Generating payloads for {name}..."));

        self.engine(schema).process_field(&field)
    }

    /// How many candidates [`PayloadGenerator::generate`] would return, computed
    /// without materialising them where possible.
    pub fn count(&self, definition: Option<&str>) -> Result<u64, GeneratorError> {
        let (schema, field, name) = self.master_field(definition)?;

        info!(target_name = %name, "counting payloads");
        self.reporter.report(format_args!("Counting payloads for {name}..."));

        self.engine(schema).count_field(&field)
    }

    fn engine<'a>(&'a self, schema: &'a Value) -> Engine<'a> {
        Engine::new(&self.options, schema, self.fabricator.as_ref(), &self.reporter)
    }

    /// Resolve the master field and a display name for reports.
    fn master_field(
        &self,
        definition: Option<&str>,
    ) -> Result<(&Value, Arc<Field>, String), GeneratorError> {
        let schema = self.schema.as_ref().ok_or(GeneratorError::NotLoaded)?;

        let field = match definition {
            None => {
                if is_definition_only(schema) {
                    return Err(GeneratorError::DefinitionOnlySchema);
                }
                Field::root(schema.clone(), "#")
            }
            Some(key) => {
                let (keyword, master) =
                    find_definition(schema, key).ok_or_else(|| GeneratorError::DefinitionNotFound {
                        key: key.to_string(),
                    })?;
                Field::root(master.clone(), build_path("#", &[keyword, key]))
            }
        };

        if field.schema.get("type").is_none() {
            return Err(GeneratorError::MissingType);
        }

        let name = match definition {
            Some(key) => key.to_string(),
            None => ["$id", "title"]
                .iter()
                .find_map(|k| field.schema.get(*k).and_then(Value::as_str))
                .unwrap_or("main object")
                .to_string(),
        };

        Ok((schema, Arc::new(field), name))
    }
}

impl fmt::Debug for PayloadGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadGenerator")
            .field("options", &self.options)
            .field("loaded", &self.schema.is_some())
            .finish_non_exhaustive()
    }
}

fn read_schema_file(path: &Path) -> Result<Value, GeneratorError> {
    let location = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| GeneratorError::SchemaLoad {
        location: location.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|err| GeneratorError::SchemaLoad {
        location,
        source: io::Error::from(err),
    })
}

/// Every definitions map present (`definitions`, then `$defs`) with its keyword.
fn definition_maps(schema: &Value) -> impl Iterator<Item = (&'static str, &Map<String, Value>)> {
    DEFINITION_KEYWORDS.iter().filter_map(move |keyword| {
        schema.get(*keyword).and_then(Value::as_object).map(|defs| (*keyword, defs))
    })
}

/// The first definition named `key`, with the keyword of the map holding it.
fn find_definition<'a>(schema: &'a Value, key: &str) -> Option<(&'static str, &'a Value)> {
    definition_maps(schema).find_map(|(keyword, defs)| defs.get(key).map(|master| (keyword, master)))
}

fn is_definition_only(schema: &Value) -> bool {
    let Some(obj) = schema.as_object() else {
        return false;
    };
    let mut keys = obj
        .keys()
        .filter(|k| !METADATA_KEYWORDS.contains(&k.as_str()))
        .peekable();
    keys.peek().is_some() && keys.all(|k| DEFINITION_KEYWORDS.contains(&k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::SharedBuffer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn loaded(schema: Value) -> PayloadGenerator {
        let mut generator = PayloadGenerator::new(GeneratorOptions::default());
        generator.load(schema).unwrap();
        generator
    }

    #[test]
    fn test_definition_only_detection() {
        assert!(is_definition_only(&json!({ "definitions": {} })));
        assert!(is_definition_only(&json!({ "$schema": "x", "$defs": {}, "title": "t" })));
        assert!(!is_definition_only(&json!({ "type": "object", "definitions": {} })));
        assert!(!is_definition_only(&json!({ "title": "t" })));
    }

    #[test]
    fn test_definition_lookup_paths() {
        let generator = loaded(json!({
            "definitions": { "flag": { "type": "boolean" } },
            "$id": "root"
        }));
        let candidates = generator.generate(Some("flag")).unwrap();
        assert_eq!(candidates[0].id(), Some("#/definitions/flag:0"));
        assert_eq!(generator.count(Some("flag")).unwrap(), 2);
    }

    #[test]
    fn test_defs_fallback() {
        let generator = loaded(json!({ "$defs": { "flag": { "type": "boolean" } } }));
        let candidates = generator.generate(Some("flag")).unwrap();
        assert_eq!(candidates[1].id(), Some("#/$defs/flag:1"));
    }

    #[test]
    fn test_defs_searched_alongside_definitions() {
        let generator = loaded(json!({
            "definitions": { "flag": { "type": "boolean" } },
            "$defs": { "level": { "type": "integer" }, "flag": { "type": "integer" } }
        }));
        let candidates = generator.generate(Some("level")).unwrap();
        assert_eq!(candidates[0].id(), Some("#/$defs/level:0"));
        assert_eq!(generator.count(Some("level")).unwrap(), 3);

        // `definitions` wins a key present in both.
        assert_eq!(generator.count(Some("flag")).unwrap(), 2);
        assert!(matches!(
            generator.count(Some("gone")),
            Err(GeneratorError::DefinitionNotFound { key }) if key == "gone"
        ));
    }

    #[test]
    fn test_error_taxonomy() {
        let generator = PayloadGenerator::new(GeneratorOptions::default());
        assert!(matches!(generator.generate(None), Err(GeneratorError::NotLoaded)));

        let generator = loaded(json!({ "definitions": { "a": { "properties": {} } } }));
        assert!(matches!(
            generator.count(None),
            Err(GeneratorError::DefinitionOnlySchema)
        ));
        assert!(matches!(
            generator.generate(Some("b")),
            Err(GeneratorError::DefinitionNotFound { .. })
        ));
        assert!(matches!(generator.generate(Some("a")), Err(GeneratorError::MissingType)));
    }

    #[test]
    fn test_empty_schema_is_parse_error() {
        let mut generator = PayloadGenerator::new(GeneratorOptions::default());
        let err = generator.load(json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse schema: (empty result)");
        assert!(generator.schema().is_none());
    }

    #[test]
    fn test_reports() {
        let buffer = SharedBuffer::default();
        let options = GeneratorOptions {
            silent: false,
            ..Default::default()
        };
        let mut generator = PayloadGenerator::new(options).with_report_sink(buffer.clone());
        generator
            .load(json!({
                "type": "object",
                "title": "Person",
                "properties": { "flag": { "type": "boolean" } },
                "definitions": { "a": { "type": "boolean" } }
            }))
            .unwrap();
        generator.generate(None).unwrap();
        generator.count(None).unwrap();

        assert_eq!(
            buffer.contents(),
            "Loaded schema with 1 definitions, and a direct object\n\
             Generating payloads for Person...\n\
             Generated 3 values for object path #\n\
             Counting payloads for Person...\n\
             Counted 3 values for object path #\n"
        );
    }
}
