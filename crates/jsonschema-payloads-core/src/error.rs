//! Error types for schema loading and payload generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to read schema from location = {location}")]
    SchemaLoad {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {message}")]
    SchemaParse { message: String },

    #[error("Must load a schema before generating payloads")]
    NotLoaded,

    #[error("Must specify a definition for a definition-only schema")]
    DefinitionOnlySchema,

    #[error("Cannot find definition with key = {key}")]
    DefinitionNotFound { key: String },

    #[error("Schema root doesn't have the mandatory \"type\" property")]
    MissingType,

    #[error("Could not find a type handler for {type_name}")]
    UnknownTypeHandler { type_name: String },
}

/// Failures raised while dereferencing `$ref` pointers.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("Unresolvable $ref at {path}: {reference}")]
    UnresolvableRef { path: String, reference: String },

    #[error("Unsupported $ref at {path}: {reference}")]
    UnsupportedRef { path: String, reference: String },

    #[error("Circular $ref at {path}: {reference}")]
    CircularRef { path: String, reference: String },

    #[error("Recursion depth exceeded at {path} (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },
}

/// Why a string value could not be fabricated. Never fatal: the caller
/// substitutes a placeholder.
#[derive(Debug, Error, PartialEq)]
pub enum FabricationError {
    #[error("pattern constraints are not supported ({pattern})")]
    UnsupportedPattern { pattern: String },

    #[error("unknown string format \"{format}\"")]
    UnsupportedFormat { format: String },

    #[error("minLength {min} is greater than maxLength {max}")]
    InvalidLength { min: u64, max: u64 },

    #[error("minLength {min} is too large to fabricate")]
    LengthTooLarge { min: u64 },
}

impl From<ResolveError> for GeneratorError {
    fn from(err: ResolveError) -> Self {
        GeneratorError::SchemaParse {
            message: err.to_string(),
        }
    }
}
