//! Caller-supplied overrides, consulted before any built-in handler.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::Engine;
use crate::error::GeneratorError;
use crate::field::Field;

/// Try each custom field processor in order; the first `Some` wins.
pub(super) fn run_field_processors(
    engine: &Engine<'_>,
    field: &Arc<Field>,
) -> Result<Option<Vec<Value>>, GeneratorError> {
    for (index, processor) in engine.options().custom_field_processors.iter().enumerate() {
        if let Some(raw) = processor(field, engine.root_schema(), engine)? {
            trace!(path = %field.full_path, index, "custom field processor matched");
            return Ok(Some(raw.into_vec()));
        }
    }
    Ok(None)
}

/// Run the custom processor registered for `type_name`, if any.
pub(super) fn run_type_processor(
    engine: &Engine<'_>,
    type_name: Option<&str>,
    field: &Field,
) -> Option<Vec<Value>> {
    let processor = engine.options().custom_type_processors.get(type_name?)?;
    trace!(path = %field.full_path, type_name = ?type_name, "custom type processor matched");
    Some(processor(&field.schema).into_vec())
}
