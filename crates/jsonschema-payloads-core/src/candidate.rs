//! Payload candidates: one concrete value realised for a field.

use std::sync::{Arc, OnceLock};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use crate::field::Field;

/// One concrete value generated for a [`Field`], with lineage.
///
/// Candidates are shared (`Arc`) because several siblings may extend the same
/// parent. The id is written once, when the owning field's list is final.
#[derive(Debug)]
pub struct Candidate {
    pub field: Arc<Field>,
    pub value: Value,
    pub parent: Option<Arc<Candidate>>,
    id: OnceLock<String>,
}

impl Candidate {
    pub fn new(field: Arc<Field>, value: Value, parent: Option<Arc<Candidate>>) -> Self {
        Self {
            field,
            value,
            parent,
            id: OnceLock::new(),
        }
    }

    /// `"{fullPath}:{index}"`, or `None` for intermediate candidates that never
    /// reached a final list.
    pub fn id(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Candidate", 3)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("parentId", &self.parent.as_ref().and_then(|p| p.id()))?;
        state.end()
    }
}

/// Generate the identity of the candidate at `index` in `field`'s final list.
pub fn payload_id(field: &Field, index: usize) -> String {
    format!("{}:{}", field.full_path, index)
}

/// Assign ids by final list position. Candidates that already carry an id
/// from another list keep it.
pub fn finalize_ids(field: &Field, candidates: &[Arc<Candidate>]) {
    for (index, candidate) in candidates.iter().enumerate() {
        let _ = candidate.id.set(payload_id(field, index));
    }
}

/// Wrap raw values into finalised candidates for `field`.
pub fn wrap_raw_values(field: &Arc<Field>, raw_values: Vec<Value>) -> Vec<Arc<Candidate>> {
    let candidates: Vec<Arc<Candidate>> = raw_values
        .into_iter()
        .map(|value| Arc::new(Candidate::new(Arc::clone(field), value, None)))
        .collect();
    finalize_ids(field, &candidates);
    candidates
}

/// Re-home existing candidates under `field`, keeping each source as the parent.
pub fn rewrap_candidates(field: &Arc<Field>, sources: Vec<Arc<Candidate>>) -> Vec<Arc<Candidate>> {
    let candidates: Vec<Arc<Candidate>> = sources
        .into_iter()
        .map(|source| {
            let value = source.value.clone();
            Arc::new(Candidate::new(Arc::clone(field), value, Some(source)))
        })
        .collect();
    finalize_ids(field, &candidates);
    candidates
}
