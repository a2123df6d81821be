use serde::{Deserialize, Serialize};

/// An entity predicted by a trained pipeline.
///
/// Offsets are character offsets into the text the pipeline was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Predicted entity label.
    pub label: String,
    /// Covered text.
    pub text: String,
    /// Start offset (characters, inclusive).
    pub start: usize,
    /// End offset (characters, exclusive).
    pub end: usize,
}

impl Entity {
    /// The `(label, text)` pair reported by `predict_entities`.
    #[must_use]
    pub fn to_pair(&self) -> (String, String) {
        (self.label.clone(), self.text.clone())
    }
}
