use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// One unit of raw training input as it appears in a training JSON file.
///
/// `entity_labels[i]` is the label for `phrases[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// The annotated sentence.
    pub sentence: String,

    /// Substrings (or patterns) expected to occur in `sentence`.
    pub phrases: Vec<String>,

    /// Entity labels, positionally paired with `phrases`.
    #[serde(rename = "entities")]
    pub entity_labels: Vec<String>,
}

impl AnnotationRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        sentence: impl Into<String>,
        phrases: Vec<String>,
        entity_labels: Vec<String>,
    ) -> Self {
        Self {
            sentence: sentence.into(),
            phrases,
            entity_labels,
        }
    }

    /// Checks that every phrase has exactly one label.
    pub fn validate(&self) -> Result<()> {
        if self.phrases.len() != self.entity_labels.len() {
            return Err(NerError::LabelCountMismatch {
                phrases: self.phrases.len(),
                labels: self.entity_labels.len(),
            });
        }
        Ok(())
    }
}

/// A labelled character range of a sentence.
///
/// `start` is inclusive, `end` exclusive, both counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    #[must_use]
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Number of characters covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two spans share at least one character.
    #[must_use]
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Checks `0 <= start < end <= text_len`.
    pub fn validate(&self, text_len: usize) -> Result<()> {
        if self.start >= self.end || self.end > text_len {
            return Err(NerError::SpanOutOfBounds {
                start: self.start,
                end: self.end,
                len: text_len,
            });
        }
        Ok(())
    }

    /// Borrow the `(start, end, label)` triple.
    #[must_use]
    pub fn as_triple(&self) -> (usize, usize, &str) {
        (self.start, self.end, self.label.as_str())
    }
}

/// A sentence together with its resolved entity spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub spans: Vec<EntitySpan>,
}

impl TrainingExample {
    /// Builds an example, rejecting spans that fall outside `text`.
    pub fn new(text: impl Into<String>, spans: Vec<EntitySpan>) -> Result<Self> {
        let text = text.into();
        let len = text.chars().count();
        for span in &spans {
            span.validate(len)?;
        }
        Ok(Self { text, spans })
    }

    /// The text covered by `span`, if it lies inside this example.
    #[must_use]
    pub fn span_text(&self, span: &EntitySpan) -> Option<&str> {
        let start = crate::offsets::char_to_byte(&self.text, span.start)?;
        let end = crate::offsets::char_to_byte(&self.text, span.end)?;
        self.text.get(start..end)
    }
}
