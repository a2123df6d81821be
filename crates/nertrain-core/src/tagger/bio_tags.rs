//! # BIO Tags for Named Entity Recognition
//!
//! Defines the tag set for sequence labeling over a dynamic label set.
//! Uses the BIO (Begin-Inside-Outside) tagging scheme: every registered
//! label `X` contributes a `B-X` and an `I-X` tag, and all labels share a
//! single `O` tag.

use serde::{Deserialize, Serialize};

/// BIO tag referring to a label by its position in a [`LabelSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BioTag {
    /// Outside any entity.
    Outside,
    /// First token of an entity.
    Begin(usize),
    /// Continuation token of an entity.
    Inside(usize),
}

impl BioTag {
    /// Number of distinct tags for `num_labels` labels.
    pub const fn num_tags(num_labels: usize) -> usize {
        1 + 2 * num_labels
    }

    /// Get the tag index for weight lookups.
    pub fn index(&self) -> usize {
        match self {
            BioTag::Outside => 0,
            BioTag::Begin(label) => 1 + 2 * label,
            BioTag::Inside(label) => 2 + 2 * label,
        }
    }

    /// Get tag from index.
    pub fn from_index(idx: usize, num_labels: usize) -> Option<Self> {
        if idx >= Self::num_tags(num_labels) {
            return None;
        }
        Some(match idx {
            0 => BioTag::Outside,
            i if i % 2 == 1 => BioTag::Begin((i - 1) / 2),
            i => BioTag::Inside((i - 2) / 2),
        })
    }

    /// Check if this is an "Inside" tag.
    pub fn is_inside(&self) -> bool {
        matches!(self, BioTag::Inside(_))
    }

    /// Label position carried by this tag.
    pub fn label(&self) -> Option<usize> {
        match self {
            BioTag::Outside => None,
            BioTag::Begin(label) | BioTag::Inside(label) => Some(*label),
        }
    }

    /// Whether a sequence may start with this tag.
    pub fn is_valid_start(tag: BioTag) -> bool {
        !tag.is_inside()
    }

    /// Check if transitioning from `from` tag to `to` tag is valid.
    ///
    /// `I-X` may only follow `B-X` or `I-X`; everything else is allowed.
    pub fn is_valid_transition(from: BioTag, to: BioTag) -> bool {
        match to {
            BioTag::Inside(label) => from.label() == Some(label),
            _ => true,
        }
    }
}

/// A run of tokens carrying the same entity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedSpan {
    pub label: usize,
    /// First token (inclusive).
    pub start_token: usize,
    /// Last token (exclusive).
    pub end_token: usize,
}

/// Group a decoded tag sequence into entity spans.
///
/// A stray `I-X` that does not continue an open `X` entity starts a new one.
pub fn extract_spans(tags: &[BioTag]) -> Vec<TaggedSpan> {
    let mut spans = Vec::new();
    let mut open: Option<TaggedSpan> = None;

    for (i, tag) in tags.iter().enumerate() {
        match *tag {
            BioTag::Inside(label) if open.is_some_and(|s| s.label == label) => {
                if let Some(span) = open.as_mut() {
                    span.end_token = i + 1;
                }
            }
            BioTag::Begin(label) | BioTag::Inside(label) => {
                spans.extend(open.take());
                open = Some(TaggedSpan {
                    label,
                    start_token: i,
                    end_token: i + 1,
                });
            }
            BioTag::Outside => spans.extend(open.take()),
        }
    }
    spans.extend(open);

    spans
}

/// Ordered, de-duplicated set of entity labels known to a recognizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label. Returns `false` if it was already known.
    pub fn add(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index_of(label).is_some()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Number of BIO tags for the current labels.
    pub fn num_tags(&self) -> usize {
        BioTag::num_tags(self.labels.len())
    }

    /// Get all possible tags in index order.
    pub fn all_tags(&self) -> Vec<BioTag> {
        (0..self.num_tags())
            .filter_map(|i| BioTag::from_index(i, self.len()))
            .collect()
    }

    /// Render a tag as `O`, `B-LABEL` or `I-LABEL`.
    pub fn tag_name(&self, tag: BioTag) -> String {
        let name = |label: usize| self.get(label).unwrap_or("?");
        match tag {
            BioTag::Outside => "O".to_string(),
            BioTag::Begin(label) => format!("B-{}", name(label)),
            BioTag::Inside(label) => format!("I-{}", name(label)),
        }
    }
}
