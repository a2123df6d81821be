//! # Annotation Converter
//!
//! Turns `(sentence, phrases, labels)` annotations into character-offset
//! entity spans suitable for span-labelling training.
//!
//! Each phrase contributes at most one span: the first non-empty match in
//! the sentence. Spans are emitted in phrase order, not offset order.

use regex::Regex;
use tracing::warn;

use crate::error::{NerError, Result};
use crate::types::{AnnotationRecord, EntitySpan, TrainingExample};

/// How a phrase is located inside its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The phrase is a literal substring.
    #[default]
    Literal,
    /// The phrase is a regular expression.
    Pattern,
}

/// What to do when a phrase does not occur in its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    /// Skip the phrase silently.
    Ignore,
    /// Skip the phrase and log a warning.
    #[default]
    Warn,
    /// Fail with [`NerError::PhraseNotFound`].
    Error,
}

/// What to do when a phrase's span overlaps a span emitted earlier for the
/// same sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Emit every span as found.
    #[default]
    Keep,
    /// Drop the later span and log a warning.
    SkipOverlapping,
}

/// Configuration for the converter.
#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    pub match_mode: MatchMode,
    pub unmatched: UnmatchedPolicy,
    pub overlaps: OverlapPolicy,
}

impl ConverterConfig {
    /// Create a new converter configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings used when building training data: overlapping spans cannot
    /// be expressed as BIO tags, so they are dropped.
    pub fn for_training() -> Self {
        Self::default().with_overlaps(OverlapPolicy::SkipOverlapping)
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_unmatched(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    pub fn with_overlaps(mut self, policy: OverlapPolicy) -> Self {
        self.overlaps = policy;
        self
    }
}

/// Resolves phrases to entity spans.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Locate every phrase in `sentence` and emit one span per matched phrase.
    ///
    /// # Errors
    ///
    /// * [`NerError::LabelCountMismatch`] if `phrases` and `entity_labels`
    ///   differ in length.
    /// * [`NerError::InvalidPattern`] in [`MatchMode::Pattern`] when a phrase
    ///   is not a valid regular expression.
    /// * [`NerError::PhraseNotFound`] under [`UnmatchedPolicy::Error`].
    ///
    /// # Examples
    /// ```
    /// use nertrain_core::converter::Converter;
    ///
    /// let spans = Converter::default()
    ///     .convert("Do you like horses and dogs?", &["horses", "dogs"], &["ANIMAL", "ANIMAL"])
    ///     .unwrap();
    ///
    /// assert_eq!(spans[0].as_triple(), (12, 18, "ANIMAL"));
    /// assert_eq!(spans[1].as_triple(), (23, 27, "ANIMAL"));
    /// ```
    pub fn convert<P, L>(
        &self,
        sentence: &str,
        phrases: &[P],
        entity_labels: &[L],
    ) -> Result<Vec<EntitySpan>>
    where
        P: AsRef<str>,
        L: AsRef<str>,
    {
        if phrases.len() != entity_labels.len() {
            return Err(NerError::LabelCountMismatch {
                phrases: phrases.len(),
                labels: entity_labels.len(),
            });
        }

        let mut spans: Vec<EntitySpan> = Vec::with_capacity(phrases.len());

        for (phrase, label) in phrases.iter().zip(entity_labels) {
            let phrase = phrase.as_ref();

            let Some((start, end)) = self.find_first(sentence, phrase)? else {
                match self.config.unmatched {
                    UnmatchedPolicy::Ignore => {}
                    UnmatchedPolicy::Warn => {
                        warn!(phrase, sentence, "phrase not found in sentence, skipping");
                    }
                    UnmatchedPolicy::Error => {
                        return Err(NerError::PhraseNotFound {
                            phrase: phrase.to_string(),
                            sentence: sentence.to_string(),
                        });
                    }
                }
                continue;
            };

            let span = char_span(sentence, start, end, label.as_ref());

            if self.config.overlaps == OverlapPolicy::SkipOverlapping {
                if let Some(earlier) = spans.iter().find(|s| s.overlaps(&span)) {
                    warn!(
                        phrase,
                        start = span.start,
                        end = span.end,
                        earlier_start = earlier.start,
                        earlier_end = earlier.end,
                        "span overlaps an earlier span, skipping"
                    );
                    continue;
                }
            }

            spans.push(span);
        }

        Ok(spans)
    }

    /// Validate a record and convert it into a training example.
    pub fn convert_record(&self, record: &AnnotationRecord) -> Result<TrainingExample> {
        record.validate()?;
        let spans = self.convert(&record.sentence, &record.phrases, &record.entity_labels)?;
        TrainingExample::new(record.sentence.clone(), spans)
    }

    /// Byte range of the first non-empty match of `phrase`.
    fn find_first(&self, sentence: &str, phrase: &str) -> Result<Option<(usize, usize)>> {
        if phrase.is_empty() {
            return Ok(None);
        }

        match self.config.match_mode {
            MatchMode::Literal => Ok(sentence
                .find(phrase)
                .map(|start| (start, start + phrase.len()))),
            MatchMode::Pattern => {
                let re = Regex::new(phrase).map_err(|source| NerError::InvalidPattern {
                    phrase: phrase.to_string(),
                    source,
                })?;
                Ok(re
                    .find_iter(sentence)
                    .find(|m| !m.is_empty())
                    .map(|m| (m.start(), m.end())))
            }
        }
    }
}

/// Build a character-offset span from a byte range of `sentence`.
fn char_span(sentence: &str, start: usize, end: usize, label: &str) -> EntitySpan {
    let char_start = sentence[..start].chars().count();
    let char_len = sentence[start..end].chars().count();
    EntitySpan::new(char_start, char_start + char_len, label)
}

/// Convenience function to convert with default settings.
pub fn convert<P, L>(sentence: &str, phrases: &[P], entity_labels: &[L]) -> Result<Vec<EntitySpan>>
where
    P: AsRef<str>,
    L: AsRef<str>,
{
    Converter::default().convert(sentence, phrases, entity_labels)
}
