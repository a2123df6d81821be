//! Alignment of character-offset entity spans onto token BIO tags.

use tracing::warn;

use crate::error::{NerError, Result};
use crate::offsets::char_to_byte;
use crate::tagger::bio_tags::{BioTag, LabelSet};
use crate::tagger::tokenizer::Token;
use crate::types::EntitySpan;

/// Convert the spans of `text` into one BIO tag per token.
///
/// A span whose boundaries fall inside a token cannot be expressed and is
/// skipped with a warning.
///
/// # Errors
///
/// * [`NerError::UnknownLabel`] if a span label is not in `labels`.
/// * [`NerError::SpanOutOfBounds`] if a span lies outside `text`.
/// * [`NerError::OverlappingSpans`] if two spans share a character.
pub fn spans_to_tags(
    text: &str,
    tokens: &[Token],
    spans: &[EntitySpan],
    labels: &LabelSet,
) -> Result<Vec<BioTag>> {
    let mut tags = vec![BioTag::Outside; tokens.len()];

    let mut ordered: Vec<&EntitySpan> = spans.iter().collect();
    ordered.sort_by_key(|s| (s.start, s.end));
    for pair in ordered.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(NerError::OverlappingSpans {
                first: (pair[0].start, pair[0].end),
                second: (pair[1].start, pair[1].end),
            });
        }
    }

    let len = text.chars().count();
    for span in ordered {
        span.validate(len)?;
        let label = labels
            .index_of(&span.label)
            .ok_or_else(|| NerError::UnknownLabel(span.label.clone()))?;

        let out_of_bounds = || NerError::SpanOutOfBounds {
            start: span.start,
            end: span.end,
            len,
        };
        let start = char_to_byte(text, span.start).ok_or_else(out_of_bounds)?;
        let end = char_to_byte(text, span.end).ok_or_else(out_of_bounds)?;

        let first = tokens.iter().position(|t| t.start == start);
        let last = tokens.iter().position(|t| t.end == end);
        match (first, last) {
            (Some(first), Some(last)) if first <= last => {
                tags[first] = BioTag::Begin(label);
                for tag in &mut tags[first + 1..=last] {
                    *tag = BioTag::Inside(label);
                }
            }
            _ => {
                warn!(
                    start = span.start,
                    end = span.end,
                    label = %span.label,
                    "span does not align with token boundaries, skipping"
                );
            }
        }
    }

    Ok(tags)
}
