use thiserror::Error;

/// Errors that can occur during nertrain core operations.
#[derive(Debug, Error)]
pub enum NerError {
    /// `phrases` and `entities` of an annotation record differ in length.
    #[error("annotation has {phrases} phrases but {labels} entity labels")]
    LabelCountMismatch {
        /// Number of phrases in the record.
        phrases: usize,
        /// Number of entity labels in the record.
        labels: usize,
    },

    /// A phrase could not be compiled as a search pattern.
    #[error("invalid search pattern {phrase:?}: {source}")]
    InvalidPattern {
        /// The phrase that failed to compile.
        phrase: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A phrase was not found in its sentence and the converter was asked to fail.
    #[error("phrase {phrase:?} does not occur in sentence {sentence:?}")]
    PhraseNotFound {
        /// The phrase that was searched for.
        phrase: String,
        /// The sentence that was searched.
        sentence: String,
    },

    /// A span lies outside its text or is empty.
    #[error("span {start}..{end} is invalid for text of {len} characters")]
    SpanOutOfBounds {
        /// Span start (characters).
        start: usize,
        /// Span end (characters).
        end: usize,
        /// Text length (characters).
        len: usize,
    },

    /// Two spans of one example cover the same token.
    #[error("spans {first:?} and {second:?} overlap")]
    OverlappingSpans {
        /// Offsets of the earlier span.
        first: (usize, usize),
        /// Offsets of the later span.
        second: (usize, usize),
    },

    /// A span refers to a label the recognizer does not know.
    #[error("label {0:?} has not been added to the recognizer")]
    UnknownLabel(String),

    /// A training record is malformed.
    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord {
        /// Position of the record in its source array.
        index: usize,
        /// Human readable description.
        reason: String,
    },

    /// A saved model could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for nertrain operations.
pub type Result<T> = std::result::Result<T, NerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = NerError::LabelCountMismatch {
            phrases: 2,
            labels: 1,
        };
        assert_eq!(err.to_string(), "annotation has 2 phrases but 1 entity labels");

        let err = NerError::InvalidRecord {
            index: 3,
            reason: "missing field `phrases`".into(),
        };
        assert!(err.to_string().contains("index 3"));
        assert!(err.to_string().contains("phrases"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NerError>();
    }
}
