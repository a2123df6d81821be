//! Data loading for phrase-annotated training data.
//!
//! The training file is a JSON array of objects with `sentence`, `phrases`
//! and `entities` fields. Structural problems (bad JSON, missing fields,
//! mismatched phrase/label counts) fail the whole load; phrases that cannot
//! be resolved only reject their own record.

use std::fs;
use std::path::Path;

use nertrain_core::converter::Converter;
use nertrain_core::error::{NerError, Result};
use nertrain_core::types::{AnnotationRecord, TrainingExample};
use tracing::{debug, warn};

/// A record that could not be converted.
#[derive(Debug)]
pub struct RecordError {
    /// Position of the record in the source array.
    pub index: usize,
    pub error: NerError,
}

/// Outcome of converting a batch of records.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub examples: Vec<TrainingExample>,
    pub rejected: Vec<RecordError>,
}

/// Parse and validate annotation records from JSON text.
pub fn parse_records(json: &str) -> Result<Vec<AnnotationRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: AnnotationRecord =
                serde_json::from_value(value).map_err(|e| NerError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;
            record.validate().map_err(|e| NerError::InvalidRecord {
                index,
                reason: e.to_string(),
            })?;
            Ok(record)
        })
        .collect()
}

/// Read and validate annotation records from a JSON file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRecord>> {
    let content = fs::read_to_string(path)?;
    parse_records(&content)
}

/// Convert records into training examples, collecting per-record failures.
pub fn convert_records(records: &[AnnotationRecord], converter: &Converter) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, record) in records.iter().enumerate() {
        match converter.convert_record(record) {
            Ok(example) => {
                let matched: Vec<&str> = example
                    .spans
                    .iter()
                    .filter_map(|span| example.span_text(span))
                    .collect();
                debug!(index, ?matched, "converted record");
                report.examples.push(example);
            }
            Err(error) => {
                warn!(index, %error, "rejecting training record");
                report.rejected.push(RecordError { index, error });
            }
        }
    }

    report
}

/// Load a training JSON file and convert every record.
pub fn load_training_json<P: AsRef<Path>>(path: P, converter: &Converter) -> Result<LoadReport> {
    let records = load_records(path)?;
    Ok(convert_records(&records, converter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nertrain_core::converter::{ConverterConfig, MatchMode};
    use nertrain_core::types::EntitySpan;
    use std::io::Write;

    const TRAIN_JSON: &str = r#"[
        {"sentence": "Do you like horses and dogs?", "phrases": ["horses", "dogs"], "entities": ["ANIMAL", "ANIMAL"]},
        {"sentence": "I own a cat", "phrases": ["cat", "parrot"], "entities": ["ANIMAL", "ANIMAL"]}
    ]"#;

    #[test]
    fn test_parse_records() {
        let records = parse_records(TRAIN_JSON).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].phrases, vec!["cat".to_string(), "parrot".to_string()]);
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let json = r#"[{"sentence": "a", "phrases": [], "entities": []}, {"sentence": "b", "phrases": []}]"#;
        let err = parse_records(json).unwrap_err();
        assert!(matches!(err, NerError::InvalidRecord { index: 1, .. }));
        assert!(err.to_string().contains("entities"));
    }

    #[test]
    fn test_parse_rejects_length_mismatch() {
        let json = r#"[{"sentence": "horses and dogs", "phrases": ["horses", "dogs"], "entities": ["ANIMAL"]}]"#;
        let err = parse_records(json).unwrap_err();
        assert!(matches!(err, NerError::InvalidRecord { index: 0, .. }));
        assert!(err.to_string().contains("2 phrases but 1 entity labels"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(parse_records("{}"), Err(NerError::Json(_))));
    }

    #[test]
    fn test_convert_records() {
        let records = parse_records(TRAIN_JSON).unwrap();
        let report = convert_records(&records, &Converter::default());

        assert!(report.rejected.is_empty());
        assert_eq!(report.examples.len(), 2);
        assert_eq!(
            report.examples[0].spans,
            vec![EntitySpan::new(12, 18, "ANIMAL"), EntitySpan::new(23, 27, "ANIMAL")]
        );
        assert_eq!(report.examples[1].spans, vec![EntitySpan::new(8, 11, "ANIMAL")]);
    }

    #[test]
    fn test_invalid_pattern_rejects_only_its_record() {
        let json = r#"[
            {"sentence": "a (cat)", "phrases": ["(cat"], "entities": ["ANIMAL"]},
            {"sentence": "a dog", "phrases": ["dog"], "entities": ["ANIMAL"]}
        ]"#;
        let records = parse_records(json).unwrap();
        let converter = Converter::new(ConverterConfig::new().with_match_mode(MatchMode::Pattern));
        let report = convert_records(&records, &converter);

        assert_eq!(report.examples.len(), 1);
        assert_eq!(report.examples[0].text, "a dog");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 0);
        assert!(matches!(report.rejected[0].error, NerError::InvalidPattern { .. }));
    }

    #[test]
    fn test_load_training_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TRAIN_JSON.as_bytes()).unwrap();

        let report = load_training_json(file.path(), &Converter::default()).unwrap();
        assert_eq!(report.examples.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_training_json("/definitely/not/here.json", &Converter::default());
        assert!(matches!(err, Err(NerError::Io(_))));
    }
}
