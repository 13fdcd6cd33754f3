//! # Record Sources & Lazy Reports
//!
//! A record file holds either a flat array of objects (all validated as one
//! caller-supplied class) or an object mapping class names to arrays of
//! objects. [`Reports`] walks the records in file order and validates one
//! per call to `next()`; records that are never pulled are never validated.

use std::path::Path;

use lmv_core::{ConfigurationError, ValidationReport};
use serde_json::Value;

use crate::error::ValidatorError;
use crate::plugin::ProcessOptions;
use crate::validator::Validator;

/// Records to validate, as read from a file or built by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    /// Untyped records; the caller supplies the target class.
    Flat(Vec<Value>),
    /// Records grouped by target class, in group order.
    Typed(Vec<(String, Vec<Value>)>),
}

impl RecordSource {
    /// Interpret a parsed document: an array is `Flat`, an object of arrays
    /// is `Typed`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::SourceLoad`] for any other shape.
    pub fn from_value(value: Value, source_name: &str) -> Result<Self, ValidatorError> {
        match value {
            Value::Array(records) => Ok(Self::Flat(records)),
            Value::Object(groups) => {
                let mut typed = Vec::with_capacity(groups.len());
                for (class, records) in groups {
                    match records {
                        Value::Array(records) => typed.push((class, records)),
                        _ => {
                            return Err(ValidatorError::SourceLoad {
                                path: source_name.to_string(),
                                reason: format!("records for '{class}' are not an array"),
                            })
                        }
                    }
                }
                Ok(Self::Typed(typed))
            }
            _ => Err(ValidatorError::SourceLoad {
                path: source_name.to_string(),
                reason: "expected an array of objects or an object of arrays".to_string(),
            }),
        }
    }

    /// Read a JSON file, or a YAML file for `.yaml`/`.yml` extensions.
    ///
    /// The file is read completely and closed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Io`] if the file cannot be read and
    /// [`ValidatorError::SourceLoad`] if it does not parse into records.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidatorError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let value: Value = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| ValidatorError::SourceLoad {
                path: name.clone(),
                reason: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| ValidatorError::SourceLoad {
                path: name.clone(),
                reason: e.to_string(),
            })?
        };
        let source = Self::from_value(value, &name)?;
        tracing::info!(path = %name, records = source.len(), "loaded records");
        Ok(source)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(records) => records.len(),
            Self::Typed(groups) => groups.iter().map(|(_, r)| r.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pair every record with its target class.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UntypedBatch`] for a flat source with
    /// no target class. A typed source ignores `target_class`.
    pub(crate) fn into_typed_records(
        self,
        target_class: Option<&str>,
        source_name: &str,
    ) -> Result<Box<dyn Iterator<Item = (String, Value)> + Send>, ConfigurationError> {
        match self {
            Self::Flat(records) => {
                let class = target_class
                    .ok_or_else(|| ConfigurationError::UntypedBatch {
                        source_name: source_name.to_string(),
                    })?
                    .to_string();
                Ok(Box::new(
                    records.into_iter().map(move |record| (class.clone(), record)),
                ))
            }
            Self::Typed(groups) => Ok(Box::new(groups.into_iter().flat_map(|(class, records)| {
                records.into_iter().map(move |record| (class.clone(), record))
            }))),
        }
    }
}

/// Lazy, single-pass iterator of validation reports.
pub struct Reports<'a> {
    validator: &'a Validator,
    records: Box<dyn Iterator<Item = (String, Value)> + Send>,
    options: ProcessOptions,
    strict: bool,
}

impl<'a> Reports<'a> {
    pub(crate) fn new(
        validator: &'a Validator,
        records: Box<dyn Iterator<Item = (String, Value)> + Send>,
        options: ProcessOptions,
        strict: bool,
    ) -> Self {
        Self {
            validator,
            records,
            options,
            strict,
        }
    }
}

impl Iterator for Reports<'_> {
    type Item = Result<ValidationReport, ConfigurationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (class, record) = self.records.next()?;
        let options = ProcessOptions {
            target_class: Some(class),
            ..self.options.clone()
        };
        Some(
            self.validator
                .validate_with_options(&record, &options, self.strict),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl std::fmt::Debug for Reports<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reports")
            .field("remaining", &self.records.size_hint())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_shapes() {
        let flat = RecordSource::from_value(json!([{"a": 1}, {"a": 2}]), "x").unwrap();
        assert_eq!(flat.len(), 2);
        assert!(matches!(flat, RecordSource::Flat(_)));

        let typed =
            RecordSource::from_value(json!({"B": [{"b": 1}], "A": [{"a": 1}, {"a": 2}]}), "x")
                .unwrap();
        match &typed {
            RecordSource::Typed(groups) => {
                let names: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
                assert_eq!(names, vec!["B", "A"]);
            }
            other => panic!("expected typed source, got {other:?}"),
        }
        assert_eq!(typed.len(), 3);
    }

    #[test]
    fn test_from_value_rejects_other_shapes() {
        assert!(matches!(
            RecordSource::from_value(json!("text"), "x"),
            Err(ValidatorError::SourceLoad { .. })
        ));
        assert!(matches!(
            RecordSource::from_value(json!({"A": {"a": 1}}), "x"),
            Err(ValidatorError::SourceLoad { .. })
        ));
    }

    #[test]
    fn test_flat_records_need_target_class() {
        let err = RecordSource::Flat(vec![json!({})])
            .into_typed_records(None, "people.json")
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigurationError::UntypedBatch {
                source_name: "people.json".into()
            }
        );
    }

    #[test]
    fn test_typed_records_ignore_target_class() {
        let records: Vec<(String, Value)> =
            RecordSource::Typed(vec![("A".into(), vec![json!(1), json!(2)]), ("B".into(), vec![json!(3)])])
                .into_typed_records(Some("Ignored"), "x")
                .unwrap()
                .collect();
        let classes: Vec<&str> = records.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(classes, vec!["A", "A", "B"]);
    }

    #[test]
    fn test_from_path_reads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("people.yaml");
        std::fs::write(&yaml, "Person:\n  - id: P:1\n  - id: P:2\n").unwrap();
        assert_eq!(RecordSource::from_path(&yaml).unwrap().len(), 2);

        let json_path = dir.path().join("people.json");
        std::fs::write(&json_path, r#"[{"id": "P:1"}]"#).unwrap();
        assert!(matches!(
            RecordSource::from_path(&json_path).unwrap(),
            RecordSource::Flat(_)
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            RecordSource::from_path(&bad),
            Err(ValidatorError::SourceLoad { .. })
        ));
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        assert!(matches!(
            RecordSource::from_path("/nonexistent/records.json"),
            Err(ValidatorError::Io(_))
        ));
    }
}
