//! Errors surfaced by validator construction and record loading.

use lmv_core::ConfigurationError;
use lmv_schema::SchemaError;
use thiserror::Error;

/// Error building a validator or loading records.
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The validator or a plugin was configured incorrectly.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The schema could not be loaded or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A record file was read but does not hold records.
    #[error("cannot load records from '{path}': {reason}")]
    SourceLoad {
        /// Path of the record file.
        path: String,
        /// Why the content was rejected.
        reason: String,
    },

    /// I/O failure reading a record file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_transparent() {
        let err: ValidatorError = ConfigurationError::UnknownPlugin("Foo".into()).into();
        assert_eq!(err.to_string(), "unknown validation plugin 'Foo'");
    }

    #[test]
    fn test_source_load_display() {
        let err = ValidatorError::SourceLoad {
            path: "data.json".into(),
            reason: "expected an array".into(),
        };
        assert!(err.to_string().contains("data.json"));
        assert!(err.to_string().contains("expected an array"));
    }
}
