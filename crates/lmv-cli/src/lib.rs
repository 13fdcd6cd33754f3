//! # lmv-cli — LinkML Validator Command Line
//!
//! Provides the `linkml-validator` binary:
//!
//! ```bash
//! linkml-validator -s schema.yaml -i people.json -t Person
//! linkml-validator -s schema.yaml -i data.yaml -p JsonSchemaValidationPlugin RangeValidationPlugin --strict
//! linkml-validator --config validate.yaml -i data.json -o reports.json
//! ```
//!
//! Reports for all inputs are written as one JSON array. The exit code is
//! 0 when every object is valid, 1 when any is invalid and 2 on errors.

pub mod config;
pub mod validate;
