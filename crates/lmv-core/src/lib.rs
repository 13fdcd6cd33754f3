//! # lmv-core — Foundational Types for the LinkML Validator
//!
//! This crate defines the data model shared by every validation plugin and
//! by the orchestrating `Validator`. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Reports, not panics.** Data conformance problems are values
//!    (`ValidationMessage` inside a `ValidationResult` inside a
//!    `ValidationReport`). Only misuse of the validator is an `Err`.
//!
//! 2. **One validity rule.** A `ValidationResult` can never claim to be valid
//!    while carrying an Error-severity message; the constructors enforce it.
//!    A `ValidationReport` is valid iff every contained result is valid.
//!
//! 3. **Plain serialization.** Every report type serializes to the same
//!    nested key-value shape (`plugin_name`, `validation_messages`, ...)
//!    that downstream tooling consumes as JSON.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lmv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod naming;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use error::ConfigurationError;
pub use report::{
    ReportObject, Severity, ValidationMessage, ValidationReport, ValidationResult,
    OMITTED_OBJECT_PLACEHOLDER,
};
