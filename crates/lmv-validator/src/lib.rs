//! # lmv-validator — Validation Orchestration
//!
//! Runs a configurable set of validation plugins over data objects and
//! aggregates their findings into [`ValidationReport`](lmv_core::ValidationReport)s.
//!
//! ## Plugins
//!
//! - [`JsonSchemaValidationPlugin`]: compiles the schema into a JSON Schema
//!   document, validates each object against its class fragment and
//!   flattens nested `anyOf`/`oneOf` failures into flat messages.
//! - [`RangeValidationPlugin`]: checks each field value against the
//!   declared range of its slot (`integer`, `float`, `string`, enums).
//!
//! Custom plugins implement [`ValidationPlugin`] and are either injected as
//! instances ([`Validator::from_instances`]) or registered by name in a
//! [`PluginRegistry`].
//!
//! ## Crate Policy
//!
//! - Data conformance problems always become Error-severity messages.
//!   Misuse (missing target class, unknown plugin, uncompiled class)
//!   is returned as [`ConfigurationError`](lmv_core::ConfigurationError).
//! - Batches are pull-based: [`Reports`] validates one record per `next()`.
//! - The validator, the built-in plugins and their caches are `Send + Sync`.

pub mod batch;
pub mod error;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod validator;

pub use batch::{RecordSource, Reports};
pub use error::ValidatorError;
pub use plugin::{PluginArgs, ProcessOptions, ValidationPlugin};
pub use plugins::jsonschema_validation::{CompiledShape, JsonSchemaValidationPlugin};
pub use plugins::range_validation::RangeValidationPlugin;
pub use plugins::shape::{flatten, PathSegment, ShapeError};
pub use registry::{PluginFactory, PluginRegistry, PluginSpec};
pub use validator::Validator;
