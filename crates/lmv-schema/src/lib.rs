//! # lmv-schema — Schema Introspection & Shape Compilation
//!
//! Provides the two schema-derived services the validation plugins consume:
//!
//! ## Introspection (`model`, `view`)
//!
//! [`SchemaView`] loads a LinkML-style YAML schema and answers the questions
//! the range plugin asks: which class is this, which slot does this field
//! name resolve to, does the class override it via `slot_usage`, what are an
//! enum's permissible values. Lookups accept exact names or any naming
//! convention that normalises to the same sentence-case key.
//!
//! ## Shape compilation (`codegen`)
//!
//! [`ShapeCompiler`] turns a schema into one JSON Schema document with a
//! `$defs` entry per class and enum. [`JsonSchemaGenerator`] is the default
//! implementation; the shape plugin accepts any other.
//!
//! ## Crate Policy
//!
//! - Depends only on `lmv-core` internally.
//! - The schema is read-only after loading. `SchemaView` is `Send + Sync`
//!   and shared between plugins behind an `Arc`.

pub mod codegen;
pub mod error;
pub mod model;
pub mod view;

pub use codegen::{GeneratorOptions, JsonSchemaGenerator, ShapeCompiler};
pub use error::SchemaError;
pub use model::{
    ClassDefinition, EnumDefinition, PermissibleValue, RangeExpression, SchemaDefinition,
    SlotDefinition,
};
pub use view::SchemaView;
