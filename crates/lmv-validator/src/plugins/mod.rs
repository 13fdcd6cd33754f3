//! Built-in validation plugins.

pub mod jsonschema_validation;
pub mod range_validation;
pub mod shape;
