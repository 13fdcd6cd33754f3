//! Errors raised while loading a schema or compiling its shape document.

use thiserror::Error;

/// Error while loading, reading or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("schema load error for '{path}': {reason}")]
    Load {
        /// Path of the schema file.
        path: String,
        /// Reason the file could not be read.
        reason: String,
    },

    /// The schema text is not valid YAML or does not match the schema model.
    #[error("schema parse error for '{source_name}': {reason}")]
    Parse {
        /// File path, or `<inline>` for schemas parsed from a string.
        source_name: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A class referenced while compiling does not exist.
    #[error("class '{0}' is not defined in the schema")]
    UnknownClass(String),

    /// A compiled shape document was rejected by the JSON Schema compiler.
    #[error("shape compile error for '{name}': {reason}")]
    Compile {
        /// Class or document being compiled.
        name: String,
        /// Compiler diagnostic.
        reason: String,
    },
}
