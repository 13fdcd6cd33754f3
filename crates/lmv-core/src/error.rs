//! # Error Types: Configuration Errors
//!
//! Errors in this module mean the validator was invoked incorrectly, not that
//! the data is invalid. They are raised immediately to the caller and are
//! never represented as a `ValidationMessage`.
//!
//! ## Design
//!
//! - Data conformance problems (type mismatch, unknown field, shape
//!   violation) are reported as Error-severity messages, never through here.
//! - Every variant names the offending plugin, class, or argument so the
//!   caller can fix the invocation without re-running under a debugger.

use thiserror::Error;

/// Fatal misuse of the validator or one of its plugins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A plugin was asked to process an object without a target class.
    #[error("plugin '{plugin}' needs a `target_class` argument")]
    MissingTargetClass {
        /// Name of the plugin that rejected the call.
        plugin: String,
    },

    /// A flat list of records was supplied without a shared target class.
    #[error("target_class not defined; cannot validate an untyped array of objects from {source_name}")]
    UntypedBatch {
        /// Human-readable name of the record source (usually a file path).
        source_name: String,
    },

    /// A plugin name does not resolve to any registered plugin.
    #[error("unknown validation plugin '{0}'")]
    UnknownPlugin(String),

    /// Plugin construction arguments could not be interpreted.
    #[error("invalid arguments for plugin '{plugin}': {reason}")]
    InvalidPluginArgs {
        /// Plugin being constructed.
        plugin: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// The target class was never compiled by a plugin (abstract, mixin,
    /// excluded by `class_list`, or not in the schema at all).
    #[error("plugin '{plugin}' has no compiled shape for class '{class}'")]
    ClassNotCompiled {
        /// Plugin that owns the compiled-shape cache.
        plugin: String,
        /// Requested target class.
        class: String,
    },

    /// The target class does not exist in the schema.
    #[error("class '{class}' is not defined in schema '{schema}'")]
    UnknownClass {
        /// Requested target class.
        class: String,
        /// Schema name or id.
        schema: String,
    },
}
