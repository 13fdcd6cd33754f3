//! # Validation Plugin Contract
//!
//! A plugin is bound to one schema at construction and then asked to
//! `process` one object at a time. The validator only ever calls
//! [`ValidationPlugin::name`] and [`ValidationPlugin::process`].

use lmv_core::{ConfigurationError, ValidationResult};
use serde_json::{Map, Value};

/// Keyword arguments for plugin construction.
pub type PluginArgs = Map<String, Value>;

/// Per-call options forwarded to every plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOptions {
    /// Schema class the object is asserted to be.
    pub target_class: Option<String>,
    /// Cap on message length, in characters.
    pub truncate: Option<usize>,
    /// Replace the object in the report with the redaction placeholder.
    pub exclude_object: bool,
    /// Free-form options for custom plugins.
    pub extra: Map<String, Value>,
}

impl ProcessOptions {
    /// Options carrying only a target class.
    pub fn for_class(target_class: impl Into<String>) -> Self {
        Self {
            target_class: Some(target_class.into()),
            ..Default::default()
        }
    }

    pub fn with_truncate(mut self, truncate: Option<usize>) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_exclude_object(mut self, exclude_object: bool) -> Self {
        self.exclude_object = exclude_object;
        self
    }

    /// The target class, or [`ConfigurationError::MissingTargetClass`] on
    /// behalf of `plugin`.
    ///
    /// # Errors
    ///
    /// Fails when no target class was given.
    pub fn require_target_class(&self, plugin: &str) -> Result<&str, ConfigurationError> {
        self.target_class
            .as_deref()
            .ok_or_else(|| ConfigurationError::MissingTargetClass {
                plugin: plugin.to_string(),
            })
    }
}

/// A validation strategy bound to one schema.
pub trait ValidationPlugin: Send + Sync {
    /// Stable plugin name, used as `plugin_name` in results.
    fn name(&self) -> &str;

    /// Validate one object as `options.target_class`.
    ///
    /// Conformance problems are reported as Error messages in the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the call itself is invalid,
    /// for example when no target class is given.
    fn process(
        &self,
        object: &Value,
        options: &ProcessOptions,
    ) -> Result<ValidationResult, ConfigurationError>;
}
