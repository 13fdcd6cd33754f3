//! # Validator
//!
//! Dispatches each object to every configured plugin and aggregates the
//! per-plugin results into one [`ValidationReport`].
//!
//! ## Strict mode
//!
//! With `strict`, the first invalid plugin result stops the remaining
//! plugins for that object. The report then holds fewer results than there
//! are plugins. Other objects in a batch are still validated.
//!
//! ## Plugin set
//!
//! Plugins are held as a set: injected instances are de-duplicated by
//! identity. Run order currently follows registration order but is not part
//! of the contract.

use std::path::Path;
use std::sync::Arc;

use lmv_core::{ConfigurationError, ReportObject, ValidationReport};
use lmv_schema::SchemaView;
use serde_json::Value;

use crate::batch::{RecordSource, Reports};
use crate::error::ValidatorError;
use crate::plugin::{ProcessOptions, ValidationPlugin};
use crate::plugins::jsonschema_validation::JsonSchemaValidationPlugin;
use crate::registry::{PluginRegistry, PluginSpec};

/// Source name used for caller-built record sources.
const INLINE_SOURCE: &str = "<records>";

/// Runs a set of plugins, all bound to one schema, over data objects.
pub struct Validator {
    schema: Arc<SchemaView>,
    plugins: Vec<Arc<dyn ValidationPlugin>>,
}

impl Validator {
    /// A validator with the default plugin set (the shape plugin).
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Schema`] if the shape document cannot be
    /// compiled.
    pub fn new(schema: Arc<SchemaView>) -> Result<Self, ValidatorError> {
        let plugins = default_plugins(&schema)?;
        Ok(Self { schema, plugins })
    }

    /// Build plugins by name from the default registry. An empty list
    /// selects the default plugin set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownPlugin`] for unregistered names
    /// and any plugin construction error.
    pub fn with_plugins(schema: Arc<SchemaView>, specs: &[PluginSpec]) -> Result<Self, ValidatorError> {
        Self::with_registry(schema, specs, &PluginRegistry::default())
    }

    /// Build plugins by name from `registry`. An empty list selects the
    /// default plugin set.
    ///
    /// # Errors
    ///
    /// Same as [`with_plugins`](Self::with_plugins).
    pub fn with_registry(
        schema: Arc<SchemaView>,
        specs: &[PluginSpec],
        registry: &PluginRegistry,
    ) -> Result<Self, ValidatorError> {
        if specs.is_empty() {
            return Self::new(schema);
        }
        let plugins = specs
            .iter()
            .map(|spec| registry.build(spec, Arc::clone(&schema)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { schema, plugins })
    }

    /// Use ready-made plugin instances. The same instance passed twice runs
    /// once.
    pub fn from_instances(
        schema: Arc<SchemaView>,
        instances: impl IntoIterator<Item = Arc<dyn ValidationPlugin>>,
    ) -> Self {
        let mut plugins: Vec<Arc<dyn ValidationPlugin>> = Vec::new();
        for plugin in instances {
            if !plugins.iter().any(|existing| Arc::ptr_eq(existing, &plugin)) {
                plugins.push(plugin);
            }
        }
        Self { schema, plugins }
    }

    /// Load the schema from a YAML file, then build plugins by name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Schema`] if the schema cannot be loaded, or
    /// any error of [`with_plugins`](Self::with_plugins).
    pub fn from_schema_path(path: impl AsRef<Path>, specs: &[PluginSpec]) -> Result<Self, ValidatorError> {
        let schema = Arc::new(SchemaView::from_path(path)?);
        Self::with_plugins(schema, specs)
    }

    pub fn schema(&self) -> &Arc<SchemaView> {
        &self.schema
    }

    pub fn plugins(&self) -> &[Arc<dyn ValidationPlugin>] {
        &self.plugins
    }

    /// Validate one object as `target_class`.
    ///
    /// # Errors
    ///
    /// Propagates any plugin [`ConfigurationError`].
    pub fn validate(
        &self,
        object: &Value,
        target_class: &str,
        strict: bool,
    ) -> Result<ValidationReport, ConfigurationError> {
        self.validate_with_options(object, &ProcessOptions::for_class(target_class), strict)
    }

    /// Validate one object with full per-call options.
    ///
    /// # Errors
    ///
    /// Propagates any plugin [`ConfigurationError`], including
    /// `MissingTargetClass` when `options.target_class` is `None`.
    pub fn validate_with_options(
        &self,
        object: &Value,
        options: &ProcessOptions,
        strict: bool,
    ) -> Result<ValidationReport, ConfigurationError> {
        let type_name = options.target_class.clone().unwrap_or_default();
        let mut results = Vec::with_capacity(self.plugins.len());
        for plugin in &self.plugins {
            let result = plugin.process(object, options)?;
            tracing::debug!(
                plugin = plugin.name(),
                class = %type_name,
                valid = result.is_valid(),
                messages = result.validation_messages().len(),
                "collected plugin result"
            );
            let invalid = !result.is_valid();
            results.push(result);
            if strict && invalid {
                tracing::warn!(
                    plugin = plugin.name(),
                    class = %type_name,
                    skipped = self.plugins.len() - results.len(),
                    "strict mode: stopping after invalid result"
                );
                break;
            }
        }

        let report_object = if options.exclude_object {
            ReportObject::Omitted
        } else {
            ReportObject::Payload(object.clone())
        };
        Ok(ValidationReport::new(report_object, type_name, results))
    }

    /// Validate every record of `source` lazily.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UntypedBatch`] immediately for a flat
    /// source without `target_class`. Per-record errors surface from the
    /// iterator.
    pub fn validate_batch(
        &self,
        source: RecordSource,
        target_class: Option<&str>,
        strict: bool,
    ) -> Result<Reports<'_>, ConfigurationError> {
        let options = ProcessOptions {
            target_class: target_class.map(str::to_string),
            ..Default::default()
        };
        self.validate_batch_with_options(source, &options, strict)
    }

    /// Like [`validate_batch`](Self::validate_batch), with full per-call
    /// options. `options.target_class` applies to flat sources only.
    ///
    /// # Errors
    ///
    /// Same as [`validate_batch`](Self::validate_batch).
    pub fn validate_batch_with_options(
        &self,
        source: RecordSource,
        options: &ProcessOptions,
        strict: bool,
    ) -> Result<Reports<'_>, ConfigurationError> {
        self.reports(source, INLINE_SOURCE, options, strict)
    }

    /// Load a JSON or YAML record file and validate its records lazily.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Io`] / [`ValidatorError::SourceLoad`] if the
    /// file cannot be read, and [`ConfigurationError::UntypedBatch`] for a
    /// flat file without `target_class`.
    pub fn validate_file(
        &self,
        path: impl AsRef<Path>,
        target_class: Option<&str>,
        strict: bool,
    ) -> Result<Reports<'_>, ValidatorError> {
        let options = ProcessOptions {
            target_class: target_class.map(str::to_string),
            ..Default::default()
        };
        self.validate_file_with_options(path, &options, strict)
    }

    /// Like [`validate_file`](Self::validate_file), with full per-call
    /// options.
    ///
    /// # Errors
    ///
    /// Same as [`validate_file`](Self::validate_file).
    pub fn validate_file_with_options(
        &self,
        path: impl AsRef<Path>,
        options: &ProcessOptions,
        strict: bool,
    ) -> Result<Reports<'_>, ValidatorError> {
        let path = path.as_ref();
        let source = RecordSource::from_path(path)?;
        Ok(self.reports(source, &path.display().to_string(), options, strict)?)
    }

    fn reports(
        &self,
        source: RecordSource,
        source_name: &str,
        options: &ProcessOptions,
        strict: bool,
    ) -> Result<Reports<'_>, ConfigurationError> {
        let records = source.into_typed_records(options.target_class.as_deref(), source_name)?;
        Ok(Reports::new(self, records, options.clone(), strict))
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Validator")
            .field("schema", &self.schema.name())
            .field("plugins", &names)
            .finish()
    }
}

fn default_plugins(schema: &Arc<SchemaView>) -> Result<Vec<Arc<dyn ValidationPlugin>>, ValidatorError> {
    let shape = JsonSchemaValidationPlugin::new(Arc::clone(schema))?;
    Ok(vec![Arc::new(shape) as Arc<dyn ValidationPlugin>])
}
