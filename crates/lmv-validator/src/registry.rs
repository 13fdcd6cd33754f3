//! # Plugin Registry
//!
//! Maps plugin names to factories so plugins can be chosen by name from the
//! command line or a config file. The default registry knows the two
//! built-in plugins; `JsonschemaValidationPlugin` is accepted as an alias
//! for the shape plugin.

use std::collections::BTreeMap;
use std::sync::Arc;

use lmv_core::ConfigurationError;
use lmv_schema::SchemaView;
use serde::{Deserialize, Serialize};

use crate::error::ValidatorError;
use crate::plugin::{PluginArgs, ValidationPlugin};
use crate::plugins::jsonschema_validation::JsonSchemaValidationPlugin;
use crate::plugins::range_validation::RangeValidationPlugin;

/// Alternate spelling of [`JsonSchemaValidationPlugin::NAME`].
pub const JSONSCHEMA_PLUGIN_ALIAS: &str = "JsonschemaValidationPlugin";

/// Builds a plugin bound to a schema from keyword arguments.
pub type PluginFactory = Box<
    dyn Fn(Arc<SchemaView>, &PluginArgs) -> Result<Arc<dyn ValidationPlugin>, ValidatorError>
        + Send
        + Sync,
>;

/// A plugin chosen by name, with its construction arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    #[serde(default)]
    pub args: PluginArgs,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: PluginArgs::new(),
        }
    }

    pub fn with_args(mut self, args: PluginArgs) -> Self {
        self.args = args;
        self
    }
}

impl From<&str> for PluginSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name → factory table.
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// A registry with no plugins.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Arc<SchemaView>, &PluginArgs) -> Result<Arc<dyn ValidationPlugin>, ValidatorError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the plugin `spec` names, bound to `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownPlugin`] for unregistered names,
    /// or whatever the factory fails with.
    pub fn build(
        &self,
        spec: &PluginSpec,
        schema: Arc<SchemaView>,
    ) -> Result<Arc<dyn ValidationPlugin>, ValidatorError> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| ConfigurationError::UnknownPlugin(spec.name.clone()))?;
        let plugin = factory(schema, &spec.args)?;
        tracing::debug!(plugin = %spec.name, "built plugin");
        Ok(plugin)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for name in [JsonSchemaValidationPlugin::NAME, JSONSCHEMA_PLUGIN_ALIAS] {
            registry.register(name, |schema, args| {
                Ok(Arc::new(JsonSchemaValidationPlugin::from_args(schema, args)?)
                    as Arc<dyn ValidationPlugin>)
            });
        }
        registry.register(RangeValidationPlugin::NAME, |schema, _args| {
            Ok(Arc::new(RangeValidationPlugin::new(schema)) as Arc<dyn ValidationPlugin>)
        });
        registry
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmv_core::ValidationResult;
    use serde_json::{json, Value};

    use crate::plugin::ProcessOptions;

    fn schema() -> Arc<SchemaView> {
        Arc::new(SchemaView::from_yaml_str("name: s\nclasses:\n  Thing:\n    slots: [id]\nslots:\n  id:\n").unwrap())
    }

    struct Echo;

    impl ValidationPlugin for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn process(
            &self,
            _object: &Value,
            _options: &ProcessOptions,
        ) -> Result<ValidationResult, ConfigurationError> {
            Ok(ValidationResult::from_messages("Echo", vec![]))
        }
    }

    #[test]
    fn test_default_registry_names() {
        let registry = PluginRegistry::default();
        assert_eq!(
            registry.names(),
            vec![
                "JsonSchemaValidationPlugin",
                "JsonschemaValidationPlugin",
                "RangeValidationPlugin"
            ]
        );
    }

    #[test]
    fn test_alias_builds_shape_plugin() {
        let plugin = PluginRegistry::default()
            .build(&PluginSpec::new(JSONSCHEMA_PLUGIN_ALIAS), schema())
            .unwrap();
        assert_eq!(plugin.name(), JsonSchemaValidationPlugin::NAME);
    }

    #[test]
    fn test_unknown_plugin() {
        let Err(err) = PluginRegistry::default().build(&PluginSpec::new("NoSuchPlugin"), schema()) else {
            panic!("expected UnknownPlugin");
        };
        assert!(matches!(
            err,
            ValidatorError::Configuration(ConfigurationError::UnknownPlugin(ref n)) if n == "NoSuchPlugin"
        ));
    }

    #[test]
    fn test_register_custom_factory() {
        let mut registry = PluginRegistry::empty();
        registry.register("Echo", |_schema, _args| Ok(Arc::new(Echo) as Arc<dyn ValidationPlugin>));
        assert!(registry.contains("Echo"));
        let plugin = registry.build(&PluginSpec::new("Echo"), schema()).unwrap();
        assert_eq!(plugin.name(), "Echo");
    }

    #[test]
    fn test_plugin_spec_deserializes_without_args() {
        let spec: PluginSpec = serde_json::from_value(json!({"name": "RangeValidationPlugin"})).unwrap();
        assert_eq!(spec, PluginSpec::new("RangeValidationPlugin"));
    }
}
