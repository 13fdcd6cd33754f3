//! # Schema-Shape Validation Plugin
//!
//! Validates objects against the JSON Schema compiled from the schema.
//!
//! ## Compilation
//!
//! The whole schema is compiled once into a shape document (see
//! [`ShapeCompiler`]). For each instantiable class a standalone fragment is
//! carved out of it: the full document with its `$defs` (so `$ref`s resolve),
//! the class's `properties` and `required` at the top level, and no top-level
//! `additionalProperties`. Fragments are compiled eagerly with `jsonschema`
//! (draft 2020-12) and cached per class.
//!
//! ## Union sub-errors
//!
//! `jsonschema` reports a failed `anyOf`/`oneOf` as a single error. To
//! report why each alternative failed, the plugin resolves the keyword's
//! alternatives inside the fragment and validates the offending value
//! against each of them. Compiled alternatives are memoised per schema
//! location behind a `parking_lot::RwLock`; compilation happens under the
//! write lock, so concurrent first use compiles once.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::{Draft, Validator as CompiledSchema};
use lmv_core::{naming, ConfigurationError, ValidationResult};
use lmv_schema::{GeneratorOptions, JsonSchemaGenerator, SchemaError, SchemaView, ShapeCompiler};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ValidatorError;
use crate::plugin::{PluginArgs, ProcessOptions, ValidationPlugin};
use crate::plugins::shape::{
    self, instance_path_segments, pointer_tokens, schema_path_segments, PathSegment, ShapeError,
};

/// Keyword arguments accepted by [`JsonSchemaValidationPlugin::from_args`].
#[derive(Debug, Clone, Default, Deserialize)]
struct ShapePluginArgs {
    /// Only compile these classes.
    #[serde(default)]
    class_list: Option<Vec<String>>,
    /// Leave nested class definitions open.
    #[serde(default)]
    not_closed: bool,
}

/// A class fragment and its compiled validator.
pub struct CompiledShape {
    fragment: Value,
    validator: CompiledSchema,
}

impl CompiledShape {
    /// The standalone JSON Schema for the class.
    pub fn fragment(&self) -> &Value {
        &self.fragment
    }
}

impl std::fmt::Debug for CompiledShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledShape")
            .field("title", &self.fragment.get("title"))
            .finish_non_exhaustive()
    }
}

/// Validates objects against compiled JSON Schema class fragments.
pub struct JsonSchemaValidationPlugin {
    schema: Arc<SchemaView>,
    shapes: HashMap<String, CompiledShape>,
    alternatives: RwLock<HashMap<String, Arc<Vec<CompiledSchema>>>>,
}

impl JsonSchemaValidationPlugin {
    pub const NAME: &'static str = "JsonSchemaValidationPlugin";

    /// Compile every instantiable class with the default generator.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Schema`] if the shape document cannot be
    /// generated or compiled.
    pub fn new(schema: Arc<SchemaView>) -> Result<Self, ValidatorError> {
        Self::from_args(schema, &PluginArgs::new())
    }

    /// Build from keyword arguments (`class_list`, `not_closed`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPluginArgs`] for malformed
    /// arguments and [`ValidatorError::Schema`] for compilation failures.
    pub fn from_args(schema: Arc<SchemaView>, args: &PluginArgs) -> Result<Self, ValidatorError> {
        let parsed: ShapePluginArgs = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| ConfigurationError::InvalidPluginArgs {
                plugin: Self::NAME.to_string(),
                reason: e.to_string(),
            })?;
        let generator = JsonSchemaGenerator::with_options(GeneratorOptions {
            not_closed: parsed.not_closed,
        });
        Self::with_compiler(schema, &generator, parsed.class_list.as_deref())
    }

    /// Build with a caller-supplied shape compiler.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Schema`] if compilation fails.
    pub fn with_compiler(
        schema: Arc<SchemaView>,
        compiler: &dyn ShapeCompiler,
        class_list: Option<&[String]>,
    ) -> Result<Self, ValidatorError> {
        let document = compiler.compile(&schema, None)?;
        let wanted = |name: &str| match class_list {
            None => true,
            Some(list) => list.iter().any(|c| {
                c == name
                    || naming::camelcase_to_sentencecase(c)
                        == naming::camelcase_to_sentencecase(name)
            }),
        };

        let mut shapes = HashMap::new();
        for class in schema.all_classes().values() {
            if !class.is_instantiable() || !wanted(&class.name) {
                continue;
            }
            let fragment = class_fragment(&document, &class.name)?;
            let validator = compile(&fragment).map_err(|reason| SchemaError::Compile {
                name: class.name.clone(),
                reason,
            })?;
            tracing::debug!(plugin = Self::NAME, class = %class.name, "compiled shape fragment");
            shapes.insert(class.name.clone(), CompiledShape { fragment, validator });
        }

        Ok(Self {
            schema,
            shapes,
            alternatives: RwLock::new(HashMap::new()),
        })
    }

    /// Compiled shape for `target_class`: exact name first, then the schema's
    /// normalised class lookup.
    pub fn shape_for(&self, target_class: &str) -> Option<(&str, &CompiledShape)> {
        self.shapes
            .get_key_value(target_class)
            .or_else(|| {
                self.schema
                    .get_class(target_class)
                    .and_then(|c| self.shapes.get_key_value(&c.name))
            })
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the compiled classes, sorted.
    pub fn compiled_classes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.shapes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn sub_errors(
        &self,
        class: &str,
        shape: &CompiledShape,
        schema_pointer: &str,
        instance: &Value,
        outer_path: &[PathSegment],
    ) -> Vec<ShapeError> {
        let Some(alternatives) = self.alternatives_for(class, &shape.fragment, schema_pointer) else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        for (index, validator) in alternatives.iter().enumerate() {
            for error in validator.iter_errors(instance) {
                let message = error.to_string();
                let relative = instance_path_segments(&error.instance_path.to_string(), instance);
                let mut instance_path = outer_path.to_vec();
                instance_path.extend(relative);
                let mut schema_path = vec![PathSegment::Index(index)];
                schema_path.extend(schema_path_segments(strip_wrapper(
                    &error.schema_path.to_string(),
                )));
                errors.push(ShapeError {
                    message,
                    instance_path,
                    schema_path,
                    instance: error.instance.into_owned(),
                    context: Vec::new(),
                });
            }
        }
        errors
    }

    fn alternatives_for(
        &self,
        class: &str,
        fragment: &Value,
        schema_pointer: &str,
    ) -> Option<Arc<Vec<CompiledSchema>>> {
        let key = format!("{class}#{schema_pointer}");
        if let Some(compiled) = self.alternatives.read().get(&key) {
            return Some(Arc::clone(compiled));
        }

        let mut cache = self.alternatives.write();
        if let Some(compiled) = cache.get(&key) {
            return Some(Arc::clone(compiled));
        }
        let Some(branches) = resolve_keyword(fragment, schema_pointer).and_then(Value::as_array)
        else {
            tracing::warn!(class, location = schema_pointer, "cannot resolve union alternatives");
            return None;
        };
        let defs = fragment.get("$defs").cloned().unwrap_or_else(|| json!({}));
        let mut compiled = Vec::with_capacity(branches.len());
        for branch in branches {
            let wrapper = json!({ "$defs": defs, "allOf": [branch] });
            match compile(&wrapper) {
                Ok(validator) => compiled.push(validator),
                Err(reason) => {
                    tracing::warn!(class, location = schema_pointer, %reason, "cannot compile union alternative");
                    return None;
                }
            }
        }
        tracing::debug!(class, location = schema_pointer, count = compiled.len(), "compiled union alternatives");
        let compiled = Arc::new(compiled);
        cache.insert(key, Arc::clone(&compiled));
        Some(compiled)
    }
}

impl std::fmt::Debug for JsonSchemaValidationPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidationPlugin")
            .field("schema", &self.schema.name())
            .field("classes", &self.compiled_classes())
            .finish_non_exhaustive()
    }
}

impl ValidationPlugin for JsonSchemaValidationPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(
        &self,
        object: &Value,
        options: &ProcessOptions,
    ) -> Result<ValidationResult, ConfigurationError> {
        let target = options.require_target_class(Self::NAME)?;
        let (class, shape) =
            self.shape_for(target)
                .ok_or_else(|| ConfigurationError::ClassNotCompiled {
                    plugin: Self::NAME.to_string(),
                    class: target.to_string(),
                })?;

        let mut errors = Vec::new();
        for error in shape.validator.iter_errors(object) {
            let message = error.to_string();
            let schema_pointer = error.schema_path.to_string();
            let instance_path = instance_path_segments(&error.instance_path.to_string(), object);
            let instance = error.instance.into_owned();
            let context = if is_union_keyword(&schema_pointer) {
                self.sub_errors(class, shape, &schema_pointer, &instance, &instance_path)
            } else {
                Vec::new()
            };
            errors.push(ShapeError {
                message,
                instance_path,
                schema_path: schema_path_segments(&schema_pointer),
                instance,
                context,
            });
        }

        let messages = shape::flatten(&errors, options.truncate);
        Ok(ValidationResult::from_messages(Self::NAME, messages))
    }
}

fn compile(schema: &Value) -> Result<CompiledSchema, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|e| e.to_string())
}

/// The document with the class's `properties`/`required` promoted to the
/// top level.
fn class_fragment(document: &Value, class: &str) -> Result<Value, SchemaError> {
    let def = document
        .get("$defs")
        .and_then(|defs| defs.get(class))
        .ok_or_else(|| SchemaError::UnknownClass(class.to_string()))?;

    let mut fragment: Map<String, Value> = match document {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    fragment.remove("properties");
    fragment.remove("required");
    fragment.remove("additionalProperties");
    fragment.insert("type".into(), json!("object"));
    fragment.insert("title".into(), json!(class));
    fragment.insert(
        "properties".into(),
        def.get("properties").cloned().unwrap_or_else(|| json!({})),
    );
    if let Some(required) = def.get("required") {
        fragment.insert("required".into(), required.clone());
    }
    Ok(Value::Object(fragment))
}

fn is_union_keyword(schema_pointer: &str) -> bool {
    schema_pointer.ends_with("/anyOf") || schema_pointer.ends_with("/oneOf")
}

/// Follow a schema pointer inside `root`, jumping through local `$ref`s.
fn resolve_keyword<'a>(root: &'a Value, schema_pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for token in pointer_tokens(schema_pointer) {
        current = if token == "$ref" {
            let reference = current.get("$ref")?.as_str()?;
            root.pointer(reference.strip_prefix('#')?)?
        } else {
            match current {
                Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
                Value::Object(map) => map.get(&token)?,
                _ => return None,
            }
        };
    }
    Some(current)
}

/// Strip the `allOf/0` wrapper used to compile a single alternative.
fn strip_wrapper(schema_pointer: &str) -> &str {
    schema_pointer
        .strip_prefix("/allOf/0")
        .or_else(|| schema_pointer.strip_prefix("/allOf"))
        .unwrap_or(schema_pointer)
}
