//! # Shape-Document Compilation
//!
//! Compiles a schema into a single JSON Schema (draft 2020-12) document that
//! the shape plugin validates objects against.
//!
//! ## Document layout
//!
//! - `$defs.<Class>`: `type: object` with `properties`, `required` and, unless
//!   the generator is `not_closed`, `additionalProperties: false`.
//! - `$defs.<Enum>`: `type: string` with the permissible values as `enum`.
//! - Top-level `properties` / `required`: those of the requested top class,
//!   or of the schema's `tree_root` class when no top class is given.
//!
//! All classes live side by side in one document, so the document itself is
//! not usable for validating an arbitrary class; the shape plugin carves a
//! per-class fragment out of it.
//!
//! ## Range mapping
//!
//! | Slot range                       | JSON Schema                          |
//! |----------------------------------|--------------------------------------|
//! | `integer`                        | `{"type": "integer"}`                |
//! | `float`, `double`, `decimal`     | `{"type": "number"}`                 |
//! | `boolean`                        | `{"type": "boolean"}`                |
//! | string-like types                | `{"type": "string"}`                 |
//! | enum                             | `{"$ref": "#/$defs/<Enum>"}`         |
//! | class, inlined or no identifier  | `{"$ref": "#/$defs/<Class>"}`        |
//! | class with identifier            | `{"type": "string"}` (a reference)   |
//! | `any_of` / `exactly_one_of`      | `anyOf` / `oneOf` of the above       |
//!
//! `multivalued` wraps the item schema in `{"type": "array", "items": ...}`.

use serde_json::{json, Map, Value};

use lmv_core::naming;

use crate::error::SchemaError;
use crate::model::{ClassDefinition, EnumDefinition, RangeExpression, SlotDefinition};
use crate::view::SchemaView;

/// JSON Schema dialect emitted by [`JsonSchemaGenerator`].
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Compiles a schema into a shape document.
///
/// Implementations must return a document whose `$defs` holds one object
/// schema (with `properties` and optionally `required`) per class.
pub trait ShapeCompiler: Send + Sync {
    /// Compile the whole schema, optionally promoting `top_class` to the
    /// document's top level.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownClass`] if `top_class` is not defined.
    fn compile(&self, view: &SchemaView, top_class: Option<&str>) -> Result<Value, SchemaError>;
}

/// Options for [`JsonSchemaGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Leave class definitions open (no `additionalProperties: false`).
    pub not_closed: bool,
}

/// The default [`ShapeCompiler`].
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaGenerator {
    options: GeneratorOptions,
}

impl JsonSchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn class_schema(&self, view: &SchemaView, class: &ClassDefinition) -> Value {
        let (properties, required) = self.class_properties(view, class);
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("title".into(), json!(class.name));
        if let Some(description) = &class.description {
            schema.insert("description".into(), json!(description));
        }
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        if !self.options.not_closed {
            schema.insert("additionalProperties".into(), json!(false));
        }
        Value::Object(schema)
    }

    fn class_properties(
        &self,
        view: &SchemaView,
        class: &ClassDefinition,
    ) -> (Map<String, Value>, Vec<String>) {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for slot_name in view.class_slot_names(&class.name) {
            let slot = view
                .induced_slot(&slot_name, &class.name)
                .unwrap_or_else(|| SlotDefinition {
                    name: slot_name.clone(),
                    ..Default::default()
                });
            let property = naming::underscore(&slot_name);
            if slot.is_required() || slot.identifier.unwrap_or(false) {
                required.push(property.clone());
            }
            properties.insert(property, self.slot_schema(view, &slot));
        }
        (properties, required)
    }

    fn slot_schema(&self, view: &SchemaView, slot: &SlotDefinition) -> Value {
        let inlined = slot.inlined.unwrap_or(false);
        let mut item = if !slot.any_of.is_empty() {
            json!({ "anyOf": self.alternatives(view, &slot.any_of, inlined) })
        } else if !slot.exactly_one_of.is_empty() {
            json!({ "oneOf": self.alternatives(view, &slot.exactly_one_of, inlined) })
        } else {
            range_schema(view, effective_range(view, slot.range.as_deref()), inlined)
        };

        if let Value::Object(map) = &mut item {
            if let Some(pattern) = &slot.pattern {
                map.insert("pattern".into(), json!(pattern));
            }
            if let Some(min) = &slot.minimum_value {
                map.insert("minimum".into(), min.clone());
            }
            if let Some(max) = &slot.maximum_value {
                map.insert("maximum".into(), max.clone());
            }
        }

        let mut schema = if slot.is_multivalued() {
            json!({ "type": "array", "items": item })
        } else {
            item
        };
        if let (Some(description), Value::Object(map)) = (&slot.description, &mut schema) {
            map.insert("description".into(), json!(description));
        }
        schema
    }

    fn alternatives(
        &self,
        view: &SchemaView,
        expressions: &[RangeExpression],
        inlined: bool,
    ) -> Vec<Value> {
        expressions
            .iter()
            .map(|e| range_schema(view, effective_range(view, e.range.as_deref()), inlined))
            .collect()
    }
}

impl ShapeCompiler for JsonSchemaGenerator {
    fn compile(&self, view: &SchemaView, top_class: Option<&str>) -> Result<Value, SchemaError> {
        let mut defs = Map::new();
        for class in view.all_classes().values() {
            defs.insert(class.name.clone(), self.class_schema(view, class));
        }
        for def in view.all_enums().values() {
            defs.insert(def.name.clone(), enum_schema(def));
        }

        let top = match top_class {
            Some(name) => Some(
                view.get_class(name)
                    .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))?,
            ),
            None => view.all_classes().values().find(|c| c.tree_root),
        };

        let mut document = Map::new();
        document.insert("$schema".into(), json!(DRAFT_2020_12));
        if let Some(id) = &view.schema().id {
            document.insert("$id".into(), json!(id));
        }
        document.insert("title".into(), json!(view.name()));
        document.insert("type".into(), json!("object"));
        document.insert("$defs".into(), Value::Object(defs));
        if let Some(class) = top {
            let (properties, required) = self.class_properties(view, class);
            document.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                document.insert("required".into(), json!(required));
            }
            if !self.options.not_closed {
                document.insert("additionalProperties".into(), json!(false));
            }
        }

        tracing::debug!(
            schema = view.name(),
            top_class = top.map(|c| c.name.as_str()),
            "compiled shape document"
        );
        Ok(Value::Object(document))
    }
}

fn effective_range<'a>(view: &'a SchemaView, declared: Option<&'a str>) -> &'a str {
    declared.or(view.default_range()).unwrap_or("string")
}

fn enum_schema(def: &EnumDefinition) -> Value {
    let mut schema = json!({
        "type": "string",
        "title": def.name,
        "enum": def.values(),
    });
    if let (Some(description), Value::Object(map)) = (&def.description, &mut schema) {
        map.insert("description".into(), json!(description));
    }
    schema
}

/// JSON Schema for a built-in type name, if `range` is one.
fn builtin_type_schema(range: &str) -> Option<Value> {
    let ty = match range {
        "integer" | "int" => "integer",
        "float" | "double" | "decimal" => "number",
        "boolean" | "bool" => "boolean",
        "string" | "str" | "uri" | "uriorcurie" | "curie" | "ncname" | "objectidentifier"
        | "nodeidentifier" | "date" | "datetime" | "time" | "date_or_datetime" => "string",
        _ => return None,
    };
    Some(json!({ "type": ty }))
}

fn range_schema(view: &SchemaView, range: &str, inlined: bool) -> Value {
    if let Some(schema) = builtin_type_schema(range) {
        return schema;
    }
    if let Some(def) = view.get_enum(range) {
        return json!({ "$ref": format!("#/$defs/{}", def.name) });
    }
    if let Some(class) = view.get_class(range) {
        if inlined || !has_identifier(view, class) {
            return json!({ "$ref": format!("#/$defs/{}", class.name) });
        }
    }
    json!({ "type": "string" })
}

fn has_identifier(view: &SchemaView, class: &ClassDefinition) -> bool {
    view.class_slot_names(&class.name).iter().any(|slot| {
        view.induced_slot(slot, &class.name)
            .and_then(|s| s.identifier)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
id: https://example.org/registry
name: registry
default_range: string
classes:
  Person:
    tree_root: true
    slots: [id, name, age, status, aliases, pet]
    slot_usage:
      age:
        range: integer
        minimum_value: 0
  Pet:
    slots: [name, species]
  Organization:
    slots: [id, name, members]
slots:
  id:
    identifier: true
  name:
    required: true
  age:
  status:
    range: PersonStatus
  aliases:
    multivalued: true
  pet:
    range: Pet
  species:
    any_of:
      - range: integer
      - range: Pet
  members:
    range: Person
    multivalued: true
enums:
  PersonStatus:
    permissible_values:
      ALIVE:
      DEAD:
"#;

    fn compile(options: GeneratorOptions, top: Option<&str>) -> Value {
        let view = SchemaView::from_yaml_str(SCHEMA).unwrap();
        JsonSchemaGenerator::with_options(options).compile(&view, top).unwrap()
    }

    #[test]
    fn test_class_defs_have_properties_and_required() {
        let doc = compile(GeneratorOptions::default(), None);
        let person = &doc["$defs"]["Person"];
        assert_eq!(person["type"], "object");
        assert_eq!(person["properties"]["age"]["type"], "integer");
        assert_eq!(person["properties"]["age"]["minimum"], 0);
        assert_eq!(person["properties"]["name"]["type"], "string");
        assert_eq!(person["required"], json!(["id", "name"]));
        assert_eq!(person["additionalProperties"], false);
    }

    #[test]
    fn test_ranges_map_to_refs_and_arrays() {
        let doc = compile(GeneratorOptions::default(), None);
        let person = &doc["$defs"]["Person"]["properties"];
        assert_eq!(person["status"]["$ref"], "#/$defs/PersonStatus");
        assert_eq!(person["aliases"]["type"], "array");
        assert_eq!(person["aliases"]["items"]["type"], "string");
        // Pet has no identifier, so it is embedded.
        assert_eq!(person["pet"]["$ref"], "#/$defs/Pet");

        // Person has an identifier, so members are references.
        let org = &doc["$defs"]["Organization"]["properties"];
        assert_eq!(org["members"]["items"]["type"], "string");
    }

    #[test]
    fn test_any_of_becomes_union() {
        let doc = compile(GeneratorOptions::default(), None);
        let species = &doc["$defs"]["Pet"]["properties"]["species"];
        assert_eq!(species["anyOf"][0]["type"], "integer");
        assert_eq!(species["anyOf"][1]["$ref"], "#/$defs/Pet");
    }

    #[test]
    fn test_enum_defs() {
        let doc = compile(GeneratorOptions::default(), None);
        assert_eq!(doc["$defs"]["PersonStatus"]["enum"], json!(["ALIVE", "DEAD"]));
    }

    #[test]
    fn test_tree_root_is_default_top_class() {
        let doc = compile(GeneratorOptions::default(), None);
        assert_eq!(doc["$schema"], DRAFT_2020_12);
        assert_eq!(doc["$id"], "https://example.org/registry");
        assert!(doc["properties"]["age"].is_object());

        let doc = compile(GeneratorOptions::default(), Some("Organization"));
        assert!(doc["properties"]["members"].is_object());
        assert!(doc["properties"].get("age").is_none());
    }

    #[test]
    fn test_unknown_top_class_is_error() {
        let view = SchemaView::from_yaml_str(SCHEMA).unwrap();
        let err = JsonSchemaGenerator::new()
            .compile(&view, Some("Robot"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownClass(ref c) if c == "Robot"));
    }

    #[test]
    fn test_not_closed_leaves_classes_open() {
        let doc = compile(GeneratorOptions { not_closed: true }, None);
        assert!(doc["$defs"]["Person"].get("additionalProperties").is_none());
    }
}
