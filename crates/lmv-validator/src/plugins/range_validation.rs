//! # Range Validation Plugin
//!
//! Checks each field of an object against the declared range of the slot it
//! resolves to. Only `integer`, `float`, `string` and enum ranges are
//! checked; class references and other types pass through.
//!
//! A field resolves to the induced slot of the target class: the global slot
//! (or the nearest ancestor attribute) refined by every `slot_usage` along
//! the ancestry, nearest last. An override that declares no range keeps the
//! range of a farther one. With no range anywhere, `string` is assumed.

use std::sync::Arc;

use lmv_core::{naming, ConfigurationError, ValidationMessage, ValidationResult};
use lmv_schema::SchemaView;
use serde_json::Value;

use crate::plugin::{ProcessOptions, ValidationPlugin};

/// Range used when no definition along the ancestry declares one.
const FALLBACK_RANGE: &str = "string";

/// Per-field range and enum checks.
#[derive(Debug, Clone)]
pub struct RangeValidationPlugin {
    schema: Arc<SchemaView>,
}

impl RangeValidationPlugin {
    pub const NAME: &'static str = "RangeValidationPlugin";

    pub fn new(schema: Arc<SchemaView>) -> Self {
        Self { schema }
    }

    fn check_value(
        &self,
        class: &str,
        field: &str,
        range: &str,
        value: &Value,
        messages: &mut Vec<ValidationMessage>,
    ) {
        let failure = match range {
            "integer" => (!(value.is_i64() || value.is_u64()))
                .then(|| format!("{class}.{field} must have a value of type 'integer'")),
            "float" => {
                (!value.is_f64()).then(|| format!("{class}.{field} must have a value of type 'float'"))
            }
            "string" => (!value.is_string())
                .then(|| format!("{class}.{field} must have a value of type 'string'")),
            other => self.schema.get_enum(other).and_then(|def| {
                let permitted = value.as_str().is_some_and(|s| def.permits(s));
                (!permitted).then(|| {
                    format!(
                        "{class}.{field} must have a value from [{}]",
                        def.values().join(", ")
                    )
                })
            }),
        };
        if let Some(text) = failure {
            messages.push(
                ValidationMessage::error(text)
                    .at_field(Some(field.to_string()))
                    .with_value(Some(value.clone())),
            );
        }
    }
}

impl ValidationPlugin for RangeValidationPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(
        &self,
        object: &Value,
        options: &ProcessOptions,
    ) -> Result<ValidationResult, ConfigurationError> {
        let target = options.require_target_class(Self::NAME)?;
        let class = self
            .schema
            .get_class(&naming::camelcase_to_sentencecase(target))
            .or_else(|| self.schema.get_class(target))
            .ok_or_else(|| ConfigurationError::UnknownClass {
                class: target.to_string(),
                schema: self.schema.name().to_string(),
            })?;

        let mut messages = Vec::new();
        let Value::Object(fields) = object else {
            messages.push(
                ValidationMessage::error(format!("{target} must be an object"))
                    .with_value(Some(object.clone()))
                    .truncated(options.truncate),
            );
            return Ok(ValidationResult::from_messages(Self::NAME, messages));
        };

        for (field, value) in fields {
            let key = naming::snakecase_to_sentencecase(field);
            let Some(slot) = self.schema.induced_slot(&key, &class.name) else {
                messages.push(
                    ValidationMessage::error(format!("Cannot find {target}.{field} in schema."))
                        .at_field(Some(field.clone()))
                        .with_value(Some(value.clone())),
                );
                continue;
            };
            let range = slot.range.as_deref().unwrap_or(FALLBACK_RANGE);
            match value {
                Value::Array(items) if slot.multivalued.unwrap_or(false) => {
                    for item in items {
                        self.check_value(target, field, range, item, &mut messages);
                    }
                }
                _ => self.check_value(target, field, range, value, &mut messages),
            }
        }

        let messages = messages
            .into_iter()
            .map(|m| m.truncated(options.truncate))
            .collect::<Vec<_>>();
        tracing::trace!(plugin = Self::NAME, class = %class.name, errors = messages.len(), "range check complete");
        Ok(ValidationResult::from_messages(Self::NAME, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = r#"
name: ranges
classes:
  Named:
    slots: [id, name]
  Person:
    is_a: Named
    slots: [age, height, status, aliases, friend]
    slot_usage:
      age:
        range: integer
    attributes:
      nickname:
        range: string
slots:
  id:
  name:
    range: string
  age:
    range: string
  height:
    range: float
  status:
    range: PersonStatus
  aliases:
    range: string
    multivalued: true
  friend:
    range: Person
enums:
  PersonStatus:
    permissible_values:
      DEAD:
      ALIVE:
"#;

    fn plugin() -> RangeValidationPlugin {
        RangeValidationPlugin::new(Arc::new(SchemaView::from_yaml_str(SCHEMA).unwrap()))
    }

    fn run(object: Value) -> ValidationResult {
        plugin()
            .process(&object, &ProcessOptions::for_class("Person"))
            .unwrap()
    }

    #[test]
    fn test_valid_object() {
        let result = run(json!({
            "id": "P:1",
            "name": "Alice",
            "age": 30,
            "height": 1.7,
            "status": "ALIVE",
            "aliases": ["Al", "Ali"],
            "friend": {"id": "P:2"},
            "nickname": "Ally"
        }));
        assert!(result.is_valid(), "{:?}", result.validation_messages());
    }

    #[test]
    fn test_slot_usage_overrides_global_range() {
        let result = run(json!({"age": "30"}));
        assert!(!result.is_valid());
        let message = &result.validation_messages()[0];
        assert_eq!(message.message, "Person.age must have a value of type 'integer'");
        assert_eq!(message.field.as_deref(), Some("age"));
        assert_eq!(message.value, Some(json!("30")));
    }

    #[test]
    fn test_range_from_distant_override_survives_nearer_one() {
        let schema = r#"
name: staff
classes:
  HasAge:
    mixin: true
    slot_usage:
      age:
        range: integer
  Person:
    slots: [age]
  Employee:
    is_a: Person
    mixins: [HasAge]
    slot_usage:
      age:
        minimum_value: 16
slots:
  age:
"#;
        let plugin = RangeValidationPlugin::new(Arc::new(SchemaView::from_yaml_str(schema).unwrap()));
        let options = ProcessOptions::for_class("Employee");

        assert!(plugin.process(&json!({"age": 30}), &options).unwrap().is_valid());
        let result = plugin.process(&json!({"age": "30"}), &options).unwrap();
        assert_eq!(
            result.validation_messages()[0].message,
            "Employee.age must have a value of type 'integer'"
        );
    }

    #[test]
    fn test_integer_rejects_floats_and_booleans() {
        assert!(!run(json!({"age": 30.5})).is_valid());
        assert!(!run(json!({"age": true})).is_valid());
    }

    #[test]
    fn test_float_rejects_integer_literal() {
        let result = run(json!({"height": 2}));
        assert_eq!(
            result.validation_messages()[0].message,
            "Person.height must have a value of type 'float'"
        );
    }

    #[test]
    fn test_enum_lists_sorted_values() {
        let result = run(json!({"status": "ZOMBIE"}));
        assert_eq!(
            result.validation_messages()[0].message,
            "Person.status must have a value from [ALIVE, DEAD]"
        );
        assert!(!run(json!({"status": 1})).is_valid());
    }

    #[test]
    fn test_unknown_field() {
        let result = run(json!({"wings": 2}));
        assert!(!result.is_valid());
        assert_eq!(
            result.validation_messages()[0].message,
            "Cannot find Person.wings in schema."
        );
        assert_eq!(result.validation_messages()[0].value, Some(json!(2)));
    }

    #[test]
    fn test_multivalued_checks_each_element() {
        let result = run(json!({"aliases": ["Al", 7, 8]}));
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.validation_messages()[0].value, Some(json!(7)));
        assert_eq!(result.validation_messages()[1].field.as_deref(), Some("aliases"));
    }

    #[test]
    fn test_null_fails_type_check() {
        assert!(!run(json!({"name": null})).is_valid());
    }

    #[test]
    fn test_all_violations_collected_in_field_order() {
        let result = run(json!({"age": "x", "status": "ZOMBIE", "name": 1}));
        let fields: Vec<_> = result
            .validation_messages()
            .iter()
            .map(|m| m.field.clone().unwrap())
            .collect();
        assert_eq!(fields, vec!["age", "status", "name"]);
    }

    #[test]
    fn test_unknown_class_is_configuration_error() {
        let err = plugin()
            .process(&json!({}), &ProcessOptions::for_class("Robot"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownClass { ref class, .. } if class == "Robot"));
    }

    #[test]
    fn test_non_object_payload() {
        let result = plugin()
            .process(&json!([1, 2]), &ProcessOptions::for_class("Person"))
            .unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.validation_messages().len(), 1);
        assert_eq!(result.validation_messages()[0].field, None);
    }

    #[test]
    fn test_missing_target_class() {
        let err = plugin()
            .process(&json!({}), &ProcessOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingTargetClass { .. }));
    }
}
