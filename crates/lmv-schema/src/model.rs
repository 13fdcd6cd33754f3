//! # Schema Model
//!
//! Serde model of the LinkML schema subset the validator understands:
//! classes (with inheritance, mixins and per-class slot overrides), slots
//! (with ranges, cardinality and union ranges) and enumerations.
//!
//! YAML schemas frequently write bare keys (`ALIVE:`) for entries with no
//! further properties. Every name-keyed map accepts such null entries as
//! empty definitions, and [`SchemaDefinition::normalize`] copies map keys into
//! each definition's `name` so definitions can be passed around on their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A name-keyed map whose entries may be written as bare YAML keys.
fn nullable_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw: Option<BTreeMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

/// A complete schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Schema URI.
    #[serde(default)]
    pub id: Option<String>,
    /// Short schema name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Range assumed for slots that declare none.
    #[serde(default)]
    pub default_range: Option<String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub classes: BTreeMap<String, ClassDefinition>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub slots: BTreeMap<String, SlotDefinition>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub enums: BTreeMap<String, EnumDefinition>,
}

impl SchemaDefinition {
    /// Fill every definition's `name` from its map key.
    pub fn normalize(mut self) -> Self {
        for (name, class) in self.classes.iter_mut() {
            class.name = name.clone();
            for (slot_name, slot) in class.slot_usage.iter_mut() {
                slot.name = slot_name.clone();
            }
            for (slot_name, slot) in class.attributes.iter_mut() {
                slot.name = slot_name.clone();
            }
        }
        for (name, slot) in self.slots.iter_mut() {
            slot.name = name.clone();
        }
        for (name, def) in self.enums.iter_mut() {
            def.name = name.clone();
        }
        self
    }

    /// The schema's display name: `name`, then `id`, then a fixed fallback.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed schema>")
    }
}

/// A schema class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent class.
    #[serde(default)]
    pub is_a: Option<String>,
    #[serde(default)]
    pub mixins: Vec<String>,
    /// Abstract classes are never instantiated directly.
    #[serde(default, rename = "abstract")]
    pub abstract_: bool,
    /// Mixin classes only contribute slots to other classes.
    #[serde(default)]
    pub mixin: bool,
    /// Names of globally declared slots this class uses.
    #[serde(default)]
    pub slots: Vec<String>,
    /// Class-specific refinements of global slots.
    #[serde(default, deserialize_with = "nullable_map")]
    pub slot_usage: BTreeMap<String, SlotDefinition>,
    /// Slots declared inline on this class only.
    #[serde(default, deserialize_with = "nullable_map")]
    pub attributes: BTreeMap<String, SlotDefinition>,
    #[serde(default)]
    pub tree_root: bool,
}

impl ClassDefinition {
    /// Whether instances of this class can be validated directly.
    pub fn is_instantiable(&self) -> bool {
        !self.abstract_ && !self.mixin
    }
}

/// One alternative of a union range (`any_of` / `exactly_one_of`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeExpression {
    #[serde(default)]
    pub range: Option<String>,
}

/// A slot (field) definition, global or class-scoped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Declared type, enum or class.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub identifier: Option<bool>,
    /// Whether a class-valued slot embeds the object rather than referencing it.
    #[serde(default)]
    pub inlined: Option<bool>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub minimum_value: Option<Value>,
    #[serde(default)]
    pub maximum_value: Option<Value>,
    #[serde(default)]
    pub any_of: Vec<RangeExpression>,
    #[serde(default)]
    pub exactly_one_of: Vec<RangeExpression>,
}

impl SlotDefinition {
    /// Overlay `refinement` on top of this definition. Fields the refinement
    /// leaves unset keep this definition's value.
    pub fn refined_by(&self, refinement: &SlotDefinition) -> SlotDefinition {
        SlotDefinition {
            name: self.name.clone(),
            description: refinement.description.clone().or_else(|| self.description.clone()),
            range: refinement.range.clone().or_else(|| self.range.clone()),
            required: refinement.required.or(self.required),
            multivalued: refinement.multivalued.or(self.multivalued),
            identifier: refinement.identifier.or(self.identifier),
            inlined: refinement.inlined.or(self.inlined),
            pattern: refinement.pattern.clone().or_else(|| self.pattern.clone()),
            minimum_value: refinement
                .minimum_value
                .clone()
                .or_else(|| self.minimum_value.clone()),
            maximum_value: refinement
                .maximum_value
                .clone()
                .or_else(|| self.maximum_value.clone()),
            any_of: if refinement.any_of.is_empty() {
                self.any_of.clone()
            } else {
                refinement.any_of.clone()
            },
            exactly_one_of: if refinement.exactly_one_of.is_empty() {
                self.exactly_one_of.clone()
            } else {
                refinement.exactly_one_of.clone()
            },
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_multivalued(&self) -> bool {
        self.multivalued.unwrap_or(false)
    }
}

/// Metadata for one permissible enum value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissibleValue {
    #[serde(default)]
    pub description: Option<String>,
}

/// An enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub permissible_values: BTreeMap<String, PermissibleValue>,
}

impl EnumDefinition {
    /// Permissible literal values, sorted.
    pub fn values(&self) -> Vec<&str> {
        self.permissible_values.keys().map(String::as_str).collect()
    }

    pub fn permits(&self, literal: &str) -> bool {
        self.permissible_values.contains_key(literal)
    }
}
