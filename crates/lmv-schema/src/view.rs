//! # Schema View
//!
//! Read-only introspection over a loaded [`SchemaDefinition`].
//!
//! Data files name classes and fields in whatever convention their producer
//! used (`Person`, `first_name`, `firstName`), while the schema may declare
//! them differently (`first name`). Every lookup here first tries the exact
//! name and then a normalised sentence-case key, so callers never need to
//! know which convention the schema author picked.
//!
//! ## Inheritance
//!
//! [`SchemaView::class_ancestors`] returns the class itself, then its `is_a`
//! chain, then its mixins (depth first, de-duplicated, cycle-safe). Slot
//! overrides are resolved nearest-first along that order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lmv_core::naming;

use crate::error::SchemaError;
use crate::model::{ClassDefinition, EnumDefinition, SchemaDefinition, SlotDefinition};

/// Normalised lookup key shared by classes, slots and enums.
fn lookup_key(name: &str) -> String {
    naming::camelcase_to_sentencecase(name)
}

fn index_keys<'a>(names: impl Iterator<Item = &'a String>) -> HashMap<String, String> {
    let mut keys = HashMap::new();
    for name in names {
        // The first declaration wins when two names normalise to one key.
        keys.entry(lookup_key(name)).or_insert_with(|| name.clone());
    }
    keys
}

/// Introspection view over a schema.
#[derive(Debug, Clone)]
pub struct SchemaView {
    schema: SchemaDefinition,
    source_name: String,
    class_keys: HashMap<String, String>,
    slot_keys: HashMap<String, String>,
    enum_keys: HashMap<String, String>,
}

impl SchemaView {
    /// Build a view over an already parsed schema.
    pub fn new(schema: SchemaDefinition) -> Self {
        Self::with_source(schema, "<inline>")
    }

    fn with_source(schema: SchemaDefinition, source_name: impl Into<String>) -> Self {
        let schema = schema.normalize();
        let class_keys = index_keys(schema.classes.keys());
        let slot_keys = index_keys(schema.slots.keys());
        let enum_keys = index_keys(schema.enums.keys());
        Self {
            schema,
            source_name: source_name.into(),
            class_keys,
            slot_keys,
            enum_keys,
        }
    }

    /// Parse a schema from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] if the text is not a valid schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        Self::parse(yaml, "<inline>")
    }

    /// Load a schema from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the file cannot be read and
    /// [`SchemaError::Parse`] if it is not a valid schema.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let view = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(
            schema = view.name(),
            classes = view.schema.classes.len(),
            slots = view.schema.slots.len(),
            enums = view.schema.enums.len(),
            "loaded schema"
        );
        Ok(view)
    }

    fn parse(yaml: &str, source_name: &str) -> Result<Self, SchemaError> {
        let schema: SchemaDefinition =
            serde_yaml::from_str(yaml).map_err(|e| SchemaError::Parse {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_source(schema, source_name))
    }

    /// The underlying schema definition.
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Display name of the schema.
    pub fn name(&self) -> &str {
        self.schema.display_name()
    }

    /// Where the schema was loaded from (`<inline>` for strings).
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn default_range(&self) -> Option<&str> {
        self.schema.default_range.as_deref()
    }

    pub fn all_classes(&self) -> &BTreeMap<String, ClassDefinition> {
        &self.schema.classes
    }

    pub fn all_slots(&self) -> &BTreeMap<String, SlotDefinition> {
        &self.schema.slots
    }

    pub fn all_enums(&self) -> &BTreeMap<String, EnumDefinition> {
        &self.schema.enums
    }

    /// Look up a class by exact or normalised name.
    pub fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.schema.classes.get(name).or_else(|| {
            self.class_keys
                .get(&lookup_key(name))
                .and_then(|canonical| self.schema.classes.get(canonical))
        })
    }

    /// Look up a globally declared slot by exact or normalised name.
    pub fn get_slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.schema.slots.get(name).or_else(|| {
            self.slot_keys
                .get(&lookup_key(name))
                .and_then(|canonical| self.schema.slots.get(canonical))
        })
    }

    /// Look up an enum by exact or normalised name.
    pub fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.schema.enums.get(name).or_else(|| {
            self.enum_keys
                .get(&lookup_key(name))
                .and_then(|canonical| self.schema.enums.get(canonical))
        })
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.get_enum(name).is_some()
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.get_class(name).is_some()
    }

    /// The class, then its `is_a` chain, then its mixins.
    ///
    /// Unknown parents are skipped; a cycle in `is_a` terminates the walk.
    pub fn class_ancestors(&self, name: &str) -> Vec<&ClassDefinition> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        if let Some(class) = self.get_class(name) {
            self.collect_ancestors(class, &mut seen, &mut ordered);
        }
        ordered
    }

    fn collect_ancestors<'a>(
        &'a self,
        class: &'a ClassDefinition,
        seen: &mut HashSet<&'a str>,
        ordered: &mut Vec<&'a ClassDefinition>,
    ) {
        if !seen.insert(class.name.as_str()) {
            return;
        }
        ordered.push(class);
        if let Some(parent) = class.is_a.as_deref().and_then(|p| self.get_class(p)) {
            self.collect_ancestors(parent, seen, ordered);
        }
        for mixin in &class.mixins {
            if let Some(mixin) = self.get_class(mixin) {
                self.collect_ancestors(mixin, seen, ordered);
            }
        }
    }

    /// Induced slot names of a class, most distant ancestor first.
    pub fn class_slot_names(&self, class_name: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        for class in self.class_ancestors(class_name).into_iter().rev() {
            for name in class.slots.iter().chain(class.attributes.keys()) {
                if seen.insert(lookup_key(name)) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// The nearest class-scoped definition of `slot_name` for `class_name`:
    /// the class's own `slot_usage`, then its `attributes`, then the same for
    /// each ancestor in [`class_ancestors`](Self::class_ancestors) order.
    pub fn slot_usage_for(&self, class_name: &str, slot_name: &str) -> Option<&SlotDefinition> {
        let key = lookup_key(slot_name);
        self.class_ancestors(class_name).into_iter().find_map(|class| {
            find_by_key(&class.slot_usage, slot_name, &key)
                .or_else(|| find_by_key(&class.attributes, slot_name, &key))
        })
    }

    /// The fully resolved definition of `slot_name` as seen from `class_name`:
    /// the global slot (or nearest attribute) with every ancestor's
    /// `slot_usage` applied, most distant first, the class's own last.
    pub fn induced_slot(&self, slot_name: &str, class_name: &str) -> Option<SlotDefinition> {
        let key = lookup_key(slot_name);
        let ancestors = self.class_ancestors(class_name);

        let mut base = self.get_slot(slot_name).cloned().or_else(|| {
            ancestors
                .iter()
                .find_map(|c| find_by_key(&c.attributes, slot_name, &key))
                .cloned()
        });

        for class in ancestors.iter().rev() {
            if let Some(usage) = find_by_key(&class.slot_usage, slot_name, &key) {
                let current = base.take().unwrap_or_else(|| SlotDefinition {
                    name: slot_name.to_string(),
                    ..Default::default()
                });
                base = Some(current.refined_by(usage));
            }
        }
        base
    }
}

fn find_by_key<'a>(
    map: &'a BTreeMap<String, SlotDefinition>,
    name: &str,
    key: &str,
) -> Option<&'a SlotDefinition> {
    map.get(name)
        .or_else(|| map.iter().find(|(k, _)| lookup_key(k) == key).map(|(_, v)| v))
}
