//! # Shape Errors & Flattening
//!
//! JSON Schema validation yields a tree: a union (`anyOf`/`oneOf`) failure
//! carries one sub-error per failed alternative. Reports are flat, so the
//! tree is flattened into [`ValidationMessage`]s.
//!
//! ## Ordering
//!
//! For each top-level error, in discovery order:
//!
//! 1. its sub-errors, sorted by schema path (indices before keys, indices
//!    numerically, keys lexicographically; stable), one message each;
//! 2. the top-level error's own message.
//!
//! A sub-error with an empty instance path inherits the parent's field.

use lmv_core::ValidationMessage;
use serde_json::Value;

/// One step of an instance or schema path.
///
/// The derived ordering puts every `Index` before every `Key`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// A schema-shape violation, possibly with nested sub-errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeError {
    pub message: String,
    /// Location of the offending value in the validated object.
    pub instance_path: Vec<PathSegment>,
    /// Location of the failing keyword. For sub-errors this starts with the
    /// index of the alternative that produced it.
    pub schema_path: Vec<PathSegment>,
    /// The offending value.
    pub instance: Value,
    /// Sub-errors of a union keyword, one level deep.
    pub context: Vec<ShapeError>,
}

/// Dotted form of an instance path, `None` when the path is empty.
pub fn join_path(path: &[PathSegment]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    Some(
        path.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("."),
    )
}

/// Flatten shape errors into report messages.
pub fn flatten(errors: &[ShapeError], truncate: Option<usize>) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();
    for error in errors {
        let outer_field = join_path(&error.instance_path);

        let mut context: Vec<&ShapeError> = error.context.iter().collect();
        context.sort_by(|a, b| a.schema_path.cmp(&b.schema_path));
        for sub in context {
            let field = join_path(&sub.instance_path).or_else(|| outer_field.clone());
            tracing::trace!(field = field.as_deref(), message = %sub.message, "flattened sub-error");
            messages.push(to_message(sub, field, truncate));
        }

        tracing::trace!(field = outer_field.as_deref(), message = %error.message, "flattened error");
        messages.push(to_message(error, outer_field, truncate));
    }
    messages
}

fn to_message(error: &ShapeError, field: Option<String>, truncate: Option<usize>) -> ValidationMessage {
    ValidationMessage::error(error.message.clone())
        .at_field(field)
        .with_value(Some(error.instance.clone()))
        .truncated(truncate)
}

/// Reference tokens of a JSON pointer, unescaped.
pub(crate) fn pointer_tokens(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Parse an instance pointer, using `root` to tell array indices from
/// object keys that happen to be numeric.
pub(crate) fn instance_path_segments(pointer: &str, root: &Value) -> Vec<PathSegment> {
    let mut current = Some(root);
    let mut segments = Vec::new();
    for token in pointer_tokens(pointer) {
        let segment = match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(index) => {
                    current = items.get(index);
                    PathSegment::Index(index)
                }
                Err(_) => {
                    current = None;
                    PathSegment::Key(token)
                }
            },
            Some(Value::Object(map)) => {
                current = map.get(&token);
                PathSegment::Key(token)
            }
            _ => {
                current = None;
                PathSegment::Key(token)
            }
        };
        segments.push(segment);
    }
    segments
}

/// Parse a schema pointer. Numeric tokens are alternative or item indices.
pub(crate) fn schema_path_segments(pointer: &str) -> Vec<PathSegment> {
    pointer_tokens(pointer)
        .into_iter()
        .map(|token| match token.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(token),
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn segment() -> impl Strategy<Value = PathSegment> {
        prop_oneof![
            (0usize..20).prop_map(PathSegment::Index),
            "[a-z]{1,6}".prop_map(PathSegment::Key),
        ]
    }

    proptest! {
        /// Every index orders before every key.
        #[test]
        fn index_orders_before_key(i in 0usize..1000, k in "[a-z0-9]{0,8}") {
            prop_assert!(PathSegment::Index(i) < PathSegment::Key(k));
        }

        /// Sub-error messages come out sorted by schema path, then the outer
        /// message, all on the outer field.
        #[test]
        fn flatten_orders_sub_errors_by_schema_path(
            paths in prop::collection::vec(prop::collection::vec(segment(), 0..4), 0..6)
        ) {
            let context: Vec<ShapeError> = paths
                .iter()
                .map(|p| ShapeError {
                    message: format!("{p:?}"),
                    instance_path: Vec::new(),
                    schema_path: p.clone(),
                    instance: json!(1),
                    context: Vec::new(),
                })
                .collect();
            let outer = ShapeError {
                message: "outer".into(),
                instance_path: vec![PathSegment::Key("f".into())],
                schema_path: vec![PathSegment::Key("anyOf".into())],
                instance: json!(1),
                context,
            };

            let mut sorted = paths.clone();
            sorted.sort();
            let mut expected: Vec<String> = sorted.iter().map(|p| format!("{p:?}")).collect();
            expected.push("outer".into());

            let messages = flatten(&[outer], None);
            let texts: Vec<String> = messages.iter().map(|m| m.message.clone()).collect();
            prop_assert_eq!(texts, expected);
            prop_assert!(messages.iter().all(|m| m.field.as_deref() == Some("f")));
        }
    }
}
