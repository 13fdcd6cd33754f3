//! # Validation Reports
//!
//! The shared data model that every plugin produces and the validator
//! aggregates:
//!
//! - [`ValidationMessage`]: one finding about one field (or the whole object).
//! - [`ValidationResult`]: everything one plugin found about one object.
//! - [`ValidationReport`]: every plugin result for one object and target class.
//!
//! All three are immutable value objects once built. Results and reports
//! keep their fields private so `valid` always agrees with the contents;
//! deserialization goes through the same constructors. Serialized field
//! names are part of the external report format and must not change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder stored in [`ValidationReport::object`] when the caller asks for
/// the payload to be redacted.
pub const OMITTED_OBJECT_PLACEHOLDER: &str = "<OMITTED>";

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The object does not conform; the owning result is invalid.
    Error,
    /// Suspicious but conformant.
    Warn,
    /// Informational only.
    Info,
}

/// A single warning or error reported during validation.
///
/// Build through [`ValidationMessage::error`] and the builder methods; only
/// [`with_value`](Self::with_value) drops object values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// How serious the finding is.
    pub severity: Severity,
    /// Dotted path of the offending field, or `None` when the finding
    /// applies to the whole object.
    pub field: Option<String>,
    /// The offending value. Never a JSON object: nested records are left out
    /// so reports do not duplicate whole sub-trees.
    pub value: Option<Value>,
    /// Human-readable description.
    pub message: String,
}

impl ValidationMessage {
    /// Create an Error-severity message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    /// Create a message with an explicit severity.
    pub fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: None,
            value: None,
            message: message.into(),
        }
    }

    /// Attach the offending field path.
    pub fn at_field(mut self, field: Option<String>) -> Self {
        self.field = field;
        self
    }

    /// Attach the offending value. JSON objects are dropped.
    pub fn with_value(mut self, value: Option<Value>) -> Self {
        self.value = value.filter(|v| !v.is_object());
        self
    }

    /// Cap the message text at `limit` characters.
    pub fn truncated(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            if let Some((idx, _)) = self.message.char_indices().nth(limit) {
                self.message.truncate(idx);
            }
        }
        self
    }

    /// Whether this message makes its result invalid.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// The outcome of one plugin validating one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResultRecord")]
pub struct ValidationResult {
    plugin_name: String,
    /// `false` whenever `validation_messages` holds an Error.
    valid: bool,
    validation_messages: Vec<ValidationMessage>,
}

#[derive(Deserialize)]
struct ResultRecord {
    plugin_name: String,
    valid: bool,
    validation_messages: Vec<ValidationMessage>,
}

impl From<ResultRecord> for ValidationResult {
    fn from(record: ResultRecord) -> Self {
        Self::new(record.plugin_name, record.valid, record.validation_messages)
    }
}

impl ValidationResult {
    /// Build a result with an explicit validity verdict.
    ///
    /// The verdict is AND-ed with "no Error message", so a plugin may report
    /// itself invalid without messages but can never be valid while
    /// carrying an Error.
    pub fn new(
        plugin_name: impl Into<String>,
        valid: bool,
        validation_messages: Vec<ValidationMessage>,
    ) -> Self {
        let has_error = validation_messages.iter().any(ValidationMessage::is_error);
        Self {
            plugin_name: plugin_name.into(),
            valid: valid && !has_error,
            validation_messages,
        }
    }

    /// Build a result whose validity is derived from its messages alone.
    pub fn from_messages(
        plugin_name: impl Into<String>,
        validation_messages: Vec<ValidationMessage>,
    ) -> Self {
        Self::new(plugin_name, true, validation_messages)
    }

    /// Name of the plugin that produced this result.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Findings in discovery order.
    pub fn validation_messages(&self) -> &[ValidationMessage] {
        &self.validation_messages
    }

    /// Number of Error-severity messages.
    pub fn error_count(&self) -> usize {
        self.validation_messages
            .iter()
            .filter(|m| m.is_error())
            .count()
    }
}

/// The validated payload as it appears in a report: either the original
/// object or the redaction placeholder. Redaction is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ReportObject {
    /// The original payload.
    Payload(Value),
    /// The payload was withheld at the caller's request.
    Omitted,
}

impl ReportObject {
    /// The payload, if it was not redacted.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(v) => Some(v),
            Self::Omitted => None,
        }
    }

    /// Whether the payload was redacted.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }
}

impl From<Value> for ReportObject {
    fn from(value: Value) -> Self {
        match value {
            Value::String(ref s) if s == OMITTED_OBJECT_PLACEHOLDER => Self::Omitted,
            other => Self::Payload(other),
        }
    }
}

impl From<ReportObject> for Value {
    fn from(object: ReportObject) -> Self {
        match object {
            ReportObject::Payload(v) => v,
            ReportObject::Omitted => Value::String(OMITTED_OBJECT_PLACEHOLDER.to_string()),
        }
    }
}

/// Every plugin result for one object validated as one target class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReportRecord")]
pub struct ValidationReport {
    object: ReportObject,
    #[serde(rename = "type")]
    type_name: String,
    /// AND of every result's `valid`.
    valid: bool,
    validation_results: Vec<ValidationResult>,
}

/// Incoming `valid` is ignored and recomputed.
#[derive(Deserialize)]
struct ReportRecord {
    object: ReportObject,
    #[serde(rename = "type")]
    type_name: String,
    validation_results: Vec<ValidationResult>,
}

impl From<ReportRecord> for ValidationReport {
    fn from(record: ReportRecord) -> Self {
        Self::new(record.object, record.type_name, record.validation_results)
    }
}

impl ValidationReport {
    /// Aggregate plugin results into a report. `valid` is always recomputed.
    pub fn new(
        object: ReportObject,
        type_name: impl Into<String>,
        validation_results: Vec<ValidationResult>,
    ) -> Self {
        let valid = validation_results.iter().all(|r| r.valid);
        Self {
            object,
            type_name: type_name.into(),
            valid,
            validation_results,
        }
    }

    /// The validated object, or the redaction placeholder.
    pub fn object(&self) -> &ReportObject {
        &self.object
    }

    /// Name of the target class.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// One entry per plugin that ran (fewer than registered under strict mode).
    pub fn validation_results(&self) -> &[ValidationResult] {
        &self.validation_results
    }

    /// All messages across all results, in result order.
    pub fn messages(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.validation_results
            .iter()
            .flat_map(|r| r.validation_messages.iter())
    }
}
