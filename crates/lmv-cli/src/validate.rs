//! # Validate Command
//!
//! Loads the schema, builds the requested plugins, validates every record of
//! every input file and writes all reports as one pretty-printed JSON array.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lmv_core::ValidationReport;
use lmv_validator::{ProcessOptions, Validator};

use crate::config::{CliConfig, Settings};

/// Arguments for a validation run.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Files to validate (JSON, or YAML with a .yaml/.yml extension).
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// The metadata schema in YAML.
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Write reports to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// The class every object of a flat input array is an instance of.
    #[arg(short, long, value_name = "NAME")]
    pub target_class: Option<String>,

    /// Plugins to run, by name.
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    pub plugins: Vec<String>,

    /// Stop running plugins on an object after the first invalid result.
    #[arg(long)]
    pub strict: bool,

    /// Replace each validated object in the report with a placeholder.
    #[arg(long)]
    pub exclude_object: bool,

    /// Cap each message at this many characters.
    #[arg(long, value_name = "N")]
    pub truncate: Option<usize>,

    /// YAML file with defaults for any of the options above.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Execute a validation run.
///
/// Returns exit code: 0 when every object is valid, 1 when any is invalid.
/// Operational and configuration errors are returned as `Err`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let settings = Settings::merge(args, config)?;

    let validator = Validator::from_schema_path(&settings.schema, &settings.plugins)
        .with_context(|| format!("failed to set up validator for {}", settings.schema.display()))?;
    tracing::info!(
        schema = validator.schema().name(),
        plugins = validator.plugins().len(),
        "validator ready"
    );

    let options = ProcessOptions {
        target_class: settings.target_class.clone(),
        truncate: settings.truncate,
        exclude_object: settings.exclude_object,
        ..Default::default()
    };

    let mut reports: Vec<ValidationReport> = Vec::new();
    for input in &args.inputs {
        let batch = validator
            .validate_file_with_options(input, &options, settings.strict)
            .with_context(|| format!("failed to validate {}", input.display()))?;
        for report in batch {
            reports.push(report.with_context(|| format!("failed to validate {}", input.display()))?);
        }
    }

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    tracing::info!(reports = reports.len(), invalid, "validation complete");

    let rendered = serde_json::to_string_pretty(&reports).context("failed to serialize reports")?;
    match &args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(if invalid == 0 { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::path::Path;

    const SCHEMA: &str = r#"
name: people
classes:
  Person:
    slots: [id, age]
slots:
  id:
    identifier: true
  age:
    range: integer
"#;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.path(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn args(&self, inputs: Vec<PathBuf>) -> ValidateArgs {
            ValidateArgs {
                inputs,
                schema: Some(self.path("schema.yaml")),
                output: Some(self.path("out.json")),
                ..Default::default()
            }
        }
    }

    fn read_reports(path: &Path) -> Vec<Value> {
        let content = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn test_all_valid_exits_zero() {
        let fx = Fixture::new();
        let input = fx.write("people.json", r#"{"Person": [{"id": "P:1", "age": 3}]}"#);
        let args = fx.args(vec![input]);
        assert_eq!(run_validate(&args).unwrap(), 0);

        let reports = read_reports(&fx.path("out.json"));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["type"], "Person");
        assert_eq!(reports[0]["valid"], true);
    }

    #[test]
    fn test_invalid_exits_one_and_collects_all_inputs() {
        let fx = Fixture::new();
        let first = fx.write("a.json", r#"[{"id": "P:1"}]"#);
        let second = fx.write("b.yaml", "- id: P:2\n  age: old\n");
        let args = ValidateArgs {
            target_class: Some("Person".into()),
            ..fx.args(vec![first, second])
        };
        assert_eq!(run_validate(&args).unwrap(), 1);

        let reports = read_reports(&fx.path("out.json"));
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["valid"], true);
        assert_eq!(reports[1]["valid"], false);
    }

    #[test]
    fn test_untyped_flat_input_is_error() {
        let fx = Fixture::new();
        let input = fx.write("a.json", r#"[{"id": "P:1"}]"#);
        let err = run_validate(&fx.args(vec![input])).unwrap_err();
        assert!(format!("{err:#}").contains("target_class not defined"));
    }

    #[test]
    fn test_config_file_supplies_schema_and_options() {
        let fx = Fixture::new();
        let config = fx.write(
            "config.yaml",
            &format!(
                "schema: {}\nexclude_object: true\nplugins:\n  - name: RangeValidationPlugin\n",
                fx.path("schema.yaml").display()
            ),
        );
        let input = fx.write("people.json", r#"{"Person": [{"id": "P:1", "age": "x"}]}"#);
        let args = ValidateArgs {
            schema: None,
            config: Some(config),
            ..fx.args(vec![input])
        };
        assert_eq!(run_validate(&args).unwrap(), 1);

        let reports = read_reports(&fx.path("out.json"));
        assert_eq!(reports[0]["object"], "<OMITTED>");
        assert_eq!(
            reports[0]["validation_results"][0]["plugin_name"],
            "RangeValidationPlugin"
        );
    }

    #[test]
    fn test_unknown_plugin_is_error() {
        let fx = Fixture::new();
        let input = fx.write("people.json", r#"{"Person": []}"#);
        let args = ValidateArgs {
            plugins: vec!["NoSuchPlugin".into()],
            ..fx.args(vec![input])
        };
        let err = run_validate(&args).unwrap_err();
        assert!(format!("{err:#}").contains("unknown validation plugin 'NoSuchPlugin'"));
    }
}
