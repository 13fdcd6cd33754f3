//! # Configuration File
//!
//! Optional YAML file holding defaults for a validation run:
//!
//! ```yaml
//! schema: schema/people.yaml
//! target_class: Person
//! strict: true
//! exclude_object: false
//! truncate: 200
//! plugins:
//!   - name: JsonSchemaValidationPlugin
//!     args:
//!       not_closed: true
//!   - name: RangeValidationPlugin
//! ```
//!
//! Command-line flags take precedence over file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lmv_validator::PluginSpec;
use serde::Deserialize;

use crate::validate::ValidateArgs;

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub schema: Option<PathBuf>,
    pub target_class: Option<String>,
    pub strict: Option<bool>,
    pub exclude_object: Option<bool>,
    pub truncate: Option<usize>,
    pub plugins: Vec<PluginSpec>,
}

impl CliConfig {
    /// Read a YAML config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub schema: PathBuf,
    pub target_class: Option<String>,
    pub strict: bool,
    pub exclude_object: bool,
    pub truncate: Option<usize>,
    /// Empty means the default plugin set.
    pub plugins: Vec<PluginSpec>,
}

impl Settings {
    /// Merge command-line arguments over `config`.
    ///
    /// Plugins named with `-p` replace the config's plugin list entirely.
    ///
    /// # Errors
    ///
    /// Fails when neither source names a schema.
    pub fn merge(args: &ValidateArgs, config: CliConfig) -> Result<Self> {
        let schema = args
            .schema
            .clone()
            .or(config.schema)
            .context("no schema given: pass --schema or set `schema` in the config file")?;
        let plugins = if args.plugins.is_empty() {
            config.plugins
        } else {
            args.plugins.iter().map(|name| PluginSpec::new(name.as_str())).collect()
        };
        Ok(Self {
            schema,
            target_class: args.target_class.clone().or(config.target_class),
            strict: args.strict || config.strict.unwrap_or(false),
            exclude_object: args.exclude_object || config.exclude_object.unwrap_or(false),
            truncate: args.truncate.or(config.truncate),
            plugins,
        })
    }
}
