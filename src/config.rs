//! Import configuration
//!
//! Loaded from an optional YAML file and overridden by CLI flags.
//!
//! ```yaml
//! name: Tank sizing
//! description: Cylindrical tank volume
//! translation: structured
//! default_decimals: 3
//! ```

use crate::error::{TabcalcError, TabcalcResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How formulas are rewritten into the target dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// Parse into an expression tree and print it back (default)
    #[default]
    Structured,
    /// Ordered textual substitutions with placeholder fix-up
    Textual,
}

/// Settings for one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Calculator name written to the output
    pub name: String,

    /// Calculator description written to the output
    pub description: String,

    /// Column letters addressable by coordinate references
    pub value_column: String,

    /// Label text that marks a (repeated) header row
    pub header_token: String,

    /// Step assigned to inputs that don't declare one
    pub default_step: f64,

    /// Display precision assigned to formula cells
    pub default_decimals: u32,

    pub translation: Translation,

    /// Resolve SUM range rows with `row - 1` instead of `row - 2`
    pub legacy_range_offset: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            value_column: "B".to_string(),
            header_token: "label".to_string(),
            default_step: 1.0,
            default_decimals: 2,
            translation: Translation::Structured,
            legacy_range_offset: false,
        }
    }
}

impl ImportConfig {
    /// Load a configuration file (YAML)
    pub fn from_file(path: &Path) -> TabcalcResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text and check it
    pub fn from_yaml_str(content: &str) -> TabcalcResult<Self> {
        // An empty file deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings the importer cannot work with
    pub fn check(&self) -> TabcalcResult<()> {
        if self.value_column.is_empty() || !self.value_column.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(TabcalcError::Config(format!(
                "value_column must be uppercase column letters, got '{}'",
                self.value_column
            )));
        }
        if !self.default_step.is_finite() {
            return Err(TabcalcError::Config(
                "default_step must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}
