//! Loading serialized calculators (JSON or YAML)
//!
//! Loading is lenient: missing fields default to empty and unknown kinds are
//! kept, so the validator can report every problem in the document.

use crate::error::TabcalcResult;
use crate::types::Calculator;
use crate::writer::DocumentFormat;
use std::fs;
use std::path::Path;

/// Load a calculator document, format chosen by extension
pub fn load_calculator(path: &Path) -> TabcalcResult<Calculator> {
    let content = fs::read_to_string(path)?;
    parse_calculator(&content, DocumentFormat::from_path(path))
}

/// Parse a calculator document from text
pub fn parse_calculator(content: &str, format: DocumentFormat) -> TabcalcResult<Calculator> {
    Ok(match format {
        DocumentFormat::Json => serde_json::from_str(content)?,
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
    })
}
