use serde::{Deserialize, Serialize};

//==============================================================================
// Cell Model
//==============================================================================

/// Kind of a calculator cell
///
/// Serialized as a lowercase string. Documents loaded from disk may carry any
/// other string, which is kept as `Unknown` so the validator can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellKind {
    /// Constrained numeric input (value, bounds, step)
    Input,
    /// Derived value computed from an expression
    Formula,
    /// Anything else found in an external document
    Unknown(String),
}

impl CellKind {
    /// Get the kind name as it appears in serialized documents
    pub fn as_str(&self) -> &str {
        match self {
            CellKind::Input => "input",
            CellKind::Formula => "formula",
            CellKind::Unknown(s) => s.as_str(),
        }
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Unknown(String::new())
    }
}

impl From<String> for CellKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "input" => CellKind::Input,
            "formula" => CellKind::Formula,
            _ => CellKind::Unknown(s),
        }
    }
}

impl From<CellKind> for String {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the computation graph
///
/// Kind-specific fields are optional so that documents produced elsewhere can
/// be loaded and validated as-is. Cells built by the importer always carry the
/// fields their kind requires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: CellKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl Cell {
    /// Create an input cell
    pub fn input(id: String, label: String, value: f64, unit: String, step: f64) -> Self {
        Self {
            id,
            label,
            kind: CellKind::Input,
            value: Some(value),
            step: Some(step),
            unit,
            ..Default::default()
        }
    }

    /// Create a formula cell
    pub fn formula(
        id: String,
        label: String,
        expression: String,
        unit: String,
        decimals: u32,
    ) -> Self {
        Self {
            id,
            label,
            kind: CellKind::Formula,
            expression: Some(expression),
            unit,
            decimals: Some(decimals),
            ..Default::default()
        }
    }

    /// Set optional bounds (builder style)
    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn is_input(&self) -> bool {
        self.kind == CellKind::Input
    }

    pub fn is_formula(&self) -> bool {
        self.kind == CellKind::Formula
    }
}

//==============================================================================
// Calculator
//==============================================================================

/// A complete calculator: ordered cells plus descriptive metadata
///
/// Cell order is the source row order and doubles as the addressing order
/// for coordinate references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Calculator {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Calculator {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cells: Vec::new(),
        }
    }

    /// Find a cell by identifier (first match)
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_input())
    }

    pub fn formulas(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_formula())
    }
}

//==============================================================================
// Import & Validation Results
//==============================================================================

/// A non-fatal problem found while importing a table
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWarning {
    /// Spreadsheet row number of the offending row (1-based, header = 1)
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// Result of one import call
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub calculator: Calculator,
    pub warnings: Vec<ImportWarning>,
}

/// Result of structural validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_cell_serialization_omits_formula_fields() {
        let cell = Cell::input("d".into(), "D".into(), 6.0, "m".into(), 0.5)
            .with_bounds(Some(4.0), None);
        let json = serde_json::to_value(&cell).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "d",
                "label": "D",
                "kind": "input",
                "value": 6.0,
                "min": 4.0,
                "step": 0.5,
                "unit": "m"
            })
        );
    }

    #[test]
    fn test_formula_cell_serialization() {
        let cell = Cell::formula("s".into(), "S".into(), "d * 2".into(), String::new(), 2);
        let json = serde_json::to_value(&cell).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "s",
                "label": "S",
                "kind": "formula",
                "unit": "",
                "expression": "d * 2",
                "decimals": 2
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let cell: Cell =
            serde_json::from_str(r#"{"id":"x","label":"X","kind":"slider"}"#).unwrap();
        assert_eq!(cell.kind, CellKind::Unknown("slider".to_string()));

        let back = serde_json::to_value(&cell).unwrap();
        assert_eq!(back["kind"], "slider");
    }

    #[test]
    fn test_lenient_load_of_sparse_cell() {
        let cell: Cell = serde_json::from_str("{}").unwrap();
        assert!(cell.id.is_empty());
        assert_eq!(cell.kind, CellKind::default());
        assert!(cell.value.is_none());
    }

    #[test]
    fn test_validation_report_from_errors() {
        assert!(ValidationReport::from_errors(vec![]).valid);
        assert!(!ValidationReport::from_errors(vec!["x".into()]).valid);
    }
}
