//! Structural validation of a finished calculator
//!
//! Every problem is reported; validation never stops at the first one.

use crate::types::{Calculator, CellKind, ValidationReport};
use std::collections::HashMap;

/// Check a calculator for structural problems
///
/// Cells are numbered from 1 in the messages.
///
/// # Example
/// ```
/// use royalbit_tabcalc::core::validate;
/// use royalbit_tabcalc::types::Calculator;
///
/// let report = validate(&Calculator::default());
/// assert!(!report.valid);
/// assert_eq!(report.errors, vec!["Calculator must contain at least one cell"]);
/// ```
pub fn validate(calculator: &Calculator) -> ValidationReport {
    let mut errors = Vec::new();

    if calculator.cells.is_empty() {
        errors.push("Calculator must contain at least one cell".to_string());
    }

    let mut first_use: HashMap<&str, usize> = HashMap::new();

    for (idx, cell) in calculator.cells.iter().enumerate() {
        let pos = idx + 1;
        let id = cell.id.trim();

        let name = if id.is_empty() {
            errors.push(format!("Cell #{}: missing id", pos));
            format!("Cell #{}", pos)
        } else {
            if let Some(first) = first_use.get(id) {
                errors.push(format!(
                    "Cell #{} ({}): duplicate id, first used by cell #{}",
                    pos, id, first
                ));
            } else {
                first_use.insert(id, pos);
            }
            format!("Cell #{} ({})", pos, id)
        };

        if cell.label.trim().is_empty() {
            errors.push(format!("{}: missing label", name));
        }

        match &cell.kind {
            CellKind::Input => {
                if !cell.value.is_some_and(f64::is_finite) {
                    errors.push(format!("{}: input cell requires a finite value", name));
                }
            }
            CellKind::Formula => {
                let has_expression = cell
                    .expression
                    .as_deref()
                    .is_some_and(|e| !e.trim().is_empty());
                if !has_expression {
                    errors.push(format!("{}: formula cell requires an expression", name));
                }
            }
            CellKind::Unknown(kind) => {
                errors.push(format!("{}: unknown kind '{}'", name, kind));
            }
        }
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use pretty_assertions::assert_eq;

    fn calculator(cells: Vec<Cell>) -> Calculator {
        Calculator {
            cells,
            ..Calculator::default()
        }
    }

    fn input(id: &str) -> Cell {
        Cell::input(id.into(), id.to_uppercase(), 1.0, String::new(), 1.0)
    }

    fn formula(id: &str, expression: &str) -> Cell {
        Cell::formula(id.into(), id.to_uppercase(), expression.into(), String::new(), 2)
    }

    #[test]
    fn test_valid_calculator() {
        let report = validate(&calculator(vec![input("a"), formula("b", "a * 2")]));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_calculator() {
        let report = validate(&Calculator::default());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("must contain at least one cell"));
    }

    #[test]
    fn test_duplicate_ids_reported_once_per_repeat() {
        let report = validate(&calculator(vec![input("a"), input("b"), input("a"), input("a")]));
        assert_eq!(
            report.errors,
            vec![
                "Cell #3 (a): duplicate id, first used by cell #1",
                "Cell #4 (a): duplicate id, first used by cell #1",
            ]
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let mut no_id = input("");
        no_id.label = String::new();
        let mut no_value = input("v");
        no_value.value = None;
        let no_expression = formula("f", "  ");
        let mut odd = input("o");
        odd.kind = CellKind::Unknown("slider".into());

        let report = validate(&calculator(vec![no_id, no_value, no_expression, odd]));

        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Cell #1: missing id",
                "Cell #1: missing label",
                "Cell #2 (v): input cell requires a finite value",
                "Cell #3 (f): formula cell requires an expression",
                "Cell #4 (o): unknown kind 'slider'",
            ]
        );
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut cell = input("x");
        cell.value = Some(f64::NAN);
        let report = validate(&calculator(vec![cell]));
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let calc = calculator(vec![input("a"), input("a"), formula("", "")]);
        assert_eq!(validate(&calc), validate(&calc));
    }
}
