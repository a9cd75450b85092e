//! Structural validation of calculators, built in memory or loaded from disk

use pretty_assertions::assert_eq;
use royalbit_tabcalc::core::validate;
use royalbit_tabcalc::parser::load_calculator;
use royalbit_tabcalc::types::{Calculator, Cell, CellKind};
use std::fs;
use tempfile::TempDir;

fn calculator(cells: Vec<Cell>) -> Calculator {
    Calculator {
        name: "Test".to_string(),
        description: String::new(),
        cells,
    }
}

#[test]
fn test_valid_calculator() {
    let calc = calculator(vec![
        Cell::input("a".into(), "A".into(), 1.0, String::new(), 1.0),
        Cell::formula("b".into(), "B".into(), "a * 2".into(), String::new(), 2),
    ]);

    let report = validate(&calc);
    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test]
fn test_empty_calculator_has_exactly_one_error() {
    let report = validate(&calculator(Vec::new()));
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Calculator must contain at least one cell"]);
}

#[test]
fn test_all_violations_reported() {
    let calc = calculator(vec![
        Cell::input("a".into(), "A".into(), 1.0, String::new(), 1.0),
        Cell::input("a".into(), String::new(), 2.0, String::new(), 1.0),
        Cell {
            id: "f".into(),
            label: "F".into(),
            kind: CellKind::Formula,
            ..Cell::default()
        },
        Cell {
            label: "Orphan".into(),
            kind: CellKind::Input,
            ..Cell::default()
        },
    ]);

    let report = validate(&calc);

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![
            "Cell #2 (a): duplicate id, first used by cell #1",
            "Cell #2 (a): missing label",
            "Cell #3 (f): formula cell requires an expression",
            "Cell #4: missing id",
            "Cell #4: input cell requires a finite value",
        ]
    );
}

#[test]
fn test_validation_is_idempotent() {
    let calc = calculator(vec![
        Cell::input("a".into(), "A".into(), 1.0, String::new(), 1.0),
        Cell::input("a".into(), "A".into(), 1.0, String::new(), 1.0),
        Cell::default(),
    ]);

    let first = validate(&calc);
    let second = validate(&calc);
    assert_eq!(first, second);
}

#[test]
fn test_report_serializes_as_valid_and_errors() {
    let report = validate(&calculator(Vec::new()));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "valid": false,
            "errors": ["Calculator must contain at least one cell"]
        })
    );
}

#[test]
fn test_loaded_document_with_unknown_kind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calc.yaml");
    fs::write(
        &path,
        r#"
name: External
cells:
  - id: speed
    label: Speed
    kind: slider
    value: 3
  - id: time
    label: Time
    kind: input
"#,
    )
    .unwrap();

    let calc = load_calculator(&path).unwrap();
    let report = validate(&calc);

    assert_eq!(
        report.errors,
        vec![
            "Cell #1 (speed): unknown kind 'slider'",
            "Cell #2 (time): input cell requires a finite value",
        ]
    );
}

#[test]
fn test_loaded_document_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calc.json");
    fs::write(&path, r#"{"cells": [{"kind": "formula", "expression": "1 + 1"}]}"#).unwrap();

    let report = validate(&load_calculator(&path).unwrap());

    assert_eq!(
        report.errors,
        vec!["Cell #1: missing id", "Cell #1: missing label"]
    );
}
