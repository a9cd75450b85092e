//! Graph builder: table rows → ordered calculator cells
//!
//! Identifiers come from the row labels. In structured mode every identifier
//! is assigned before any formula is translated, so forward references
//! resolve directly. In textual mode identifiers are assigned row by row and
//! range sums carry placeholder tokens until the fix-up pass.

use crate::config::{ImportConfig, Translation};
use crate::core::resolver::KnownIds;
use crate::core::translator::textual::PLACEHOLDER_PATTERN;
use crate::core::translator::FormulaTranslator;
use crate::error::{TabcalcError, TabcalcResult};
use crate::parser::{parse_number, parse_table, rows_from_records, slugify, Row};
use crate::types::{Calculator, Cell, ImportReport, ImportWarning};
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

/// Builds calculators from table rows
///
/// Holds only immutable state, so one importer can run any number of
/// imports concurrently.
#[derive(Debug, Clone)]
pub struct Importer {
    config: ImportConfig,
    translator: FormulaTranslator,
    placeholder: Regex,
}

impl Importer {
    pub fn new(config: ImportConfig) -> TabcalcResult<Self> {
        config.check()?;
        let translator = FormulaTranslator::new(&config)?;
        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| TabcalcError::Config(format!("Regex error: {}", e)))?;

        Ok(Self {
            config,
            translator,
            placeholder,
        })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import tab-separated text (header row first)
    pub fn import_text(&self, text: &str) -> ImportReport {
        self.import_rows(&parse_table(text, &self.config.header_token))
    }

    /// Import records already split into fields by a table source
    pub fn import_records(&self, records: &[Vec<String>]) -> ImportReport {
        self.import_rows(&rows_from_records(records, &self.config.header_token))
    }

    /// Import normalized rows
    pub fn import_rows(&self, rows: &[Row]) -> ImportReport {
        let mut warnings = Warnings::default();
        let mut known = KnownIds::new();
        known.reserve_rows(rows.last().map_or(0, |row| row.index() + 1));
        let ids: Vec<String> = rows
            .iter()
            .map(|row| {
                let id = slugify(&row.label);
                if id.is_empty() {
                    warnings.push(row.number, format!("label '{}' yields an empty identifier", row.label));
                }
                id
            })
            .collect();

        // Arena pass: every identifier is known before any formula is read
        if self.translator.mode() == Translation::Structured {
            for (row, id) in rows.iter().zip(&ids) {
                known.assign(row.index(), id.clone());
            }
        }

        let mut calculator = Calculator::new(&self.config.name, &self.config.description);
        // Row number of each produced cell, for fix-up warnings
        let mut cell_rows = Vec::new();

        for (row, id) in rows.iter().zip(ids) {
            if self.translator.mode() == Translation::Textual {
                known.assign(row.index(), id.clone());
            }

            let Some(cell) = self.build_cell(row, id, &known, &mut warnings) else {
                continue;
            };
            cell_rows.push(row.number);
            calculator.cells.push(cell);
        }

        self.fix_up_placeholders(&mut calculator, &cell_rows, &known, &mut warnings);

        info!(
            cells = calculator.cells.len(),
            inputs = calculator.inputs().count(),
            formulas = calculator.formulas().count(),
            warnings = warnings.0.len(),
            "Imported calculator"
        );

        ImportReport {
            calculator,
            warnings: warnings.0,
        }
    }

    /// Classify one row: formula, numeric input, or nothing
    fn build_cell(
        &self,
        row: &Row,
        id: String,
        known: &KnownIds,
        warnings: &mut Warnings,
    ) -> Option<Cell> {
        if row.is_formula() {
            let mut messages = Vec::new();
            let expression = self.translator.translate(&row.value, known, &mut messages);
            warnings.extend(row.number, messages);
            debug!(row = row.number, id = %id, expression = %expression, "Formula cell");

            return Some(Cell::formula(
                id,
                row.label.clone(),
                expression,
                row.unit.clone(),
                self.config.default_decimals,
            ));
        }

        match parse_number(&row.value) {
            Some(value) => {
                debug!(row = row.number, id = %id, value, "Input cell");
                let step = row.step.unwrap_or(self.config.default_step);
                Some(
                    Cell::input(id, row.label.clone(), value, row.unit.clone(), step)
                        .with_bounds(row.min, row.max),
                )
            }
            None => {
                debug!(
                    row = row.number,
                    value = %row.value,
                    "Value is neither a formula nor a number, row skipped"
                );
                None
            }
        }
    }

    /// Replace `__row_N__` placeholders with the final identifiers
    fn fix_up_placeholders(
        &self,
        calculator: &mut Calculator,
        cell_rows: &[usize],
        known: &KnownIds,
        warnings: &mut Warnings,
    ) {
        for (cell, &row) in calculator.cells.iter_mut().zip(cell_rows) {
            let Some(expression) = cell.expression.as_mut() else {
                continue;
            };
            if !self.placeholder.is_match(expression) {
                continue;
            }

            let mut messages = Vec::new();
            let fixed = self
                .placeholder
                .replace_all(expression, |caps: &Captures| {
                    let id = caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| known.get(index))
                        .flatten();
                    match id {
                        Some(id) => id.to_string(),
                        None => {
                            messages.push(format!(
                                "range row {} has no cell; placeholder left untranslated",
                                &caps[1]
                            ));
                            caps[0].to_string()
                        }
                    }
                })
                .into_owned();

            *expression = fixed;
            warnings.extend(row, messages);
        }
    }
}

/// Collected warnings, logged as they arrive
#[derive(Default)]
struct Warnings(Vec<ImportWarning>);

impl Warnings {
    fn push(&mut self, row: usize, message: String) {
        warn!(row, "{}", message);
        self.0.push(ImportWarning { row, message });
    }

    fn extend(&mut self, row: usize, messages: Vec<String>) {
        for message in messages {
            self.push(row, message);
        }
    }
}

/// Import tab-separated text with the given configuration
///
/// # Example
/// ```
/// use royalbit_tabcalc::config::ImportConfig;
/// use royalbit_tabcalc::core::import;
///
/// let report = import("Label\tValue\tUnit\nDiamètre\t6\tm", &ImportConfig::default()).unwrap();
/// assert_eq!(report.calculator.cells[0].id, "diametre");
/// ```
pub fn import(text: &str, config: &ImportConfig) -> TabcalcResult<ImportReport> {
    Ok(Importer::new(config.clone())?.import_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import_with(text: &str, translation: Translation) -> ImportReport {
        let config = ImportConfig {
            translation,
            ..ImportConfig::default()
        };
        Importer::new(config).unwrap().import_text(text)
    }

    fn expressions(report: &ImportReport) -> Vec<&str> {
        report
            .calculator
            .formulas()
            .filter_map(|c| c.expression.as_deref())
            .collect()
    }

    #[test]
    fn test_input_row() {
        let report = import_with(
            "Label\tValue\tUnit\tMin\tMax\tStep\nDiamètre\t6\tm\t4\t10\t0.5",
            Translation::Structured,
        );
        let cells = &report.calculator.cells;

        assert_eq!(cells.len(), 1);
        assert_eq!(
            cells[0],
            Cell::input("diametre".into(), "Diamètre".into(), 6.0, "m".into(), 0.5)
                .with_bounds(Some(4.0), Some(10.0))
        );
    }

    #[test]
    fn test_default_step_and_decimals() {
        let report = import_with("h\nA\t1\nB\t=B2*2", Translation::Structured);
        let cells = &report.calculator.cells;
        assert_eq!(cells[0].step, Some(1.0));
        assert_eq!(cells[1].decimals, Some(2));
    }

    #[test]
    fn test_forward_reference_structured() {
        let report = import_with("h\nDouble\t=B3*2\nBase\t5", Translation::Structured);
        assert_eq!(expressions(&report), vec!["base * 2"]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_forward_reference_textual_warns() {
        let report = import_with("h\nDouble\t=B3*2\nBase\t5", Translation::Textual);
        assert_eq!(expressions(&report), vec!["B3*2"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 2);
    }

    #[test]
    fn test_textual_sum_fixed_up() {
        let report = import_with(
            "h\nA\t1\nB\t2\nC\t3\nTotal\t=SUM(B2:B4)",
            Translation::Textual,
        );
        assert_eq!(expressions(&report), vec!["(a + b + c)"]);
    }

    #[test]
    fn test_textual_forward_sum_resolved_by_fix_up() {
        let report = import_with("h\nTotal\t=SUM(B3:B4)\nA\t1\nB\t2", Translation::Textual);
        assert_eq!(expressions(&report), vec!["(a + b)"]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_placeholder_warns() {
        // Blank label at row 3: the range covers a row without an identifier
        let report = import_with("h\nA\t1\n\t\nB\t2\nTotal\t=SUM(B2:B4)", Translation::Textual);
        assert_eq!(expressions(&report), vec!["(a + __row_1__ + b)"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 5);
    }

    #[test]
    fn test_whole_column_sum_stops_at_last_row() {
        let text = "h\nTotal\t=SUM(B3:B1048576)\nA\t1\nB\t2\nC\t3";
        for translation in [Translation::Structured, Translation::Textual] {
            let report = import_with(text, translation);
            assert_eq!(expressions(&report), vec!["(a + b + c)"]);
            assert_eq!(report.warnings.len(), 1);
            assert_eq!(report.warnings[0].row, 2);
            assert!(report.warnings[0].message.contains("past the last table row"));
        }
    }

    #[test]
    fn test_non_numeric_value_dropped_but_addressable() {
        let report = import_with("h\nNote\tabc\nA\t1", Translation::Structured);
        let ids: Vec<_> = report.calculator.cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_skipped_rows_keep_positions() {
        // Blank line at row 3; B4 still addresses the row after it
        let report = import_with("h\nA\t1\n\nB\t=B4+B2\n", Translation::Structured);
        assert_eq!(expressions(&report), vec!["b + a"]);
    }

    #[test]
    fn test_duplicate_labels_not_deduplicated() {
        let report = import_with("h\nWidth\t1\nwidth\t2", Translation::Structured);
        let ids: Vec<_> = report.calculator.cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["width", "width"]);
    }

    #[test]
    fn test_empty_identifier_warns() {
        let report = import_with("h\n%%%\t1", Translation::Structured);
        assert_eq!(report.calculator.cells[0].id, "");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_config_metadata_applied() {
        let config = ImportConfig {
            name: "Tank".into(),
            description: "Volume".into(),
            default_decimals: 4,
            ..ImportConfig::default()
        };
        let report = import("h\nA\t1\nB\t=B2", &config).unwrap();
        assert_eq!(report.calculator.name, "Tank");
        assert_eq!(report.calculator.description, "Volume");
        assert_eq!(report.calculator.cells[1].decimals, Some(4));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ImportConfig {
            value_column: "b".into(),
            ..ImportConfig::default()
        };
        assert!(Importer::new(config).is_err());
    }
}
