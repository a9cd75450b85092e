//! Workbook reader - Excel (.xlsx) worksheet → table records

use crate::error::{TabcalcError, TabcalcResult};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Columns read per row: label, value, unit, min, max, step
const TABLE_COLUMNS: u32 = 6;

/// Reads one worksheet into the same shape as a split TSV table
pub struct WorkbookReader {
    path: PathBuf,
    sheet: Option<String>,
}

impl WorkbookReader {
    /// Create a reader for the first worksheet of a workbook
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: None,
        }
    }

    /// Read the named worksheet instead of the first one
    #[must_use]
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// Read records, one per sheet row starting at row 1
    ///
    /// Cells holding a formula are returned as `=` + formula text so they
    /// reach the translator like pasted TSV would.
    pub fn read_records(&self) -> TabcalcResult<Vec<Vec<String>>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            TabcalcError::Source(format!(
                "Failed to open workbook {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match &self.sheet {
            Some(name) if sheet_names.contains(name) => name.clone(),
            Some(name) => {
                return Err(TabcalcError::Source(format!(
                    "Worksheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                )));
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| TabcalcError::Source("Workbook has no worksheets".to_string()))?,
        };

        let values = workbook.worksheet_range(&sheet_name).map_err(|e| {
            TabcalcError::Source(format!("Failed to read worksheet '{}': {}", sheet_name, e))
        })?;
        // Formulas are optional; a sheet of plain values has none
        let formulas = workbook.worksheet_formula(&sheet_name).ok();

        let records = collect_records(&values, formulas.as_ref());
        debug!(sheet = %sheet_name, rows = records.len(), "Read worksheet");
        Ok(records)
    }
}

/// True for paths that should be read as a workbook rather than TSV text
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
}

fn collect_records(values: &Range<Data>, formulas: Option<&Range<String>>) -> Vec<Vec<String>> {
    let last_row = [values.end(), formulas.and_then(|f| f.end())]
        .into_iter()
        .flatten()
        .map(|(row, _)| row)
        .max();
    let Some(last_row) = last_row else {
        return Vec::new();
    };

    (0..=last_row)
        .map(|row| {
            (0..TABLE_COLUMNS)
                .map(|col| {
                    let formula = formulas
                        .and_then(|f| f.get_value((row, col)))
                        .filter(|f| !f.is_empty());
                    match formula {
                        Some(f) => format!("={}", f.strip_prefix('=').unwrap_or(f)),
                        None => values
                            .get_value((row, col))
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Tank").unwrap();
        sheet.write_string(0, 0, "Label").unwrap();
        sheet.write_string(0, 1, "Value").unwrap();
        sheet.write_string(1, 0, "Diamètre").unwrap();
        sheet.write_number(1, 1, 6.0).unwrap();
        sheet.write_string(1, 2, "m").unwrap();
        sheet.write_number(1, 5, 0.5).unwrap();
        sheet.write_string(2, 0, "Surface").unwrap();
        sheet.write_formula(2, 1, "=PI()*B2^2").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_reads_values_and_formulas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tank.xlsx");
        write_workbook(&path);

        let records = WorkbookReader::new(&path).read_records().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0][0], "Label");
        assert_eq!(records[1], vec!["Diamètre", "6", "m", "", "", "0.5"]);
        assert_eq!(records[2][1], "=PI()*B2^2");
    }

    #[test]
    fn test_named_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tank.xlsx");
        write_workbook(&path);

        let records = WorkbookReader::new(&path)
            .with_sheet(Some("Tank".to_string()))
            .read_records()
            .unwrap();
        assert_eq!(records.len(), 3);

        let err = WorkbookReader::new(&path)
            .with_sheet(Some("Missing".to_string()))
            .read_records()
            .unwrap_err();
        assert!(err.to_string().contains("Tank"));
    }

    #[test]
    fn test_missing_file() {
        let result = WorkbookReader::new("/nonexistent/book.xlsx").read_records();
        assert!(matches!(result, Err(TabcalcError::Source(_))));
    }

    #[test]
    fn test_is_workbook() {
        assert!(is_workbook(Path::new("a.xlsx")));
        assert!(is_workbook(Path::new("a.XLSX")));
        assert!(!is_workbook(Path::new("a.tsv")));
        assert!(!is_workbook(Path::new("-")));
    }
}
