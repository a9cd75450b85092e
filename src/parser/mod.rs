//! Table parsing: raw tab-separated text → normalized rows
//!
//! Serialized calculators (JSON/YAML) are loaded by [`load_calculator`].
//!
//! Column order is fixed: label, value, unit, min, max, step.

mod document;
mod slug;

pub use document::{load_calculator, parse_calculator};
pub use slug::slugify;

/// Spreadsheet row number of the header row
pub const HEADER_ROW: usize = 1;

/// One normalized data row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Spreadsheet row number (1-based, the header is row 1)
    pub number: usize,
    pub label: String,
    /// Raw value text: a number, a formula (`=...`), or anything else
    pub value: String,
    pub unit: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl Row {
    /// Build a row from raw fields, or `None` when the row must be skipped
    ///
    /// A row is skipped when it is the header row, when its label is empty, or
    /// when its label is the header token (case-insensitive).
    pub fn from_fields(number: usize, fields: &[String], header_token: &str) -> Option<Self> {
        if number <= HEADER_ROW {
            return None;
        }

        let label = fields.first().map(|s| s.trim()).unwrap_or_default();
        if label.is_empty() || label.eq_ignore_ascii_case(header_token) {
            return None;
        }

        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or_default();

        Some(Self {
            number,
            label: label.to_string(),
            value: field(1).to_string(),
            unit: field(2).to_string(),
            min: parse_number(field(3)),
            max: parse_number(field(4)),
            step: parse_number(field(5)),
        })
    }

    /// Zero-based position among data rows (row 2 → 0)
    pub fn index(&self) -> usize {
        self.number - HEADER_ROW - 1
    }

    pub fn is_formula(&self) -> bool {
        self.value.starts_with('=')
    }
}

/// Split tab-separated text into raw fields, one vector per line
///
/// Lines are separated by `\n`; a trailing `\r` is dropped so Windows
/// clipboard exports work unchanged.
pub fn split_table(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Parse tab-separated text into data rows
///
/// # Arguments
/// * `text` - Table text, header first
/// * `header_token` - Label that marks header rows (usually `"label"`)
///
/// # Example
/// ```
/// use royalbit_tabcalc::parser::parse_table;
///
/// let rows = parse_table("Label\tValue\nDiamètre\t6\tm", "label");
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].number, 2);
/// ```
pub fn parse_table(text: &str, header_token: &str) -> Vec<Row> {
    rows_from_records(&split_table(text), header_token)
}

/// Normalize already-split records (from any table source) into data rows
pub fn rows_from_records(records: &[Vec<String>], header_token: &str) -> Vec<Row> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, fields)| Row::from_fields(idx + 1, fields, header_token))
        .collect()
}

/// Parse a numeric field
///
/// Accepts a decimal comma (`0,5`) as written by French-locale spreadsheets.
/// Empty, unparseable and non-finite inputs yield `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = match text.parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) if text.matches(',').count() == 1 && !text.contains('.') => {
            text.replace(',', ".").parse::<f64>().ok()
        }
        Err(_) => None,
    };

    parsed.filter(|n| n.is_finite())
}
