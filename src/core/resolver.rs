//! Reference resolution: spreadsheet coordinates → cell identifiers

use std::ops::RangeInclusive;

/// Spreadsheet row numbers that precede the first data row (the header)
pub const ROW_OFFSET: usize = 2;

/// Row offset used by the historic SUM range expansion
pub const LEGACY_RANGE_OFFSET: usize = 1;

/// A parsed spreadsheet coordinate such as `B4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    /// Column letters (uppercase)
    pub column: String,
    /// Row number as written (1-based)
    pub row: usize,
}

impl Coordinate {
    /// Parse `[A-Z]+[0-9]+`, or `None` if the text has any other shape
    pub fn parse(text: &str) -> Option<Self> {
        let split = text.find(|c: char| !c.is_ascii_uppercase())?;
        let (column, digits) = text.split_at(split);
        if column.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let row = digits.parse().ok()?;
        Some(Self {
            column: column.to_string(),
            row,
        })
    }

    /// Row index under the given offset, or `None` if it falls before the data
    pub fn row_index(&self, offset: usize) -> Option<usize> {
        self.row.checked_sub(offset)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Identifiers assigned so far, by data-row index
///
/// A slot is `None` when the row exists but produced no identifier
/// (blank label, repeated header).
///
/// `row_count` is the number of data rows in the table, which can exceed the
/// slots filled so far when identifiers are assigned row by row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownIds {
    slots: Vec<Option<String>>,
    rows: usize,
}

impl KnownIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the identifier for a data-row index
    pub fn assign(&mut self, index: usize, id: String) {
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(id);
    }

    /// Number of row slots known so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Declare how many data rows the table has
    pub fn reserve_rows(&mut self, rows: usize) {
        self.rows = rows;
    }

    /// Data rows in the table: the declared count or the known slots,
    /// whichever is larger
    pub fn row_count(&self) -> usize {
        self.rows.max(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Identifier at a row index; `None` when the index is out of range
    pub fn get(&self, index: usize) -> Option<Option<&str>> {
        self.slots.get(index).map(|slot| slot.as_deref())
    }
}

/// Clamp an inclusive row range to the rows a table can address
///
/// Returns the rows to expand (possibly empty) and whether rows past the end
/// were cut off. Row `r` is addressable when `r - offset < row_count`.
pub fn clamp_range(
    first: usize,
    last: usize,
    offset: usize,
    row_count: usize,
) -> (RangeInclusive<usize>, bool) {
    let (first, last) = (first.min(last), first.max(last));
    let end = row_count + offset;
    if last < end {
        return (first..=last, false);
    }
    match end.checked_sub(1) {
        Some(limit) if limit >= first => (first..=limit, true),
        // Nothing addressable: an empty range
        _ => (1..=0, true),
    }
}

/// Why a coordinate could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Column other than the value column
    WrongColumn {
        coordinate: String,
        column: String,
        value_column: String,
    },
    /// Row index before the first data row or past the known rows
    OutOfRange { coordinate: String },
    /// Row exists but carries no identifier
    NoIdentifier { coordinate: String },
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::WrongColumn {
                coordinate,
                column,
                value_column,
            } => write!(
                f,
                "reference {} targets column {}, only column {} can be referenced; left untranslated",
                coordinate, column, value_column
            ),
            Unresolved::OutOfRange { coordinate } => write!(
                f,
                "reference {} is outside the known rows; left untranslated",
                coordinate
            ),
            Unresolved::NoIdentifier { coordinate } => write!(
                f,
                "reference {} points to a row without a cell; left untranslated",
                coordinate
            ),
        }
    }
}

/// Resolves coordinates in the value column to cell identifiers
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    value_column: String,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new("B")
    }
}

impl ReferenceResolver {
    pub fn new(value_column: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
        }
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Look up the identifier for a coordinate
    pub fn lookup<'k>(
        &self,
        coordinate: &Coordinate,
        known: &'k KnownIds,
    ) -> Result<&'k str, Unresolved> {
        if coordinate.column != self.value_column {
            return Err(Unresolved::WrongColumn {
                coordinate: coordinate.to_string(),
                column: coordinate.column.clone(),
                value_column: self.value_column.clone(),
            });
        }
        self.lookup_index(coordinate.row_index(ROW_OFFSET), coordinate, known)
    }

    /// Look up a data-row index computed by the caller
    ///
    /// `coordinate` is only used to describe the failure.
    pub fn lookup_index<'k>(
        &self,
        index: Option<usize>,
        coordinate: &Coordinate,
        known: &'k KnownIds,
    ) -> Result<&'k str, Unresolved> {
        match index.and_then(|i| known.get(i)) {
            Some(Some(id)) => Ok(id),
            Some(None) => Err(Unresolved::NoIdentifier {
                coordinate: coordinate.to_string(),
            }),
            None => Err(Unresolved::OutOfRange {
                coordinate: coordinate.to_string(),
            }),
        }
    }

    /// Resolve a coordinate string, or hand it back unchanged
    ///
    /// Text that is not a coordinate is returned as-is without a warning.
    /// A coordinate that cannot be resolved is returned as-is and a warning is
    /// pushed to `warnings`.
    pub fn resolve_coordinate(
        &self,
        text: &str,
        known: &KnownIds,
        warnings: &mut Vec<String>,
    ) -> String {
        let Some(coordinate) = Coordinate::parse(text) else {
            return text.to_string();
        };
        match self.lookup(&coordinate, known) {
            Ok(id) => id.to_string(),
            Err(reason) => {
                warnings.push(reason.to_string());
                text.to_string()
            }
        }
    }
}
