//! Excel workbook table source
//!
//! Reads an .xlsx worksheet into the same records a TSV table splits into,
//! keeping formulas so they go through the formula translator.

mod reader;

pub use reader::{is_workbook, WorkbookReader};
