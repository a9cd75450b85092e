//! tabcalc - spreadsheet calculator tables → computation graphs of cells
//!
//! This library reads a parametric calculator written as a table (one row per
//! variable: label, value, unit, min, max, step), resolves spreadsheet
//! coordinates to cell identifiers, translates spreadsheet formulas into a
//! JavaScript-style expression dialect, and validates the resulting cells.
//!
//! # Features
//!
//! - Tab-separated text or .xlsx workbooks as table sources
//! - Structured formula translation (parser + printer) with a textual fallback
//! - `SUM` ranges, nested `IF`, comparison and logical operators
//! - Accumulating structural validation
//! - JSON and YAML output
//!
//! # Example
//!
//! ```
//! use royalbit_tabcalc::config::ImportConfig;
//! use royalbit_tabcalc::core::{import, validate};
//!
//! let table = "Label\tValue\tUnit\nDiamètre\t6\tm\nSurface\t=PI()*B2^2\tm²";
//! let report = import(table, &ImportConfig::default())?;
//!
//! let surface = report.calculator.cell("surface").unwrap();
//! assert_eq!(surface.expression.as_deref(), Some("Math.PI * diametre ** 2"));
//! assert!(validate(&report.calculator).valid);
//! # Ok::<(), royalbit_tabcalc::error::TabcalcError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::{ImportConfig, Translation};
pub use error::{TabcalcError, TabcalcResult};
pub use types::{Calculator, Cell, CellKind, ImportReport, ImportWarning, ValidationReport};
