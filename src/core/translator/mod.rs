//! Formula translation: spreadsheet dialect → target expression dialect
//!
//! Two modes share one entry point, [`FormulaTranslator::translate`]:
//!
//! - **structured** (default): tokenize, parse into an [`parser::Expr`] tree,
//!   then print with target precedence. Coordinates, ranges and nested `IF`s
//!   are handled exactly.
//! - **textual**: the ordered regex pipeline in [`textual`]. Used when
//!   configured, and as a fallback for formulas the parser rejects.
//!
//! # Example
//! ```
//! use royalbit_tabcalc::config::ImportConfig;
//! use royalbit_tabcalc::core::resolver::KnownIds;
//! use royalbit_tabcalc::core::translator::FormulaTranslator;
//!
//! let translator = FormulaTranslator::new(&ImportConfig::default()).unwrap();
//! let mut known = KnownIds::new();
//! known.assign(0, "diametre".to_string());
//!
//! let mut warnings = Vec::new();
//! let expression = translator.translate("=PI()*B2^2", &known, &mut warnings);
//! assert_eq!(expression, "Math.PI * diametre ** 2");
//! ```

pub mod functions;
pub mod parser;
mod printer;
pub mod textual;
pub mod tokenizer;

use crate::config::{ImportConfig, Translation};
use crate::core::resolver::{KnownIds, ReferenceResolver, LEGACY_RANGE_OFFSET, ROW_OFFSET};
use crate::error::TabcalcResult;
use functions::FunctionTable;
use parser::ParseError;
use printer::Printer;
use textual::TextualRewriter;
use thiserror::Error;
use tokenizer::TokenizeError;

/// Why a formula could not be translated structurally
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("{0}")]
    Tokenize(#[from] TokenizeError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Unsupported(String),
}

/// Translates spreadsheet formulas against a set of known identifiers
///
/// Immutable after construction; one instance can serve any number of
/// imports, from any number of threads.
#[derive(Debug, Clone)]
pub struct FormulaTranslator {
    mode: Translation,
    resolver: ReferenceResolver,
    functions: FunctionTable,
    textual: TextualRewriter,
    range_offset: usize,
}

impl FormulaTranslator {
    pub fn new(config: &ImportConfig) -> TabcalcResult<Self> {
        let functions = FunctionTable::default();
        let textual = TextualRewriter::new(&functions)?;

        Ok(Self {
            mode: config.translation,
            resolver: ReferenceResolver::new(config.value_column.clone()),
            functions,
            textual,
            range_offset: if config.legacy_range_offset {
                LEGACY_RANGE_OFFSET
            } else {
                ROW_OFFSET
            },
        })
    }

    pub fn mode(&self) -> Translation {
        self.mode
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Translate a formula in the configured mode
    ///
    /// Never fails: unresolved references and unknown names are left in the
    /// output and reported through `warnings`. In structured mode a formula
    /// that does not parse is translated textually instead.
    pub fn translate(&self, formula: &str, known: &KnownIds, warnings: &mut Vec<String>) -> String {
        match self.mode {
            Translation::Textual => self.translate_textual(formula, known, warnings),
            Translation::Structured => {
                // Warnings from a failed attempt would describe output we discard
                let mut attempt = Vec::new();
                match self.translate_structured(formula, known, &mut attempt) {
                    Ok(expression) => {
                        warnings.extend(attempt);
                        expression
                    }
                    Err(e) => {
                        warnings.push(format!(
                            "formula '{}' could not be parsed ({}); translated textually",
                            formula, e
                        ));
                        self.translate_textual(formula, known, warnings)
                    }
                }
            }
        }
    }

    /// Parse and print a formula
    pub fn translate_structured(
        &self,
        formula: &str,
        known: &KnownIds,
        warnings: &mut Vec<String>,
    ) -> Result<String, TranslateError> {
        let tokens = tokenizer::tokenize(formula)?;
        let expr = parser::parse(tokens)?;

        Printer {
            functions: &self.functions,
            resolver: &self.resolver,
            known,
            range_offset: self.range_offset,
            warnings,
        }
        .print(&expr)
    }

    /// Rewrite a formula with the textual pipeline
    ///
    /// The result may contain placeholder tokens for `SUM` ranges.
    pub fn translate_textual(
        &self,
        formula: &str,
        known: &KnownIds,
        warnings: &mut Vec<String>,
    ) -> String {
        self.textual
            .rewrite(formula, &self.resolver, known, self.range_offset, warnings)
    }
}
