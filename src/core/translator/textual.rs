//! Textual formula rewriting
//!
//! Ordered regex substitutions over the formula text. Kept for formulas that
//! the structured parser rejects and for callers that need the historic
//! output byte for byte.
//!
//! Known limitations: the coordinate substitution is global (any
//! letters+digits run is treated as a reference), operators other than `^`
//! are left untouched, and `SUM` only expands a single range argument.

use super::functions::FunctionTable;
use super::printer::past_last_row;
use crate::core::resolver::{clamp_range, Coordinate, KnownIds, ReferenceResolver};
use crate::error::{TabcalcError, TabcalcResult};
use regex::{Captures, Regex};

/// Pattern matching placeholder tokens left by range expansion
pub const PLACEHOLDER_PATTERN: &str = r"__row_(\d+)__";

/// Placeholder for a row index, replaced once every identifier is known
pub fn placeholder(index: usize) -> String {
    format!("__row_{}__", index)
}

/// Argument of a single-level `IF`: no top-level comma, one level of parens
const IF_ARGUMENT: &str = r"((?:[^,()]|\([^()]*\))*)";

/// Upper bound on `IF` expansion passes (one per nesting level)
const MAX_IF_PASSES: usize = 8;

/// Regex pipeline for the textual translation mode
#[derive(Debug, Clone)]
pub struct TextualRewriter {
    functions: FunctionTable,
    sum_range: Regex,
    coordinate: Regex,
    function_call: Regex,
    constant_call: Option<Regex>,
    conditional: Regex,
}

fn compile(pattern: &str) -> TabcalcResult<Regex> {
    Regex::new(pattern).map_err(|e| TabcalcError::Config(format!("Regex error: {}", e)))
}

impl TextualRewriter {
    pub fn new(functions: &FunctionTable) -> TabcalcResult<Self> {
        let names: Vec<String> = functions
            .entries()
            .iter()
            .map(|entry| regex::escape(entry.name))
            .collect();
        let constants: Vec<String> = functions
            .constants()
            .map(|entry| regex::escape(entry.target))
            .collect();

        let constant_call = if constants.is_empty() {
            None
        } else {
            Some(compile(&format!(r"({})\(\s*\)", constants.join("|")))?)
        };

        Ok(Self {
            functions: functions.clone(),
            sum_range: compile(
                r"(?i)\bSUM\(\s*([A-Z]+)([0-9]+)\s*:\s*([A-Z]+)([0-9]+)\s*\)",
            )?,
            coordinate: compile(r"[A-Z]+[0-9]+")?,
            function_call: compile(&format!(r"(?i)\b({})\(", names.join("|")))?,
            constant_call,
            conditional: compile(&format!(
                r"(?i)\bIF\({arg},{arg},{arg}\)",
                arg = IF_ARGUMENT
            ))?,
        })
    }

    /// Rewrite a formula into the target dialect
    ///
    /// `SUM` ranges become placeholder tokens (see [`placeholder`]) that the
    /// caller resolves once every identifier is known.
    pub fn rewrite(
        &self,
        formula: &str,
        resolver: &ReferenceResolver,
        known: &KnownIds,
        range_offset: usize,
        warnings: &mut Vec<String>,
    ) -> String {
        // 1. Strip the formula marker and absolute-reference markers
        let body = formula.strip_prefix('=').unwrap_or(formula).replace('$', "");

        // 2. SUM(B2:B4) → (__row_0__ + __row_1__ + __row_2__)
        let result =
            self.expand_sum_ranges(&body, resolver.value_column(), range_offset, known, warnings);

        // 3. Coordinates → identifiers
        let result = self
            .coordinate
            .replace_all(&result, |caps: &Captures| {
                resolver.resolve_coordinate(&caps[0], known, warnings)
            })
            .into_owned();

        // 4. Function names, in a single pass so inserted text is never rescanned
        let result = self
            .function_call
            .replace_all(&result, |caps: &Captures| match self.functions.get(&caps[1]) {
                Some(entry) => format!("{}(", entry.target),
                None => caps[0].to_string(),
            })
            .into_owned();

        // 5. Math.PI() → Math.PI
        let result = match &self.constant_call {
            Some(re) => re.replace_all(&result, "${1}").into_owned(),
            None => result,
        };

        // 6. Power operator
        let result = result.replace('^', "**");

        // 7. IF(c, t, e) → (c ? t : e)
        self.expand_conditionals(result)
    }

    /// Ranges stop at the last table row in `known`, which may be further
    /// than the identifiers assigned so far
    fn expand_sum_ranges(
        &self,
        formula: &str,
        value_column: &str,
        range_offset: usize,
        known: &KnownIds,
        warnings: &mut Vec<String>,
    ) -> String {
        self.sum_range
            .replace_all(formula, |caps: &Captures| {
                let start_column = caps[1].to_ascii_uppercase();
                let end_column = caps[3].to_ascii_uppercase();

                // Off-column endpoints are left for the coordinate pass to report
                if start_column != value_column || end_column != value_column {
                    return caps[0].to_string();
                }
                let (Ok(first), Ok(last)) = (caps[2].parse::<usize>(), caps[4].parse::<usize>())
                else {
                    return caps[0].to_string();
                };
                let (rows, truncated) =
                    clamp_range(first, last, range_offset, known.row_count());
                if truncated {
                    let coordinate = |row| Coordinate {
                        column: start_column.clone(),
                        row,
                    };
                    warnings.push(past_last_row(&coordinate(first), &coordinate(last)));
                }

                let terms: Vec<String> = rows
                    .map(|row| {
                        let coordinate = Coordinate {
                            column: start_column.clone(),
                            row,
                        };
                        match coordinate.row_index(range_offset) {
                            Some(index) => placeholder(index),
                            None => coordinate.to_string(),
                        }
                    })
                    .collect();

                if terms.is_empty() {
                    return "0".to_string();
                }
                format!("({})", terms.join(" + "))
            })
            .into_owned()
    }

    fn expand_conditionals(&self, mut formula: String) -> String {
        for _ in 0..MAX_IF_PASSES {
            if !self.conditional.is_match(&formula) {
                break;
            }
            formula = self
                .conditional
                .replace_all(&formula, |caps: &Captures| {
                    format!(
                        "({} ? {} : {})",
                        caps[1].trim(),
                        caps[2].trim(),
                        caps[3].trim()
                    )
                })
                .into_owned();
        }
        formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::{LEGACY_RANGE_OFFSET, ROW_OFFSET};

    fn known(ids: &[&str]) -> KnownIds {
        let mut known = KnownIds::new();
        for (i, id) in ids.iter().enumerate() {
            known.assign(i, id.to_string());
        }
        known
    }

    fn rewrite(formula: &str, ids: &[&str]) -> (String, Vec<String>) {
        let rewriter = TextualRewriter::new(&FunctionTable::default()).unwrap();
        let mut warnings = Vec::new();
        let out = rewriter.rewrite(
            formula,
            &ReferenceResolver::default(),
            &known(ids),
            ROW_OFFSET,
            &mut warnings,
        );
        (out, warnings)
    }

    #[test]
    fn test_pi_power() {
        let (out, warnings) = rewrite("=PI()*B2^2", &["diametre"]);
        assert_eq!(out, "Math.PI*diametre**2");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_functions_case_insensitive() {
        let (out, _) = rewrite("=sqrt(B2)+Abs(B3)", &["a", "b"]);
        assert_eq!(out, "Math.sqrt(a)+Math.abs(b)");
    }

    #[test]
    fn test_longer_names_not_rewritten_twice() {
        let (out, _) = rewrite("=CEILING(B2)+CEIL(B2)", &["a"]);
        assert_eq!(out, "Math.ceil(a)+Math.ceil(a)");
    }

    #[test]
    fn test_sum_range_placeholders() {
        let (out, _) = rewrite("=SUM(B2:B4)", &["a", "b", "c"]);
        assert_eq!(out, "(__row_0__ + __row_1__ + __row_2__)");
    }

    #[test]
    fn test_sum_range_legacy_offset() {
        let rewriter = TextualRewriter::new(&FunctionTable::default()).unwrap();
        let mut warnings = Vec::new();
        let out = rewriter.rewrite(
            "=SUM(B2:B3)",
            &ReferenceResolver::default(),
            &known(&["a", "b", "c"]),
            LEGACY_RANGE_OFFSET,
            &mut warnings,
        );
        assert_eq!(out, "(__row_1__ + __row_2__)");
    }

    #[test]
    fn test_sum_off_column_left_to_resolver() {
        let (out, warnings) = rewrite("=SUM(A2:A3)", &["a", "b"]);
        assert_eq!(out, "SUM(A2:A3)");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_if_expansion() {
        let (out, _) = rewrite("=IF(B2>10,B2*2,ROUND(B2))", &["x"]);
        assert_eq!(out, "(x>10 ? x*2 : Math.round(x))");
    }

    #[test]
    fn test_nested_if_expansion() {
        let (out, _) = rewrite("=IF(B2>1,IF(B2>2,2,1),0)", &["x"]);
        assert_eq!(out, "(x>1 ? (x>2 ? 2 : 1) : 0)");
    }

    #[test]
    fn test_unresolved_coordinate_left_verbatim() {
        let (out, warnings) = rewrite("=A2*2", &["x"]);
        assert_eq!(out, "A2*2");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("A2"));
    }

    #[test]
    fn test_absolute_markers_removed() {
        let (out, _) = rewrite("=$B$2*2", &["x"]);
        assert_eq!(out, "x*2");
    }

    #[test]
    fn test_placeholder_pattern_matches_placeholder() {
        let re = Regex::new(PLACEHOLDER_PATTERN).unwrap();
        let text = placeholder(12);
        let caps = re.captures(&text).unwrap();
        assert_eq!(&caps[1], "12");
    }
}
