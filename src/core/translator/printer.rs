//! Expression printer: spreadsheet expression tree → target dialect
//!
//! References are resolved while printing. Parentheses are emitted from the
//! target's precedence table, so the source's grouping survives even where
//! the two dialects disagree (`^` is left-associative, `**` is not).

use super::functions::FunctionTable;
use super::parser::{BinaryOp, Expr};
use super::TranslateError;
use crate::core::resolver::{clamp_range, Coordinate, KnownIds, ReferenceResolver, Unresolved};

// Target precedence, loosest first. Ternaries, sums and logical chains are
// always printed inside their own parentheses and count as atoms.
const EQUALITY: u8 = 4;
const RELATIONAL: u8 = 5;
const ADDITIVE: u8 = 6;
const MULTIPLICATIVE: u8 = 7;
const UNARY: u8 = 8;
const POWER: u8 = 9;
const ATOM: u8 = 10;

/// A printed sub-expression with its binding strength
#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    precedence: u8,
}

impl Fragment {
    fn atom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            precedence: ATOM,
        }
    }

    fn new(text: String, precedence: u8) -> Self {
        Self { text, precedence }
    }

    /// Text, parenthesized when `wrap` holds
    fn wrapped_if(self, wrap: bool) -> String {
        if wrap {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

/// Prints one expression tree against a set of known identifiers
pub struct Printer<'a> {
    pub functions: &'a FunctionTable,
    pub resolver: &'a ReferenceResolver,
    pub known: &'a KnownIds,
    /// Offset turning range row numbers into row indices
    pub range_offset: usize,
    pub warnings: &'a mut Vec<String>,
}

impl Printer<'_> {
    /// Print a whole expression
    pub fn print(&mut self, expr: &Expr) -> Result<String, TranslateError> {
        Ok(self.fragment(expr)?.text)
    }

    fn fragment(&mut self, expr: &Expr) -> Result<Fragment, TranslateError> {
        match expr {
            Expr::Number(n) => Ok(Fragment::atom(number_literal(n))),
            Expr::Text(s) => Ok(Fragment::atom(serde_json::to_string(s).map_err(
                |e| TranslateError::Unsupported(format!("text literal: {}", e)),
            )?)),
            Expr::Bool(b) => Ok(Fragment::atom(if *b { "true" } else { "false" })),
            Expr::Coordinate { coordinate, text } => Ok(self.coordinate(coordinate, text)),
            Expr::Range { start, end } => Err(TranslateError::Unsupported(format!(
                "range {}:{} can only be used as a function argument",
                start, end
            ))),
            Expr::Name(name) => {
                self.warnings
                    .push(format!("unknown name '{}' kept verbatim", name));
                Ok(Fragment::atom(name.as_str()))
            }
            Expr::Call { name, args } => self.call(name, args),
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Negate(operand) => {
                let operand = self.fragment(operand)?;
                let wrap = operand.precedence < ATOM;
                Ok(Fragment::new(format!("-{}", operand.wrapped_if(wrap)), UNARY))
            }
            Expr::Percent(operand) => {
                let operand = self.fragment(operand)?;
                let wrap = operand.precedence < MULTIPLICATIVE;
                Ok(Fragment::new(
                    format!("{} / 100", operand.wrapped_if(wrap)),
                    MULTIPLICATIVE,
                ))
            }
        }
    }

    /// Resolved identifier, or the reference exactly as written
    fn coordinate(&mut self, coordinate: &Coordinate, text: &str) -> Fragment {
        match self.resolver.lookup(coordinate, self.known) {
            Ok(id) => Fragment::atom(id),
            Err(reason) => self.unresolved(text, reason),
        }
    }

    fn unresolved(&mut self, text: &str, reason: Unresolved) -> Fragment {
        self.warnings.push(reason.to_string());
        Fragment::atom(text)
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Fragment, TranslateError> {
        let (symbol, precedence) = match op {
            BinaryOp::Concat => return self.concat(left, right),
            BinaryOp::Eq => ("==", EQUALITY),
            BinaryOp::Ne => ("!=", EQUALITY),
            BinaryOp::Lt => ("<", RELATIONAL),
            BinaryOp::Gt => (">", RELATIONAL),
            BinaryOp::Le => ("<=", RELATIONAL),
            BinaryOp::Ge => (">=", RELATIONAL),
            BinaryOp::Add => ("+", ADDITIVE),
            BinaryOp::Sub => ("-", ADDITIVE),
            BinaryOp::Mul => ("*", MULTIPLICATIVE),
            BinaryOp::Div => ("/", MULTIPLICATIVE),
            BinaryOp::Pow => ("**", POWER),
        };

        let left = self.fragment(left)?;
        let right = self.fragment(right)?;

        // `**` is right-associative and rejects a unary base
        let (wrap_left, wrap_right) = if op == BinaryOp::Pow {
            (left.precedence < ATOM, right.precedence < UNARY)
        } else {
            (left.precedence < precedence, right.precedence <= precedence)
        };

        Ok(Fragment::new(
            format!(
                "{} {} {}",
                left.wrapped_if(wrap_left),
                symbol,
                right.wrapped_if(wrap_right)
            ),
            precedence,
        ))
    }

    /// `a & b` → `String(a) + String(b)`
    ///
    /// `&` always yields text, so operands that aren't already text are
    /// converted before `+` sees them.
    fn concat(&mut self, left: &Expr, right: &Expr) -> Result<Fragment, TranslateError> {
        let left = self.string_operand(left)?;
        let right = self.string_operand(right)?;
        let wrap_right = right.precedence <= ADDITIVE;

        Ok(Fragment::new(
            format!("{} + {}", left.text, right.wrapped_if(wrap_right)),
            ADDITIVE,
        ))
    }

    fn string_operand(&mut self, expr: &Expr) -> Result<Fragment, TranslateError> {
        let fragment = self.fragment(expr)?;
        match expr {
            Expr::Text(_)
            | Expr::Binary {
                op: BinaryOp::Concat,
                ..
            } => Ok(fragment),
            _ => Ok(Fragment::atom(format!("String({})", fragment.text))),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Fragment, TranslateError> {
        let upper = name.to_ascii_uppercase();

        match upper.as_str() {
            "SUM" => {
                let items = self.arguments(args)?;
                if items.is_empty() {
                    return Ok(Fragment::atom("0"));
                }
                Ok(Fragment::atom(format!("({})", join_terms(items))))
            }
            "AVERAGE" => {
                let items = self.arguments(args)?;
                if items.is_empty() {
                    return Err(arity(name, "at least one argument"));
                }
                let count = items.len();
                Ok(Fragment::atom(format!("(({}) / {})", join_terms(items), count)))
            }
            "IF" => {
                if !(2..=3).contains(&args.len()) {
                    return Err(arity(name, "2 or 3 arguments"));
                }
                let condition = self.fragment(&args[0])?.text;
                let then = self.fragment(&args[1])?.text;
                let otherwise = match args.get(2) {
                    Some(arg) => self.fragment(arg)?.text,
                    None => "false".to_string(),
                };
                Ok(Fragment::atom(format!(
                    "({} ? {} : {})",
                    condition, then, otherwise
                )))
            }
            "AND" | "OR" => {
                let items = self.arguments(args)?;
                if items.is_empty() {
                    return Err(arity(name, "at least one argument"));
                }
                let symbol = if upper == "AND" { " && " } else { " || " };
                let texts: Vec<String> = items.into_iter().map(|f| f.text).collect();
                Ok(Fragment::atom(format!("({})", texts.join(symbol))))
            }
            "NOT" => {
                let [operand] = args else {
                    return Err(arity(name, "1 argument"));
                };
                let operand = self.fragment(operand)?;
                let wrap = operand.precedence < ATOM;
                Ok(Fragment::new(format!("!{}", operand.wrapped_if(wrap)), UNARY))
            }
            "TRUE" | "FALSE" if args.is_empty() => Ok(Fragment::atom(upper.to_lowercase())),
            _ => self.table_call(name, &upper, args),
        }
    }

    /// Function from the dialect table, or an unknown call kept verbatim
    fn table_call(&mut self, name: &str, upper: &str, args: &[Expr]) -> Result<Fragment, TranslateError> {
        match self.functions.get(upper) {
            Some(entry) if entry.constant => {
                if !args.is_empty() {
                    return Err(arity(name, "no arguments"));
                }
                Ok(Fragment::atom(entry.target))
            }
            Some(entry) => {
                let texts = self.argument_texts(args)?;
                Ok(Fragment::atom(format!("{}({})", entry.target, texts.join(", "))))
            }
            None => {
                self.warnings
                    .push(format!("unknown function {}() kept verbatim", name));
                let texts = self.argument_texts(args)?;
                Ok(Fragment::atom(format!("{}({})", name, texts.join(", "))))
            }
        }
    }

    fn argument_texts(&mut self, args: &[Expr]) -> Result<Vec<String>, TranslateError> {
        Ok(self
            .arguments(args)?
            .into_iter()
            .map(|f| f.text)
            .collect())
    }

    /// Print arguments, expanding ranges into one item per row
    fn arguments(&mut self, args: &[Expr]) -> Result<Vec<Fragment>, TranslateError> {
        let mut items = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Expr::Range { start, end } => items.extend(self.range(start, end)),
                other => items.push(self.fragment(other)?),
            }
        }
        Ok(items)
    }

    fn range(&mut self, start: &Coordinate, end: &Coordinate) -> Vec<Fragment> {
        let value_column = self.resolver.value_column();
        for coordinate in [start, end] {
            if coordinate.column != value_column {
                self.warnings.push(
                    Unresolved::WrongColumn {
                        coordinate: coordinate.to_string(),
                        column: coordinate.column.clone(),
                        value_column: value_column.to_string(),
                    }
                    .to_string(),
                );
                return vec![Fragment::atom(format!("{}:{}", start, end))];
            }
        }

        let (rows, truncated) = clamp_range(
            start.row,
            end.row,
            self.range_offset,
            self.known.row_count(),
        );
        if truncated {
            self.warnings.push(past_last_row(start, end));
        }

        rows.map(|row| {
            let coordinate = Coordinate {
                column: start.column.clone(),
                row,
            };
            let index = coordinate.row_index(self.range_offset);
            match self.resolver.lookup_index(index, &coordinate, self.known) {
                Ok(id) => Fragment::atom(id),
                Err(reason) => self.unresolved(&coordinate.to_string(), reason),
            }
        })
        .collect()
    }
}

/// Warning for a range that runs past the last table row
pub(super) fn past_last_row(start: &Coordinate, end: &Coordinate) -> String {
    format!(
        "range {}:{} extends past the last table row; the rows after it are ignored",
        start, end
    )
}

/// Numeric literal without the leading zeros the target rejects (`007` → `7`)
fn number_literal(text: &str) -> String {
    let trimmed = text.trim_start_matches('0');
    if text.starts_with('0') && !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Join summands, parenthesizing anything looser than addition
fn join_terms(items: Vec<Fragment>) -> String {
    items
        .into_iter()
        .map(|f| {
            let wrap = f.precedence < ADDITIVE;
            f.wrapped_if(wrap)
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn arity(name: &str, expected: &str) -> TranslateError {
    TranslateError::Unsupported(format!("{}() expects {}", name, expected))
}
