//! Formula parser
//!
//! Converts a token sequence into an expression tree. Recursive descent with
//! spreadsheet precedence, lowest first:
//!
//! comparison < `&` < `+ -` < `* /` < `^` < unary `-` < postfix `%`
//!
//! All binary operators are left-associative, including `^`.

use super::tokenizer::Token;
use crate::core::resolver::Coordinate;

/// Binary operators of the spreadsheet dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => BinaryOp::Eq,
            "<>" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&" => BinaryOp::Concat,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "^" => BinaryOp::Pow,
            _ => return None,
        })
    }
}

/// Expression tree of a spreadsheet formula
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal as written
    Number(String),
    Text(String),
    Bool(bool),
    /// Cell reference such as `B2`, with the text as written (`$b$2`)
    Coordinate { coordinate: Coordinate, text: String },
    /// Range of cells `B2:B4`, only meaningful as a function argument
    Range { start: Coordinate, end: Coordinate },
    /// Any other bare name
    Name(String),
    /// Function call: NAME(arg1, arg2, ...)
    Call { name: String, args: Vec<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    /// Postfix percent: `50%`
    Percent(Box<Expr>),
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at token {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parser for formula tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the tokens into an expression tree
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("Empty expression", 0));
        }
        let expr = self.comparison()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", token),
                self.position,
            ));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, message: &str) -> Result<(), ParseError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(ParseError::new(message, self.position))
        }
    }

    /// Consume an operator if it is one of `ops`
    fn match_any_operator(&mut self, ops: &[&str]) -> Option<BinaryOp> {
        if let Some(Token::Operator(s)) = self.peek() {
            if ops.contains(&s.as_str()) {
                let op = BinaryOp::from_symbol(s);
                self.position += 1;
                return op;
            }
        }
        None
    }

    /// Parse one left-associative precedence level
    fn binary_level(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;

        while let Some(op) = self.match_any_operator(ops) {
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&["=", "<>", "<", ">", "<=", ">="], Self::concat)
    }

    fn concat(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&["&"], Self::additive)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&["+", "-"], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&["*", "/"], Self::power)
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&["^"], Self::unary)
    }

    /// Unary: ( "-" | "+" ) unary | postfix
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(&Token::Operator("-".to_string())) {
            let operand = self.unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        if self.match_token(&Token::Operator("+".to_string())) {
            return self.unary();
        }
        self.postfix()
    }

    /// Postfix: primary "%"*
    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.match_token(&Token::Operator("%".to_string())) {
            expr = Expr::Percent(Box::new(expr));
        }
        Ok(expr)
    }

    /// Arguments: ( expr ( "," expr )* )?
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(Token::CloseParen) = self.peek() {
            return Ok(args);
        }

        args.push(self.comparison()?);
        while self.match_token(&Token::Comma) {
            args.push(self.comparison()?);
        }

        Ok(args)
    }

    /// Primary: NUMBER | STRING | call | range | reference | "(" expr ")"
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.position;

        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s)),
            Some(Token::Identifier(name)) => self.identifier(name, position),
            Some(Token::OpenParen) => {
                let expr = self.comparison()?;
                self.expect(&Token::CloseParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            Some(token) => Err(ParseError::new(
                format!("Unexpected token: {:?}", token),
                position,
            )),
            None => Err(ParseError::new("Unexpected end of expression", position)),
        }
    }

    fn identifier(&mut self, name: String, position: usize) -> Result<Expr, ParseError> {
        if self.match_token(&Token::OpenParen) {
            let args = self.arguments()?;
            self.expect(&Token::CloseParen, "Expected ')' after function arguments")?;
            return Ok(Expr::Call { name, args });
        }

        if let Some(start) = parse_coordinate(&name) {
            if self.match_token(&Token::Colon) {
                let end_position = self.position;
                return match self.advance() {
                    Some(Token::Identifier(end)) => match parse_coordinate(&end) {
                        Some(end) => Ok(Expr::Range { start, end }),
                        None => Err(ParseError::new(
                            format!("Invalid range end: {}", end),
                            end_position,
                        )),
                    },
                    _ => Err(ParseError::new("Expected cell after ':'", end_position)),
                };
            }
            return Ok(Expr::Coordinate {
                coordinate: start,
                text: name,
            });
        }

        if name.contains('$') {
            return Err(ParseError::new(
                format!("Invalid reference: {}", name),
                position,
            ));
        }

        if name.eq_ignore_ascii_case("TRUE") {
            Ok(Expr::Bool(true))
        } else if name.eq_ignore_ascii_case("FALSE") {
            Ok(Expr::Bool(false))
        } else {
            Ok(Expr::Name(name))
        }
    }
}

/// Parse a coordinate token, ignoring `$` markers and letter case
fn parse_coordinate(text: &str) -> Option<Coordinate> {
    let bare: String = text
        .chars()
        .filter(|c| *c != '$')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    Coordinate::parse(&bare)
}

/// Parse tokens into an expression tree
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}
