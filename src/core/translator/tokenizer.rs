//! Formula tokenizer
//!
//! Converts spreadsheet formulas like "=PI()*B2^2" into a sequence of tokens
//! that the parser turns into an expression tree.

use std::iter::Peekable;
use std::str::Chars;

/// A token in a spreadsheet formula
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal, kept as written (e.g. `0.5`, `1e3`)
    Number(String),
    /// A string literal (e.g. "m²")
    Text(String),
    /// A function name, coordinate (`B2`, `$B$2`), or name
    Identifier(String),
    /// Operators: + - * / ^ & % = <> < > <= >=
    Operator(String),
    OpenParen,
    CloseParen,
    /// Argument separator (`,` or `;`)
    Comma,
    /// Range separator (B2:B4)
    Colon,
}

/// Error during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenize error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenizer for spreadsheet formulas
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer; the leading formula marker `=` is stripped
    pub fn new(formula: &'a str) -> Self {
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        Self {
            chars: formula.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenize the entire formula
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '"' => self.read_string()?,

            '(' => self.single(Token::OpenParen),
            ')' => self.single(Token::CloseParen),
            ',' | ';' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),

            '+' | '-' | '*' | '/' | '^' | '&' | '%' | '=' => {
                self.single(Token::Operator(c.to_string()))
            }

            '<' => self.read_less_than_operator(),
            '>' => self.read_greater_than_operator(),

            c if c.is_ascii_digit() || c == '.' => self.read_number()?,

            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_identifier(),

            c => {
                return Err(TokenizeError::new(
                    format!("Unexpected character: '{}'", c),
                    self.position,
                ));
            }
        };

        Ok(Some(token))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    /// Consume one character and return the given token
    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consume characters while the predicate holds
    fn take_while(&mut self, out: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
    }

    /// Read a double-quoted string; `""` escapes a quote
    fn read_string(&mut self) -> Result<Token, TokenizeError> {
        self.advance(); // opening quote
        let start_pos = self.position;
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated string literal", start_pos));
                }
                Some('"') if self.peek() == Some('"') => {
                    value.push('"');
                    self.advance();
                }
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }

        Ok(Token::Text(value))
    }

    /// Read a number (integer, decimal, or scientific notation)
    fn read_number(&mut self) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        let mut num_str = String::new();

        self.take_while(&mut num_str, |c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            num_str.push('.');
            self.advance();
            self.take_while(&mut num_str, |c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            num_str.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                num_str.push(sign);
                self.advance();
            }
            self.take_while(&mut num_str, |c| c.is_ascii_digit());
        }

        match num_str.parse::<f64>() {
            Ok(_) => Ok(Token::Number(num_str)),
            Err(_) => Err(TokenizeError::new(
                format!("Invalid number: {}", num_str),
                start_pos,
            )),
        }
    }

    /// Read an identifier; `$` absolute markers are kept for the parser
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();
        self.take_while(&mut ident, |c| {
            c.is_alphanumeric() || c == '_' || c == '.' || c == '$'
        });
        Token::Identifier(ident)
    }

    fn read_less_than_operator(&mut self) -> Token {
        self.advance(); // '<'

        match self.peek() {
            Some('=') => self.single(Token::Operator("<=".to_string())),
            Some('>') => self.single(Token::Operator("<>".to_string())),
            _ => Token::Operator("<".to_string()),
        }
    }

    fn read_greater_than_operator(&mut self) -> Token {
        self.advance(); // '>'

        match self.peek() {
            Some('=') => self.single(Token::Operator(">=".to_string())),
            _ => Token::Operator(">".to_string()),
        }
    }
}

/// Tokenize a formula string
pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(formula).tokenize()
}
