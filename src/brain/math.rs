//! Restricted arithmetic evaluator.
//!
//! Accepts numeric literals, `+ - * / ^`, unary minus and parentheses.
//! Anything else is rejected before evaluation starts, so no input can do
//! more than arithmetic.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    /// A token or construct outside the arithmetic whitelist.
    UnsafeExpression(String),
    /// Whitelisted characters in an order that does not form an expression.
    Syntax(String),
    DivisionByZero,
    /// The result is not a finite number.
    Overflow,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::UnsafeExpression(what) => write!(f, "Unsafe expression: {}", what),
            MathError::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            MathError::DivisionByZero => write!(f, "Division by zero"),
            MathError::Overflow => write!(f, "Result out of range"),
        }
    }
}

impl std::error::Error for MathError {}

/// Deepest allowed nesting of parentheses, unary minus and exponents.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

fn whitelist() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9.+\-*/^()\s]+$").expect("arithmetic whitelist regex"))
}

/// True when `input` only uses characters an arithmetic expression may contain
/// and has at least one digit.
pub fn looks_like_arithmetic(input: &str) -> bool {
    whitelist().is_match(input) && input.chars().any(|c| c.is_ascii_digit())
}

/// Parse and evaluate `input`.
pub fn evaluate(input: &str) -> Result<f64, MathError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_expr()?;
    if let Some(token) = parser.peek() {
        return Err(MathError::Syntax(format!("unexpected {:?}", token)));
    }
    Ok(value)
}

/// Render a result the way a person would write it: `14`, `2.5`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| MathError::Syntax(format!("bad number '{}'", literal)))?;
                tokens.push(Token::Number(value));
            }
            '+' | '-' | '/' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '*' => {
                // `**` is accepted as a spelling of power.
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Op('^'));
                    i += 2;
                } else {
                    tokens.push(Token::Op('*'));
                    i += 1;
                }
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                return Err(MathError::UnsafeExpression(format!("identifier '{}'", name)));
            }
            other => {
                return Err(MathError::UnsafeExpression(format!("character '{}'", other)));
            }
        }
    }

    if tokens.is_empty() {
        return Err(MathError::Syntax("empty expression".to_string()));
    }
    Ok(tokens)
}

/// Recursive-descent parser that evaluates as it goes.
///
/// Chains of `+ - * /` are folded in a loop; only parentheses, unary minus
/// and exponents recurse, and those are capped at [`MAX_DEPTH`].
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, MathError> {
        let mut lhs = self.parse_term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = if op == '+' {
                apply(lhs, BinOp::Add, rhs)?
            } else {
                apply(lhs, BinOp::Sub, rhs)?
            };
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, MathError> {
        let mut lhs = self.parse_unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = if op == '*' {
                apply(lhs, BinOp::Mul, rhs)?
            } else {
                apply(lhs, BinOp::Div, rhs)?
            };
        }
        Ok(lhs)
    }

    // unary := '-' unary | power
    fn parse_unary(&mut self) -> Result<f64, MathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MathError::Syntax("expression nested too deeply".to_string()));
        }
        let value = match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                self.parse_unary().map(|v| -v)
            }
            Some(Token::Op('+')) => Err(MathError::UnsafeExpression("unary plus".to_string())),
            _ => self.parse_power(),
        };
        self.depth -= 1;
        value
    }

    // power := atom ('^' unary)?, right associative so -2^2 == -(2^2)
    fn parse_power(&mut self) -> Result<f64, MathError> {
        let base = self.parse_atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return apply(base, BinOp::Pow, exponent);
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<f64, MathError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MathError::Syntax("missing ')'".to_string())),
                }
            }
            Some(token) => Err(MathError::Syntax(format!("unexpected {:?}", token))),
            None => Err(MathError::Syntax("unexpected end of input".to_string())),
        }
    }
}

fn apply(a: f64, op: BinOp, b: f64) -> Result<f64, MathError> {
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(MathError::DivisionByZero);
            }
            a / b
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(MathError::DivisionByZero);
            }
            a.powf(b)
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(MathError::Overflow)
    }
}
