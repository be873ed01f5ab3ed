//! Formula parser - converts formula text into postfix [`Node`] order.
//!
//! Supports numbers, cell references (A1), unary `+`/`-`, the four binary
//! arithmetic operators and parentheses:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | CELL | '(' expr ')'
//! ```
//!
//! Output is a flat postfix sequence rather than a tree, so formulas of any
//! length are walked, cloned and dropped without recursion. Only parentheses
//! and unary operators recurse while parsing, and their nesting is capped.
//!
//! A cell label must be upper-case letters followed by a row number without
//! leading zeros (`A01` and `A0` are syntax errors). Well-formed labels
//! outside the sheet are accepted and evaluate to `#REF!`.

use thiserror::Error;

use super::position::Position;

/// Parentheses and unary operators nested deeper than this are rejected.
const MAX_NESTING: usize = 256;

/// A syntax error in formula text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// One step of a formula in postfix order. Operators apply to the values
/// produced by the steps before them; grouping parentheses are implied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    /// Cell reference. May hold an invalid position for labels outside the sheet.
    Ref(Position),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Cell(Position),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Parse formula text (without the leading `=`) into postfix nodes.
pub(crate) fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new(0, "Empty formula"));
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        end: input.len(),
        output: Vec::with_capacity(tokens.len()),
    };
    parser.parse_expr()?;
    if let Some((offset, token)) = parser.peek() {
        return Err(ParseError::new(
            offset,
            format!("Unexpected token {:?}", token),
        ));
    }
    Ok(parser.output)
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            b'+' => tokens.push((start, Token::Plus)),
            b'-' => tokens.push((start, Token::Minus)),
            b'*' => tokens.push((start, Token::Star)),
            b'/' => tokens.push((start, Token::Slash)),
            b'(' => tokens.push((start, Token::LParen)),
            b')' => tokens.push((start, Token::RParen)),
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let text = &input[start..i];
                let n = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new(start, format!("Invalid number: {}", text)))?;
                tokens.push((start, Token::Number(n)));
                continue;
            }
            b'A'..=b'Z' => {
                while i < bytes.len() && bytes[i].is_ascii_uppercase() {
                    i += 1;
                }
                let letters_end = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if letters_end == i {
                    return Err(ParseError::new(
                        start,
                        format!("Unknown name: {}", &input[start..i]),
                    ));
                }
                let label = &input[start..i];
                let pos = Position::from_str(label).ok_or_else(|| {
                    ParseError::new(start, format!("Invalid cell reference: {}", label))
                })?;
                tokens.push((start, Token::Cell(pos)));
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(start, format!("Unexpected character '{}'", ch)));
            }
        }
        i += 1;
    }

    Ok(tokens)
}

/// Scan `digits [. digits] [(e|E) [+|-] digits]`, returning the end offset.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
    depth: usize,
    end: usize,
    output: Vec<Node>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(offset, token)| (*offset, token))
    }

    fn bump(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self, offset: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::new(offset, "Formula nested too deeply"));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<(), ParseError> {
        self.parse_term()?;
        while let Some((_, token)) = self.peek() {
            let op = match token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            self.parse_term()?;
            self.output.push(Node::Binary(op));
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<(), ParseError> {
        self.parse_unary()?;
        while let Some((_, token)) = self.peek() {
            let op = match token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            self.parse_unary()?;
            self.output.push(Node::Binary(op));
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<(), ParseError> {
        let op = match self.peek() {
            Some((_, Token::Plus)) => UnaryOp::Plus,
            Some((_, Token::Minus)) => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        let (offset, _) = self.bump().ok_or_else(|| ParseError::new(self.end, "Unexpected end"))?;
        self.descend(offset)?;
        self.parse_unary()?;
        self.depth -= 1;
        self.output.push(Node::Unary(op));
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<(), ParseError> {
        match self.bump() {
            Some((_, Token::Number(n))) => self.output.push(Node::Number(n)),
            Some((_, Token::Cell(pos))) => self.output.push(Node::Ref(pos)),
            Some((offset, Token::LParen)) => {
                self.descend(offset)?;
                self.parse_expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some((_, Token::RParen)) => {}
                    Some((offset, token)) => {
                        return Err(ParseError::new(
                            offset,
                            format!("Expected ')', found {:?}", token),
                        ));
                    }
                    None => return Err(ParseError::new(self.end, "Expected ')'")),
                }
            }
            Some((offset, token)) => {
                return Err(ParseError::new(
                    offset,
                    format!("Unexpected token {:?}", token),
                ));
            }
            None => return Err(ParseError::new(self.end, "Unexpected end of formula")),
        }
        Ok(())
    }
}
