//! Results produced by reading a cell.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::format::format_number;

/// A formula evaluation failure.
///
/// These never abort a read: they become the value of the formula cell and
/// flow on to every formula that reads it.
#[derive(Error, Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize)]
pub enum FormulaError {
    /// The formula references a position outside the sheet.
    #[error("#REF!")]
    Ref,
    /// A referenced cell holds text that is not a number.
    #[error("#VALUE!")]
    Value,
    /// Division by zero or a non-finite result.
    #[error("#ARITHM!")]
    Arithmetic,
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Value {
    /// The value of an empty cell.
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    /// Interpret this value as a formula operand.
    ///
    /// Empty text counts as zero, other text must parse completely as a
    /// finite number.
    pub fn as_operand(&self) -> Result<f64, FormulaError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) if s.is_empty() => Ok(0.0),
            Value::Text(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(FormulaError::Value),
            },
            Value::Error(e) => Err(*e),
        }
    }
}

impl From<Result<f64, FormulaError>> for Value {
    fn from(result: Result<f64, FormulaError>) -> Self {
        match result {
            Ok(n) => Value::Number(n),
            Err(e) => Value::Error(e),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}
