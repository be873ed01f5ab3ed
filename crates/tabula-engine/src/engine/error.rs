//! Error types for sheet mutations.

use thiserror::Error;

use super::parser::ParseError;
use super::position::Position;

/// Structural failures. A mutation that returns one of these has not changed
/// the sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid position: row {}, column {}", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error("Circular dependency detected at {cell}: {}", format_path(.path))]
    CircularDependency { cell: Position, path: Vec<Position> },

    #[error("Formula error: {0}")]
    Formula(#[from] ParseError),
}

fn format_path(path: &[Position]) -> String {
    path.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SheetError>;
