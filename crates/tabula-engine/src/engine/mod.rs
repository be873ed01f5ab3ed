//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Sheet`], [`CellView`] - Sparse cell storage and read access
//! - [`Cell`], [`CellContent`], [`CellDirectory`] - Cells and the dependency graph
//! - [`Position`], [`Size`] - Cell addresses (A1 notation ↔ row/col indices)
//! - [`Value`], [`FormulaError`] - Results of reading a cell
//! - [`Formula`] - Formula parsing, evaluation and canonical text
//! - [`find_cycle`] - Circular dependency detection
//! - [`render_values`], [`render_texts`] - Delimited text output

mod cell;
mod cycle;
mod error;
mod format;
mod formula;
mod parser;
mod position;
mod render;
mod sheet;
mod value;

pub use cell::{Cell, CellContent, CellDirectory, CellId, ESCAPE_SIGN, FORMULA_SIGN};
pub use cycle::find_cycle;
pub use error::{Result, SheetError};
pub use format::format_number;
pub use formula::Formula;
pub use parser::ParseError;
pub use position::{MAX_COLS, MAX_ROWS, Position, Size};
pub use render::{RenderOptions, render_texts, render_values};
pub use sheet::{CellView, Sheet};
pub use value::{FormulaError, Value};
