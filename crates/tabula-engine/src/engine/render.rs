//! Tab-separated rendering of a sheet's values or texts.
//!
//! Output covers exactly the printable area: one line per row, every line
//! holding `cols` fields separated by the delimiter, blank fields for
//! positions without a cell.

use std::io;

use super::position::Position;
use super::sheet::{CellView, Sheet};

/// Formatting options for rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Field separator between columns.
    pub delimiter: char,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { delimiter: '\t' }
    }
}

/// Render computed values.
pub fn render_values(sheet: &Sheet, options: &RenderOptions) -> String {
    render_with(sheet, options, |cell| cell.value().to_string())
}

/// Render cell texts (formulas in canonical `=` form).
pub fn render_texts(sheet: &Sheet, options: &RenderOptions) -> String {
    render_with(sheet, options, |cell| cell.text())
}

fn render_with<F>(sheet: &Sheet, options: &RenderOptions, field: F) -> String
where
    F: Fn(&CellView<'_>) -> String,
{
    let size = sheet.printable_size();
    let mut out = String::new();
    for row in 0..size.rows {
        for col in 0..size.cols {
            if col > 0 {
                out.push(options.delimiter);
            }
            if let Ok(Some(cell)) = sheet.cell_at(Position::new(row, col)) {
                out.push_str(&field(&cell));
            }
        }
        out.push('\n');
    }
    out
}

impl Sheet {
    /// Write computed values, tab separated.
    pub fn print_values<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(render_values(self, &RenderOptions::default()).as_bytes())
    }

    /// Write cell texts, tab separated.
    pub fn print_texts<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(render_texts(self, &RenderOptions::default()).as_bytes())
    }
}
