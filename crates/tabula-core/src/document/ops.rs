use super::{Document, OutputMode};
use crate::command::Command;
use crate::error::Result;
use log::debug;
use tabula_engine::engine::{Position, render_texts, render_values};

impl Document {
    /// Set cell contents from input string.
    pub fn set_cell_from_input(&mut self, pos: Position, input: &str) -> Result<()> {
        self.sheet.set_cell(pos, input)?;
        self.modified = true;
        Ok(())
    }

    /// Clear the specified cell
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.sheet.clear_cell(pos)?;
        self.modified = true;
        Ok(())
    }

    /// Value and text of a cell, tab separated. Empty for positions without a cell.
    pub fn describe_cell(&self, pos: Position) -> Result<String> {
        Ok(match self.sheet.cell_at(pos)? {
            Some(cell) => format!("{}\t{}", cell.value(), cell.text()),
            None => String::new(),
        })
    }

    /// Cells read by and reading the specified cell.
    pub fn describe_dependencies(&self, pos: Position) -> Result<String> {
        let (refs, deps) = match self.sheet.cell_at(pos)? {
            Some(cell) => (cell.referenced_cells(), cell.dependents()),
            None => (Vec::new(), Vec::new()),
        };
        Ok(format!("reads: {}\nread by: {}", join(&refs), join(&deps)))
    }

    /// Render the whole sheet.
    pub fn render(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Values => render_values(&self.sheet, &self.render),
            OutputMode::Texts => render_texts(&self.sheet, &self.render),
        }
    }

    /// Apply one command, returning any text it prints.
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>> {
        debug!("executing {:?}", command);
        let output = match command {
            Command::Set { pos, text } => {
                self.set_cell_from_input(*pos, text)?;
                None
            }
            Command::Clear { pos } => {
                self.clear_cell(*pos)?;
                None
            }
            Command::Get { pos } => Some(self.describe_cell(*pos)?),
            Command::Deps { pos } => Some(self.describe_dependencies(*pos)?),
            Command::Size => Some(self.sheet.printable_size().to_string()),
            Command::Values => Some(self.render(OutputMode::Values)),
            Command::Texts => Some(self.render(OutputMode::Texts)),
        };
        Ok(output)
    }
}

fn join(positions: &[Position]) -> String {
    if positions.is_empty() {
        return "-".to_string();
    }
    positions
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
