//! Sparse sheet storage.
//!
//! [`Sheet`] owns every cell in an arena addressed by [`CellId`] handles and
//! indexes them through a jagged grid of rows. Rows and row lengths grow
//! independently as cells are written, and shrink again when trailing cells
//! are cleared, so the cached [`Size`] always matches the populated area.

use log::debug;

use super::cell::{self, Cell, CellContent, CellDirectory, CellId};
use super::error::{Result, SheetError};
use super::position::{Position, Size};
use super::value::Value;

/// A spreadsheet: cells, their dependency graph and the populated extent.
///
/// Reading values fills formula caches through shared references, so a
/// `Sheet` is not `Sync`. Hosts sharing one across threads must hold it
/// behind a single lock.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Cell arena. `None` marks a free slot listed in `free`.
    cells: Vec<Option<Cell>>,
    free: Vec<usize>,
    /// Row-major position index. A non-empty row always ends with a cell.
    rows: Vec<Vec<Option<CellId>>>,
    size: Size,
}

/// Read-only view of one cell of a sheet.
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    id: CellId,
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.sheet.cell(self.id).position()
    }

    /// The computed value. Formulas are evaluated on first read and cached
    /// until a cell they depend on changes.
    pub fn value(&self) -> Value {
        cell::value(self.sheet, self.id)
    }

    pub fn text(&self) -> String {
        self.sheet.cell(self.id).text()
    }

    pub fn content(&self) -> &'a CellContent {
        self.sheet.cell(self.id).content()
    }

    /// Positions this cell's formula reads, in row-major order.
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.sheet.cell(self.id).referenced_cells()
    }

    /// Positions of the cells whose formulas read this cell, in row-major order.
    pub fn dependents(&self) -> Vec<Position> {
        let cell = self.sheet.cell(self.id);
        let mut positions: Vec<Position> = cell
            .dependents()
            .map(|id| self.sheet.cell(id).position())
            .collect();
        positions.sort_unstable();
        positions
    }
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell from user input.
    ///
    /// Empty input clears the cell. Input starting with `=` is parsed as a
    /// formula; cells it references are created empty if missing.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        check_position(pos)?;
        let content = CellContent::from_input(text)?;
        if content == CellContent::Empty {
            return self.clear_cell(pos);
        }
        cell::assign(self, pos, content)?;
        Ok(())
    }

    /// The cell at `pos`, or `None` if nothing is stored there.
    pub fn cell_at(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;
        Ok(self.find(pos).map(|id| CellView { sheet: self, id }))
    }

    /// Clear the cell at `pos`.
    ///
    /// A cell that other formulas still read stays in place as an empty cell;
    /// otherwise it is removed and the populated area shrinks around it.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;
        let Some(id) = cell::assign(self, pos, CellContent::Empty)? else {
            return Ok(());
        };
        if self.cell(id).has_dependents() {
            debug!("cleared {} (kept for dependents)", pos);
            return Ok(());
        }
        self.remove(id);
        Ok(())
    }

    /// Smallest rectangle from A1 enclosing every stored cell.
    pub fn printable_size(&self) -> Size {
        self.size
    }

    /// Number of cells currently stored, including empty cells kept for
    /// their dependents.
    pub fn cell_count(&self) -> usize {
        self.cells.len() - self.free.len()
    }

    fn slot(&self, pos: Position) -> Option<CellId> {
        let row = self.rows.get(usize::try_from(pos.row).ok()?)?;
        row.get(usize::try_from(pos.col).ok()?).copied().flatten()
    }

    fn allocate(&mut self, pos: Position) -> CellId {
        let cell = Cell::new(pos);
        match self.free.pop() {
            Some(index) => {
                self.cells[index] = Some(cell);
                CellId(index)
            }
            None => {
                self.cells.push(Some(cell));
                CellId(self.cells.len() - 1)
            }
        }
    }
}

fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::InvalidPosition(pos))
    }
}

impl CellDirectory for Sheet {
    fn cell(&self, id: CellId) -> &Cell {
        self.cells[id.0]
            .as_ref()
            .expect("cell handle must refer to a live cell")
    }

    fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        self.cells[id.0]
            .as_mut()
            .expect("cell handle must refer to a live cell")
    }

    fn find(&self, pos: Position) -> Option<CellId> {
        self.slot(pos)
    }

    fn find_or_create(&mut self, pos: Position) -> CellId {
        if let Some(id) = self.slot(pos) {
            return id;
        }
        let (row, col) = (pos.row as usize, pos.col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        if self.rows[row].len() <= col {
            self.rows[row].resize(col + 1, None);
        }
        self.size.rows = self.size.rows.max(pos.row + 1);
        self.size.cols = self.size.cols.max(pos.col + 1);

        let id = self.allocate(pos);
        self.rows[row][col] = Some(id);
        id
    }

    /// Free the slot of `id` and shrink the populated area around it.
    fn remove(&mut self, id: CellId) {
        let Some(cell) = self.cells[id.0].take() else {
            return;
        };
        self.free.push(id.0);
        let pos = cell.position();
        let row = &mut self.rows[pos.row as usize];
        row[pos.col as usize] = None;
        while matches!(row.last(), Some(None)) {
            row.pop();
        }
        while matches!(self.rows.last(), Some(r) if r.is_empty()) {
            self.rows.pop();
        }
        self.size = Size::new(
            self.rows.len() as i32,
            self.rows.iter().map(Vec::len).max().unwrap_or(0) as i32,
        );
        debug!("removed {}, printable size now {}", pos, self.size);
    }
}
