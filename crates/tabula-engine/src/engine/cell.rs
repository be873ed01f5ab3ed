//! Cell data structures and dependency-graph maintenance.
//!
//! This module provides the core data types for representing cells:
//! - [`CellContent`] - The content of a cell (empty, text, or formula)
//! - [`Cell`] - A cell with content, dependency edges, and cached evaluation state
//! - [`CellDirectory`] - Lookup/creation of cells by position, implemented by the sheet
//!
//! Cells refer to each other through [`CellId`] handles into the directory's
//! arena. Every edge is stored on both ends: `references` on the reading cell
//! and `dependents` on the cell being read.

use std::cell::RefCell;
use std::collections::BTreeSet;

use log::{debug, trace};

use super::cycle::find_cycle;
use super::error::SheetError;
use super::formula::Formula;
use super::parser::ParseError;
use super::position::Position;
use super::value::{FormulaError, Value};

/// Leading character of formula input.
pub const FORMULA_SIGN: char = '=';
/// Leading character that forces input to be stored as text.
pub const ESCAPE_SIGN: char = '\'';

/// Stable handle of a cell inside a [`CellDirectory`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellId(pub(crate) usize);

/// The content stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Empty,
    Text(String),
    Formula(Formula),
}

impl CellContent {
    /// Classify user input.
    /// - Empty string -> Empty
    /// - `=` followed by at least one character -> Formula (parsed)
    /// - Anything else -> Text, stored verbatim (including a leading `'`)
    pub fn from_input(input: &str) -> Result<CellContent, ParseError> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }
        if let Some(expression) = input.strip_prefix(FORMULA_SIGN) {
            if !expression.is_empty() {
                return Ok(CellContent::Formula(Formula::parse(expression)?));
            }
        }
        Ok(CellContent::Text(input.to_string()))
    }
}

/// A node of the sheet's dependency graph.
#[derive(Debug)]
pub struct Cell {
    position: Position,
    content: CellContent,
    /// Last computed value of a formula. Reads fill this through a shared
    /// reference, so value reads mutate it while staying observably pure.
    cache: RefCell<Option<Value>>,
    /// Cells this cell's formula reads.
    references: BTreeSet<CellId>,
    /// Cells whose formulas read this cell.
    dependents: BTreeSet<CellId>,
}

impl Cell {
    pub fn new(position: Position) -> Cell {
        Cell {
            position,
            content: CellContent::Empty,
            cache: RefCell::new(None),
            references: BTreeSet::new(),
            dependents: BTreeSet::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The text the cell was set from (formulas in canonical form).
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula(f) => format!("{}{}", FORMULA_SIGN, f.expression()),
        }
    }

    /// Positions referenced by the cell's formula, in row-major order.
    pub fn referenced_cells(&self) -> Vec<Position> {
        match &self.content {
            CellContent::Formula(f) => f.referenced_cells().to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn has_dependents(&self) -> bool {
        !self.dependents.is_empty()
    }

    pub fn dependents(&self) -> impl Iterator<Item = CellId> + '_ {
        self.dependents.iter().copied()
    }

    pub fn references(&self) -> impl Iterator<Item = CellId> + '_ {
        self.references.iter().copied()
    }

    /// Whether a formula value is cached. Non-formula cells never cache.
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }

    fn needs_evaluation(&self) -> bool {
        matches!(self.content, CellContent::Formula(_)) && !self.is_cached()
    }

    fn clear_cache(&self) -> bool {
        self.cache.borrow_mut().take().is_some()
    }
}

/// Position-addressed access to the cells of a sheet.
///
/// Cell logic only goes through this capability, so data flows from the sheet
/// into cell operations and never back to a concrete sheet type.
pub trait CellDirectory {
    /// The cell behind a live handle.
    fn cell(&self, id: CellId) -> &Cell;
    fn cell_mut(&mut self, id: CellId) -> &mut Cell;
    /// Handle of the cell at `pos`, if one exists.
    fn find(&self, pos: Position) -> Option<CellId>;
    /// Handle of the cell at `pos`, creating an empty one if needed.
    fn find_or_create(&mut self, pos: Position) -> CellId;
    /// Drop an empty cell that nothing reads. The handle becomes dead.
    fn remove(&mut self, id: CellId);
}

/// Set the content of the cell at `pos`.
///
/// Formulas are checked for cycles before anything is touched, so a rejected
/// assignment leaves the directory exactly as it was. Referenced cells that do
/// not exist yet are created empty, and empty cells that lose their last
/// reader are removed. Returns the handle of the assigned cell, or `None`
/// when clearing a position that holds no cell.
pub(crate) fn assign<D: CellDirectory>(
    dir: &mut D,
    pos: Position,
    content: CellContent,
) -> Result<Option<CellId>, SheetError> {
    let referenced = match &content {
        CellContent::Formula(f) => f.referenced_cells().to_vec(),
        _ => Vec::new(),
    };
    if let Some(path) = find_cycle(dir, pos, &referenced) {
        debug!("rejecting formula at {}: circular dependency", pos);
        return Err(SheetError::CircularDependency { cell: pos, path });
    }

    let id = match content {
        CellContent::Empty => match dir.find(pos) {
            Some(id) => id,
            None => return Ok(None),
        },
        _ => dir.find_or_create(pos),
    };
    let targets: Vec<CellId> = referenced
        .iter()
        .map(|p| dir.find_or_create(*p))
        .collect();

    let orphaned = replace_references(dir, id, &targets);
    dir.cell_mut(id).content = content;
    invalidate(dir, id);
    for target in orphaned {
        trace!("removing unread empty cell {}", dir.cell(target).position());
        dir.remove(target);
    }
    debug!("assigned {} ({} references)", pos, targets.len());
    Ok(Some(id))
}

/// Swap the outgoing edges of `id` for `targets`, keeping both ends in sync.
///
/// Returns the former targets that are empty and no longer read by anything.
fn replace_references<D: CellDirectory>(
    dir: &mut D,
    id: CellId,
    targets: &[CellId],
) -> Vec<CellId> {
    let old = std::mem::take(&mut dir.cell_mut(id).references);
    for &target in &old {
        dir.cell_mut(target).dependents.remove(&id);
    }
    for &target in targets {
        dir.cell_mut(id).references.insert(target);
        dir.cell_mut(target).dependents.insert(id);
    }
    old.into_iter()
        .filter(|&target| {
            let cell = dir.cell(target);
            matches!(cell.content, CellContent::Empty) && !cell.has_dependents()
        })
        .collect()
}

/// Drop the cached value of `id` and of every cell reading it, transitively.
///
/// The walk stops at dependents that hold no cache: their own dependents were
/// cleared when that cache went away.
pub(crate) fn invalidate<D: CellDirectory>(dir: &D, id: CellId) {
    let origin = dir.cell(id);
    origin.clear_cache();
    let mut stack: Vec<CellId> = origin.dependents().collect();
    let mut cleared = 0usize;
    while let Some(current) = stack.pop() {
        let cell = dir.cell(current);
        if !cell.clear_cache() {
            continue;
        }
        cleared += 1;
        stack.extend(cell.dependents());
    }
    trace!("invalidated {} dependent caches of {}", cleared, origin.position());
}

/// Read the value of a cell, evaluating and caching formulas as needed.
pub(crate) fn value<D: CellDirectory>(dir: &D, id: CellId) -> Value {
    let cell = dir.cell(id);
    match &cell.content {
        CellContent::Empty => Value::empty(),
        CellContent::Text(s) => {
            Value::Text(s.strip_prefix(ESCAPE_SIGN).unwrap_or(s).to_string())
        }
        CellContent::Formula(_) => {
            let cached = cell.cache.borrow().clone();
            if let Some(cached) = cached {
                return cached;
            }
            evaluate_upstream(dir, id);
            cell.cache.borrow().clone().unwrap_or_else(Value::empty)
        }
    }
}

/// Evaluate every uncached formula `id` reads, deepest first, then `id` itself.
///
/// Uses an explicit stack so long reference chains cannot exhaust the call stack.
fn evaluate_upstream<D: CellDirectory>(dir: &D, id: CellId) {
    let mut stack = vec![(id, false)];
    while let Some((current, ready)) = stack.pop() {
        let cell = dir.cell(current);
        if !cell.needs_evaluation() {
            continue;
        }
        if !ready {
            stack.push((current, true));
            stack.extend(
                cell.references()
                    .filter(|&r| dir.cell(r).needs_evaluation())
                    .map(|r| (r, false)),
            );
            continue;
        }
        let CellContent::Formula(formula) = &cell.content else {
            continue;
        };
        let result = Value::from(formula.evaluate(|pos| operand(dir, pos)));
        trace!("evaluated {} = {}", cell.position, result);
        *cell.cache.borrow_mut() = Some(result);
    }
}

fn operand<D: CellDirectory>(dir: &D, pos: Position) -> Result<f64, FormulaError> {
    match dir.find(pos) {
        Some(id) => value(dir, id).as_operand(),
        None => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_classification() {
        assert_eq!(CellContent::from_input("").unwrap(), CellContent::Empty);
        assert_eq!(
            CellContent::from_input("hello").unwrap(),
            CellContent::Text("hello".into())
        );
        assert_eq!(
            CellContent::from_input("=").unwrap(),
            CellContent::Text("=".into())
        );
        assert_eq!(
            CellContent::from_input("'=1+2").unwrap(),
            CellContent::Text("'=1+2".into())
        );
        assert!(matches!(
            CellContent::from_input("=1+2").unwrap(),
            CellContent::Formula(_)
        ));
        assert!(CellContent::from_input("=1+").is_err());
    }

    #[test]
    fn test_new_cell_is_empty() {
        let cell = Cell::new(Position::new(3, 4));
        assert_eq!(cell.text(), "");
        assert!(cell.referenced_cells().is_empty());
        assert!(!cell.has_dependents());
        assert!(!cell.is_cached());
    }
}
