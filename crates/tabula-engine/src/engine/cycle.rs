//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must verify it doesn't create a cycle
//! (e.g., A1 references B1, B1 references C1, C1 references A1).
//! The check runs before the new edges exist: it walks backward from the
//! target cell through the cells that already read it, and fails if that walk
//! reaches any cell the new formula would read.

use std::collections::{HashMap, HashSet};

use super::cell::{CellDirectory, CellId};
use super::position::Position;

/// Check whether making `target` read `referenced` would close a cycle.
///
/// Returns the cycle as a path of positions in reading order, starting and
/// ending at `target` (e.g. `[B1, A1, B1]` when A1 already reads B1).
pub fn find_cycle<D: CellDirectory>(
    dir: &D,
    target: Position,
    referenced: &[Position],
) -> Option<Vec<Position>> {
    if referenced.is_empty() {
        return None;
    }
    if referenced.contains(&target) {
        return Some(vec![target, target]);
    }
    // A cell that does not exist yet has no dependents.
    let start = dir.find(target)?;

    let referenced: HashSet<CellId> = referenced.iter().filter_map(|p| dir.find(*p)).collect();
    if referenced.is_empty() {
        return None;
    }

    let mut reached_from: HashMap<CellId, CellId> = HashMap::new();
    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        for dependent in dir.cell(current).dependents() {
            if !visited.insert(dependent) {
                continue;
            }
            reached_from.insert(dependent, current);
            if referenced.contains(&dependent) {
                return Some(cycle_path(dir, start, dependent, &reached_from));
            }
            stack.push(dependent);
        }
    }

    None
}

fn cycle_path<D: CellDirectory>(
    dir: &D,
    start: CellId,
    hit: CellId,
    reached_from: &HashMap<CellId, CellId>,
) -> Vec<Position> {
    let target = dir.cell(start).position();
    let mut path = vec![target];
    let mut current = hit;
    while current != start {
        path.push(dir.cell(current).position());
        match reached_from.get(&current) {
            Some(&previous) => current = previous,
            None => break,
        }
    }
    path.push(target);
    path
}
