//! Test helpers for building grids in precise candidate configurations.
//!
//! Technique tests mostly start from an unconstrained grid (every cell holds
//! all nine candidates) and carve the pattern under test out of it, the same
//! way a driver's eliminations would. The helpers rebuild the derived
//! indexes after every mutation so techniques always observe a consistent
//! grid.

use kaidoku_core::{Digit, DigitSet, House, HouseKind, Position};

use crate::grid::Grid;

/// A real easy puzzle with a unique solution, used as a worked example.
pub(crate) const EASY: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

pub(crate) fn easy_grid() -> Grid {
    Grid::from_givens(EASY).expect("the worked example is a valid puzzle")
}

/// A grid with no values and every candidate open. `ans` is unset, so this
/// is only suitable for techniques that do not reason about the solution.
pub(crate) fn unconstrained() -> Grid {
    let mut grid = Grid::test_empty();
    for cell in grid.cells_mut() {
        cell.candidates = DigitSet::FULL;
    }
    grid.test_rebuild();
    grid
}

/// Removes a single candidate and rebuilds the derived indexes.
pub(crate) fn remove_candidate(grid: &mut Grid, pos: Position, digit: Digit) {
    grid.cell_mut(pos).candidates.remove(digit);
    grid.test_rebuild();
}

/// Restricts a cell to exactly the given candidates.
pub(crate) fn keep_candidates<I>(grid: &mut Grid, pos: Position, keep: I)
where
    I: IntoIterator<Item = Digit>,
{
    grid.cell_mut(pos).candidates = keep.into_iter().collect();
    grid.test_rebuild();
}

/// Places a value (not as a given) and propagates the peer eliminations.
pub(crate) fn place(grid: &mut Grid, pos: Position, digit: Digit) {
    {
        let cell = grid.cell_mut(pos);
        cell.value = Some(digit);
        cell.candidates = DigitSet::EMPTY;
    }
    for kind in HouseKind::ALL {
        for peer in House::containing(kind, pos).positions() {
            grid.cell_mut(peer).candidates.remove(digit);
        }
    }
    grid.test_rebuild();
}

/// Marks a cell as a given, which the uniqueness techniques inspect.
pub(crate) fn mark_given(grid: &mut Grid, pos: Position) {
    grid.cell_mut(pos).given = true;
}

/// Narrows `cand_could_be`, simulating exclusions by the original clue set.
pub(crate) fn set_could_be<I>(grid: &mut Grid, pos: Position, could_be: I)
where
    I: IntoIterator<Item = Digit>,
{
    grid.cell_mut(pos).cand_could_be = could_be.into_iter().collect();
}

/// Fills every cell outside `keep` with an arbitrary value, leaving only
/// the kept cells empty. Useful for techniques that scan empty cells and
/// ignore the values themselves.
pub(crate) fn fill_others(grid: &mut Grid, keep: &[Position]) {
    for pos in Position::ALL {
        if !keep.contains(&pos) {
            let cell = grid.cell_mut(pos);
            cell.value = Some(Digit::D9);
            cell.candidates = DigitSet::EMPTY;
        }
    }
    grid.test_rebuild();
}

/// Serializes a grid back into the 972-character pattern format.
pub(crate) fn to_pattern(grid: &Grid) -> String {
    let mut out = String::with_capacity(972);
    for cell in grid.cells() {
        out.push(if cell.given() { '1' } else { '0' });
        out.push(cell.value().map_or('0', |d| char::from(b'0' + d.value())));
        for digit in Digit::ALL {
            out.push(if cell.candidates().contains(digit) {
                '1'
            } else {
                '0'
            });
        }
        out.push(cell.ans().map_or('0', |d| char::from(b'0' + d.value())));
    }
    out
}
