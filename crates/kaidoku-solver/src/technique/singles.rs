//! Singles and locked candidates.

use kaidoku_core::{Digit, House, HouseKind, Position};
use tinyvec::ArrayVec;

use super::any_has_candidate;
use crate::{
    Step,
    grid::Grid,
    step::{ExecMode, StepBuilder, opcode},
};

/// A cell with exactly one remaining candidate is placed.
pub(crate) fn naked_single(grid: &Grid) -> Option<Step> {
    for cell in grid.cells() {
        if let Some(digit) = cell.candidates().single() {
            let mut step = StepBuilder::new();
            step.push(opcode::NAKED_SINGLE);
            step.push_pos(cell.pos());
            step.push_digit(digit);
            step.set_mode(ExecMode::Place);
            step.add_exec(cell.pos(), digit);
            return Some(step.finish());
        }
    }
    None
}

/// A digit with exactly one remaining position in a house is placed.
pub(crate) fn hidden_single(grid: &Grid) -> Option<Step> {
    for digit in Digit::ALL {
        for house in House::ALL {
            let mut found: Option<Position> = None;
            let mut count = 0;
            for pos in house.positions() {
                let cell = grid.cell_at(pos);
                if cell.value() == Some(digit) {
                    // Already placed in this house.
                    count = 0;
                    break;
                }
                if cell.candidates().contains(digit) {
                    count += 1;
                    found = Some(pos);
                }
            }
            if count == 1 {
                let mut step = StepBuilder::new();
                step.push(opcode::HIDDEN_SINGLE);
                step.set_mode(ExecMode::Place);
                step.add_exec(found?, digit);
                return Some(step.finish());
            }
        }
    }
    None
}

/// The three cells a line shares with a box, the rest of the box, and the
/// rest of the line. Callers guarantee the line crosses the box.
pub(crate) fn box_line_intersection(
    box_index: u8,
    kind: HouseKind,
    line: u8,
) -> (
    ArrayVec<[Position; 3]>,
    ArrayVec<[Position; 6]>,
    ArrayVec<[Position; 6]>,
) {
    let mut intersection = ArrayVec::new();
    let mut box_remaining = ArrayVec::new();
    let mut line_remaining = ArrayVec::new();

    let box_segment = match kind {
        HouseKind::Row => box_index % 3,
        HouseKind::Column => box_index / 3,
        HouseKind::Box => unreachable!(),
    };
    for (i, pos) in House::new(kind, line).positions().enumerate() {
        if i / 3 == usize::from(box_segment) {
            intersection.push(pos);
        } else {
            line_remaining.push(pos);
        }
    }
    for pos in House::new(HouseKind::Box, box_index).positions() {
        let along = match kind {
            HouseKind::Row => pos.x(),
            HouseKind::Column => pos.y(),
            HouseKind::Box => unreachable!(),
        };
        if along != line {
            box_remaining.push(pos);
        }
    }
    (intersection, box_remaining, line_remaining)
}

/// Locked candidates: within a box/line intersection, a digit confined to
/// the intersection on one side is eliminated from the other.
pub(crate) fn locked_candidates(grid: &Grid) -> Option<Step> {
    for kind in HouseKind::LINES {
        for box_index in 0..9u8 {
            for line in 0..9u8 {
                let crosses = match kind {
                    HouseKind::Row => line / 3 == box_index / 3,
                    HouseKind::Column => line / 3 == box_index % 3,
                    HouseKind::Box => unreachable!(),
                };
                if !crosses {
                    continue;
                }
                let (intersection, box_remaining, line_remaining) =
                    box_line_intersection(box_index, kind, line);
                let cell_of = |pos: &Position| grid.cell_at(*pos);

                for digit in Digit::ALL {
                    if !any_has_candidate(intersection.iter().map(cell_of), digit) {
                        continue;
                    }
                    let in_box = any_has_candidate(box_remaining.iter().map(cell_of), digit);
                    let in_line = any_has_candidate(line_remaining.iter().map(cell_of), digit);

                    let (op, victims) = match (in_box, in_line) {
                        (false, true) => (opcode::LOCKED_POINTING, &line_remaining[..]),
                        (true, false) => (opcode::LOCKED_CLAIMING, &box_remaining[..]),
                        _ => continue,
                    };

                    let mut step = StepBuilder::new();
                    step.push(op);
                    for &pos in &intersection {
                        step.push_pos(pos);
                        step.push_digit(digit);
                    }
                    for &pos in victims {
                        if grid.cell_at(pos).candidates().contains(digit) {
                            step.add_exec(pos, digit);
                        }
                    }
                    return Some(step.finish());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use kaidoku_core::DigitSet;

    use super::*;
    use crate::{grid::unpack_executee, testing};

    #[test]
    fn test_naked_single_emits_place() {
        let mut grid = testing::unconstrained();
        testing::keep_candidates(&mut grid, Position::new(4, 4), [Digit::D5]);

        let step = naked_single(&grid).expect("naked single expected");
        assert_eq!(
            step.bytes(),
            &[
                opcode::NAKED_SINGLE,
                0x44,
                4,
                // appended executee
                0x44,
                4,
            ]
        );
        assert_eq!(step.execution().mode(), ExecMode::Place);
    }

    #[test]
    fn test_naked_single_scans_row_major() {
        let mut grid = testing::unconstrained();
        testing::keep_candidates(&mut grid, Position::new(6, 6), [Digit::D2]);
        testing::keep_candidates(&mut grid, Position::new(1, 8), [Digit::D7]);

        let step = naked_single(&grid).unwrap();
        let (pos, digit) = unpack_executee(step.execution().executees()[0]);
        assert_eq!(pos, Position::new(1, 8));
        assert_eq!(digit, Digit::D7);
    }

    #[test]
    fn test_hidden_single_in_a_row() {
        let mut grid = testing::unconstrained();
        for y in 0..9 {
            if y != 3 {
                testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D5);
            }
        }

        let step = hidden_single(&grid).expect("hidden single expected");
        assert_eq!(step.bytes(), &[opcode::HIDDEN_SINGLE, 0x03, 4]);
        assert_eq!(step.execution().mode(), ExecMode::Place);
    }

    #[test]
    fn test_hidden_single_skips_house_with_placed_digit() {
        let mut grid = testing::unconstrained();
        testing::place(&mut grid, Position::new(0, 3), Digit::D5);
        // Row 0 now has no candidate slot for 5 besides the placed cell, but
        // a placed digit means the house is done.
        for y in 0..9 {
            if y != 4 {
                testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D6);
            }
        }
        let step = hidden_single(&grid).unwrap();
        let (_, digit) = unpack_executee(step.execution().executees()[0]);
        assert_eq!(digit, Digit::D6);
    }

    #[test]
    fn test_intersection_shapes() {
        let (intersection, box_remaining, line_remaining) =
            box_line_intersection(4, HouseKind::Row, 4);
        assert_eq!(intersection.len(), 3);
        assert_eq!(box_remaining.len(), 6);
        assert_eq!(line_remaining.len(), 6);
        assert!(intersection.iter().all(|p| p.x() == 4 && p.box_index() == 4));
        assert!(box_remaining.iter().all(|p| p.box_index() == 4 && p.x() != 4));
        assert!(line_remaining.iter().all(|p| p.x() == 4 && p.box_index() != 4));
    }

    #[test]
    fn test_locked_candidates_pointing() {
        let mut grid = testing::unconstrained();
        // In box 0, digit 1 only in row 0: pointing pair/triple.
        for pos in House::new(HouseKind::Box, 0).positions() {
            if pos.x() != 0 {
                testing::remove_candidate(&mut grid, pos, Digit::D1);
            }
        }

        let step = locked_candidates(&grid).expect("pointing expected");
        assert_eq!(step.bytes()[0], opcode::LOCKED_POINTING);
        assert_eq!(step.execution().executees().len(), 6);
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert_eq!(digit, Digit::D1);
            assert_eq!(pos.x(), 0);
            assert!(pos.y() >= 3, "eliminations stay outside the box");
        }
    }

    #[test]
    fn test_locked_candidates_claiming() {
        let mut grid = testing::unconstrained();
        // In row 0, digit 4 only inside box 0: claiming.
        for y in 3..9 {
            testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D4);
        }

        let step = locked_candidates(&grid).expect("claiming expected");
        assert_eq!(step.bytes()[0], opcode::LOCKED_CLAIMING);
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert_eq!(digit, Digit::D4);
            assert_eq!(pos.box_index(), 0);
            assert!(pos.x() != 0, "eliminations stay off the claiming line");
        }
    }

    #[test]
    fn test_unconstrained_grid_yields_nothing() {
        let grid = testing::unconstrained();
        assert!(naked_single(&grid).is_none());
        assert!(hidden_single(&grid).is_none());
        assert!(locked_candidates(&grid).is_none());
    }

    #[test]
    fn test_candidate_sets_survive_helpers() {
        let mut grid = testing::unconstrained();
        testing::keep_candidates(&mut grid, Position::new(2, 2), [Digit::D1, Digit::D2]);
        let expected: DigitSet = [Digit::D1, Digit::D2].into_iter().collect();
        assert_eq!(grid.cell_at(Position::new(2, 2)).candidates(), expected);
    }

    #[test]
    fn test_pipeline_prefers_hidden_single_over_naked_pair() {
        let mut grid = testing::unconstrained();
        // A hidden single on 5 in row 0 and an applicable naked pair in
        // row 3 coexist; the pipeline must emit the single.
        for y in 0..9 {
            if y != 3 {
                testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D5);
            }
        }
        let pair = [Digit::D2, Digit::D7];
        testing::keep_candidates(&mut grid, Position::new(3, 1), pair);
        testing::keep_candidates(&mut grid, Position::new(3, 6), pair);

        let step = grid.next_step();
        assert!(!step.is_empty());
        assert_eq!(step[0], opcode::HIDDEN_SINGLE);
    }
}
