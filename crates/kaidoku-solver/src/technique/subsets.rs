//! Naked and hidden subsets.

use kaidoku_core::{Digit, DigitSet, House, HouseKind};

use super::combinations;
use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

pub(crate) fn naked_pair(grid: &Grid) -> Option<Step> {
    naked_subset(grid, 2)
}

pub(crate) fn naked_triple(grid: &Grid) -> Option<Step> {
    naked_subset(grid, 3)
}

pub(crate) fn naked_quad(grid: &Grid) -> Option<Step> {
    naked_subset(grid, 4)
}

pub(crate) fn hidden_pair(grid: &Grid) -> Option<Step> {
    hidden_subset(grid, 2)
}

pub(crate) fn hidden_triple(grid: &Grid) -> Option<Step> {
    hidden_subset(grid, 3)
}

pub(crate) fn hidden_quad(grid: &Grid) -> Option<Step> {
    hidden_subset(grid, 4)
}

/// `k` empty cells of a house whose candidate union has exactly `k` digits
/// lock those digits; the rest of the house drops them.
fn naked_subset(grid: &Grid, k: usize) -> Option<Step> {
    let combos = combinations(k);
    for kind in HouseKind::ALL {
        for house in 0..9u8 {
            'combo: for combo in &combos {
                let mut union = DigitSet::EMPTY;
                for &i in combo {
                    let cell = grid.house_cell(kind, house, i);
                    if cell.value().is_some() {
                        continue 'combo;
                    }
                    union |= cell.candidates();
                }
                if union.len() != k {
                    continue;
                }

                let mut step = StepBuilder::new();
                for i in 0..9u8 {
                    if combo.contains(&i) {
                        continue;
                    }
                    let cell = grid.house_cell(kind, house, i);
                    if cell.value().is_some() {
                        continue;
                    }
                    for digit in union & cell.candidates() {
                        step.add_exec(cell.pos(), digit);
                    }
                }
                if !step.has_exec() {
                    continue;
                }

                #[expect(clippy::cast_possible_truncation)]
                step.push(opcode::NAKED_SUBSET + k as u8 - 2);
                for &i in combo {
                    step.push_pos(House::new(kind, house).cell(i));
                }
                for digit in union {
                    step.push_digit(digit);
                }
                return Some(step.finish());
            }
        }
    }
    None
}

/// `k` digits whose positions within a house cover exactly `k` cells lock
/// those cells; their other candidates go.
fn hidden_subset(grid: &Grid, k: usize) -> Option<Step> {
    let combos = combinations(k);
    for kind in HouseKind::ALL {
        for house in 0..9u8 {
            // Bitmask of in-house cell indices holding each digit.
            let mut positions = [0u16; 9];
            for i in 0..9u8 {
                let cell = grid.house_cell(kind, house, i);
                if cell.value().is_some() {
                    continue;
                }
                for digit in cell.candidates() {
                    positions[usize::from(digit.index())] |= 1 << i;
                }
            }

            'combo: for combo in &combos {
                let mut position_union = 0u16;
                let mut digits = DigitSet::EMPTY;
                for &d in combo {
                    let mask = positions[usize::from(d)];
                    if mask == 0 {
                        // Digit already placed in this house.
                        continue 'combo;
                    }
                    position_union |= mask;
                    digits.insert(Digit::from_index(d));
                }
                if position_union.count_ones() as usize != k {
                    continue;
                }

                let mut step = StepBuilder::new();
                for i in 0..9u8 {
                    if position_union & (1 << i) == 0 {
                        continue;
                    }
                    let cell = grid.house_cell(kind, house, i);
                    for digit in cell.candidates().difference(digits) {
                        step.add_exec(cell.pos(), digit);
                    }
                }
                if !step.has_exec() {
                    continue;
                }

                #[expect(clippy::cast_possible_truncation)]
                step.push(opcode::HIDDEN_SUBSET + k as u8 - 2);
                for i in 0..9u8 {
                    if position_union & (1 << i) != 0 {
                        step.push_pos(House::new(kind, house).cell(i));
                    }
                }
                for &d in combo {
                    step.push_digit(Digit::from_index(d));
                }
                return Some(step.finish());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use kaidoku_core::Position;

    use super::*;
    use crate::{grid::unpack_executee, testing};

    #[test]
    fn test_naked_pair_in_a_row() {
        let mut grid = testing::unconstrained();
        let pair = [Digit::D2, Digit::D7];
        testing::keep_candidates(&mut grid, Position::new(3, 1), pair);
        testing::keep_candidates(&mut grid, Position::new(3, 6), pair);

        let step = naked_pair(&grid).expect("naked pair expected");
        assert_eq!(step.bytes()[0], opcode::NAKED_SUBSET);
        // Payload: the two cells, then the two digits.
        assert_eq!(&step.bytes()[1..5], &[0x31, 0x36, 1, 6]);
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert_eq!(pos.x(), 3);
            assert!(pos.y() != 1 && pos.y() != 6);
            assert!(pair.contains(&digit));
        }
    }

    #[test]
    fn test_naked_triple_spread_over_three_cells() {
        let mut grid = testing::unconstrained();
        let digits = [Digit::D1, Digit::D4, Digit::D8];
        // Each cell holds a two-digit slice of the triple.
        testing::keep_candidates(&mut grid, Position::new(5, 0), [Digit::D1, Digit::D4]);
        testing::keep_candidates(&mut grid, Position::new(5, 4), [Digit::D4, Digit::D8]);
        testing::keep_candidates(&mut grid, Position::new(5, 8), [Digit::D1, Digit::D8]);

        let step = naked_triple(&grid).expect("naked triple expected");
        assert_eq!(step.bytes()[0], opcode::NAKED_SUBSET + 1);
        for &word in step.execution().executees() {
            let (_, digit) = unpack_executee(word);
            assert!(digits.contains(&digit));
        }
    }

    #[test]
    fn test_hidden_pair_locks_two_cells() {
        let mut grid = testing::unconstrained();
        // Digits 3 and 5 appear only at (0, 0) and (0, 7) in row 0.
        for y in 0..9 {
            if y != 0 && y != 7 {
                testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D3);
                testing::remove_candidate(&mut grid, Position::new(0, y), Digit::D5);
            }
        }

        let step = hidden_pair(&grid).expect("hidden pair expected");
        assert_eq!(step.bytes()[0], opcode::HIDDEN_SUBSET);
        assert_eq!(&step.bytes()[1..5], &[0x00, 0x07, 2, 4]);
        // Both locked cells lose all seven other candidates.
        assert_eq!(step.execution().executees().len(), 14);
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert!(pos == Position::new(0, 0) || pos == Position::new(0, 7));
            assert!(digit != Digit::D3 && digit != Digit::D5);
        }
    }

    #[test]
    fn test_naked_subset_skips_filled_cells() {
        let mut grid = testing::unconstrained();
        testing::place(&mut grid, Position::new(3, 0), Digit::D9);
        let pair = [Digit::D2, Digit::D7];
        testing::keep_candidates(&mut grid, Position::new(3, 1), pair);
        testing::keep_candidates(&mut grid, Position::new(3, 6), pair);

        let step = naked_pair(&grid).expect("pair must still be found");
        for &word in step.execution().executees() {
            let (pos, _) = unpack_executee(word);
            assert_ne!(pos, Position::new(3, 0), "filled cells take no eliminations");
        }
    }

    #[test]
    fn test_no_subset_on_unconstrained_grid() {
        let grid = testing::unconstrained();
        for k in 2..=4 {
            assert!(naked_subset(&grid, k).is_none());
            assert!(hidden_subset(&grid, k).is_none());
        }
    }
}
