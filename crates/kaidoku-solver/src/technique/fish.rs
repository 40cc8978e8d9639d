//! Basic and finned fish.

use kaidoku_core::{Digit, HouseKind, Position};

use super::combinations;
use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

pub(crate) fn x_wing(grid: &Grid) -> Option<Step> {
    basic_fish(grid, 2)
}

pub(crate) fn swordfish(grid: &Grid) -> Option<Step> {
    basic_fish(grid, 3)
}

pub(crate) fn jellyfish(grid: &Grid) -> Option<Step> {
    basic_fish(grid, 4)
}

pub(crate) fn finned_x_wing(grid: &Grid) -> Option<Step> {
    finned_fish(grid, 2)
}

pub(crate) fn finned_swordfish(grid: &Grid) -> Option<Step> {
    finned_fish(grid, 3)
}

pub(crate) fn finned_jellyfish(grid: &Grid) -> Option<Step> {
    finned_fish(grid, 4)
}

/// `order` base lines whose candidates for a digit fall into exactly `order`
/// cover lines of the opposite orientation; the digit leaves the cover lines
/// off the bases. Bases already holding the digit as a value are skipped.
fn basic_fish(grid: &Grid, order: usize) -> Option<Step> {
    let combos = combinations(order);
    for digit in Digit::ALL {
        for kind in HouseKind::LINES {
            'base: for base in &combos {
                // Cover mask over the crossing orientation.
                let mut cover = 0u16;
                for i in 0..9u8 {
                    for &line in base {
                        let cell = grid.house_cell(kind, line, i);
                        if cell.value() == Some(digit) {
                            continue 'base;
                        }
                        if cell.candidates().contains(digit) {
                            cover |= 1 << i;
                        }
                    }
                }
                if cover.count_ones() as usize != order {
                    continue;
                }

                let mut step = StepBuilder::new();
                for c in 0..9u8 {
                    if cover & (1 << c) == 0 {
                        continue;
                    }
                    for i in 0..9u8 {
                        if base.contains(&i) {
                            continue;
                        }
                        let cell = grid.house_cell(kind.crossed(), c, i);
                        if cell.candidates().contains(digit) {
                            step.add_exec(cell.pos(), digit);
                        }
                    }
                }
                if !step.has_exec() {
                    continue;
                }

                #[expect(clippy::cast_possible_truncation)]
                step.push(opcode::FISH + order as u8 - 2);
                for &line in base {
                    step.push_line(kind, line);
                }
                for c in 0..9u8 {
                    if cover & (1 << c) != 0 {
                        step.push_line(kind.crossed(), c);
                    }
                }
                step.push_digit(digit);
                return Some(step.finish());
            }
        }
    }
    None
}

/// Fish with fins: extra base candidates outside the cover lines restrict
/// the eliminations to cover cells seeing every fin.
fn finned_fish(grid: &Grid, order: usize) -> Option<Step> {
    let combos = combinations(order);
    for digit in Digit::ALL {
        for kind in HouseKind::LINES {
            for base in &combos {
                if base
                    .iter()
                    .any(|&line| grid.filled(kind, line).contains(digit))
                {
                    continue;
                }
                'cover: for cover in &combos {
                    if cover
                        .iter()
                        .any(|&line| grid.filled(kind.crossed(), line).contains(digit))
                    {
                        continue;
                    }

                    // Fins are base candidates outside the cover lines; the
                    // kill zone is the set of cells seeing all of them.
                    let mut fins: Vec<Position> = Vec::new();
                    let mut kill_zone = [true; 81];
                    for &base_line in base {
                        for i in 0..9u8 {
                            if cover.contains(&i) {
                                continue;
                            }
                            let cell = grid.house_cell(kind, base_line, i);
                            if !cell.candidates().contains(digit) {
                                continue;
                            }
                            fins.push(cell.pos());
                            let mut alive = 0;
                            for (slot, pos) in kill_zone.iter_mut().zip(Position::ALL) {
                                *slot = *slot && cell.pos().sees(pos);
                                alive += usize::from(*slot);
                            }
                            if alive == 0 {
                                continue 'cover;
                            }
                        }
                    }

                    let mut step = StepBuilder::new();
                    for &cover_line in cover {
                        for i in 0..9u8 {
                            if base.contains(&i) {
                                continue;
                            }
                            let cell = grid.house_cell(kind.crossed(), cover_line, i);
                            let id = Grid::id_of(cell.pos());
                            if kill_zone[id] && cell.candidates().contains(digit) {
                                step.add_exec(cell.pos(), digit);
                            }
                        }
                    }
                    if !step.has_exec() {
                        continue;
                    }

                    #[expect(clippy::cast_possible_truncation)]
                    step.push(opcode::FINNED_FISH + order as u8 - 2);
                    for &line in base {
                        step.push_line(kind, line);
                    }
                    for &line in cover {
                        step.push_line(kind.crossed(), line);
                    }
                    #[expect(clippy::cast_possible_truncation)]
                    step.push(fins.len() as u8);
                    for &fin in &fins {
                        step.push_pos(fin);
                    }
                    step.push_digit(digit);
                    return Some(step.finish());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::unpack_executee, testing};

    /// Restricts `digit` in row `x` to the given columns.
    fn confine_row(grid: &mut Grid, x: u8, digit: Digit, columns: &[u8]) {
        for y in 0..9 {
            if !columns.contains(&y) {
                testing::remove_candidate(grid, Position::new(x, y), digit);
            }
        }
    }

    #[test]
    fn test_x_wing_on_rows_eliminates_in_columns() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D6;
        confine_row(&mut grid, 1, digit, &[2, 7]);
        confine_row(&mut grid, 5, digit, &[2, 7]);

        let step = x_wing(&grid).expect("x-wing expected");
        assert_eq!(step.bytes()[0], opcode::FISH);
        // Base rows 1 and 5, cover columns 2 and 7, digit index 5.
        assert_eq!(&step.bytes()[1..6], &[0x1F, 0x5F, 0xF2, 0xF7, 5]);
        assert_eq!(step.execution().executees().len(), 14);
        for &word in step.execution().executees() {
            let (pos, d) = unpack_executee(word);
            assert_eq!(d, digit);
            assert!(pos.y() == 2 || pos.y() == 7);
            assert!(pos.x() != 1 && pos.x() != 5);
        }
    }

    #[test]
    fn test_fish_skips_base_lines_holding_the_digit() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D6;
        confine_row(&mut grid, 1, digit, &[2, 7]);
        confine_row(&mut grid, 5, digit, &[2, 7]);
        // Placing the digit inside a base line disqualifies the base.
        testing::place(&mut grid, Position::new(1, 2), digit);

        if let Some(step) = basic_fish(&grid, 2) {
            let bases = &step.bytes()[1..3];
            assert!(!bases.contains(&0x1F), "row 1 can no longer be a base");
        }
    }

    #[test]
    fn test_swordfish_on_columns() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D3;
        // Three columns confined to rows {0, 4, 8}.
        for &y in &[1, 4, 6] {
            for x in 0..9 {
                if x != 0 && x != 4 && x != 8 {
                    testing::remove_candidate(&mut grid, Position::new(x, y), digit);
                }
            }
        }

        let step = swordfish(&grid).expect("swordfish expected");
        assert_eq!(step.bytes()[0], opcode::FISH + 1);
        for &word in step.execution().executees() {
            let (pos, d) = unpack_executee(word);
            assert_eq!(d, digit);
            assert!(matches!(pos.x(), 0 | 4 | 8));
            assert!(!matches!(pos.y(), 1 | 4 | 6));
        }
    }

    #[test]
    fn test_finned_x_wing_respects_the_fin() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D2;
        // Row 1 has the digit at columns 2, 7; row 5 at columns 2, 7 and a
        // fin at column 8 (same box as the (5, 7) cover cell).
        confine_row(&mut grid, 1, digit, &[2, 7]);
        confine_row(&mut grid, 5, digit, &[2, 7, 8]);

        let step = finned_fish(&grid, 2).expect("finned x-wing expected");
        assert_eq!(step.bytes()[0], opcode::FINNED_FISH);
        let fin_count = step.bytes()[5];
        assert_eq!(fin_count, 1);
        assert_eq!(step.bytes()[6], Position::new(5, 8).encode());
        for &word in step.execution().executees() {
            let (pos, d) = unpack_executee(word);
            assert_eq!(d, digit);
            // Only cover cells seeing the fin survive: column 7, rows 3-4.
            assert_eq!(pos.y(), 7);
            assert!(pos.x() == 3 || pos.x() == 4);
        }
    }

    #[test]
    fn test_no_fish_on_unconstrained_grid() {
        let grid = testing::unconstrained();
        for order in 2..=4 {
            assert!(basic_fish(&grid, order).is_none());
        }
    }
}
