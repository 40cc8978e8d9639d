//! XY-, XYZ-, and W-wings.

use kaidoku_core::Digit;

use super::candidates_seeing_both;
use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

/// Iterates digit pairs `(x, y)` with `x < y`.
fn digit_pairs() -> impl Iterator<Item = (Digit, Digit)> {
    Digit::ALL
        .into_iter()
        .enumerate()
        .flat_map(|(i, x)| Digit::ALL[i + 1..].iter().map(move |&y| (x, y)))
}

fn is_bi_value(grid: &Grid, id: usize, a: Digit, b: Digit) -> bool {
    let candidates = grid.cell(id).candidates();
    candidates.contains(a) && candidates.contains(b)
}

/// XY-Wing: a bi-value pivot `{x, y}` with pincers `{x, z}` and `{y, z}`
/// eliminates `z` wherever both pincers see.
pub(crate) fn xy_wing(grid: &Grid) -> Option<Step> {
    for (x, y) in digit_pairs() {
        for z in Digit::ALL {
            if z == x || z == y {
                continue;
            }
            for &pivot in grid.bi_values() {
                if !is_bi_value(grid, pivot, x, y) {
                    continue;
                }
                let pivot_pos = grid.cell(pivot).pos();
                for &x_pincer in grid.bi_values() {
                    if !is_bi_value(grid, x_pincer, x, z) {
                        continue;
                    }
                    let x_pos = grid.cell(x_pincer).pos();
                    if !pivot_pos.sees(x_pos) {
                        continue;
                    }
                    for &y_pincer in grid.bi_values() {
                        if !is_bi_value(grid, y_pincer, y, z) {
                            continue;
                        }
                        let y_pos = grid.cell(y_pincer).pos();
                        if !pivot_pos.sees(y_pos) || x_pos.sees(y_pos) {
                            continue;
                        }

                        let mut step = StepBuilder::new();
                        for victim in candidates_seeing_both(grid, x_pos, y_pos, z) {
                            step.add_exec(victim, z);
                        }
                        if !step.has_exec() {
                            continue;
                        }
                        step.push(opcode::XY_WING);
                        step.push_pos(pivot_pos);
                        step.push_pos(x_pos);
                        step.push_pos(y_pos);
                        step.push_digit(x);
                        step.push_digit(y);
                        step.push_digit(z);
                        return Some(step.finish());
                    }
                }
            }
        }
    }
    None
}

/// XYZ-Wing: the pivot is tri-value `{x, y, z}`; eliminations must see the
/// pivot and both pincers.
pub(crate) fn xyz_wing(grid: &Grid) -> Option<Step> {
    for (x, y) in digit_pairs() {
        for z in Digit::ALL {
            if z == x || z == y {
                continue;
            }
            for &x_pincer in grid.bi_values() {
                if !is_bi_value(grid, x_pincer, x, z) {
                    continue;
                }
                let x_pos = grid.cell(x_pincer).pos();
                for &y_pincer in grid.bi_values() {
                    if !is_bi_value(grid, y_pincer, y, z) {
                        continue;
                    }
                    let y_pos = grid.cell(y_pincer).pos();
                    if x_pos.sees(y_pos) {
                        continue;
                    }
                    for pivot in grid.cells() {
                        let pivot_pos = pivot.pos();
                        if !x_pos.sees(pivot_pos) || !y_pos.sees(pivot_pos) {
                            continue;
                        }
                        let candidates = pivot.candidates();
                        if candidates.len() != 3
                            || !candidates.contains(x)
                            || !candidates.contains(y)
                            || !candidates.contains(z)
                        {
                            continue;
                        }

                        let mut step = StepBuilder::new();
                        for victim in candidates_seeing_both(grid, x_pos, y_pos, z) {
                            if victim != pivot_pos && victim.sees(pivot_pos) {
                                step.add_exec(victim, z);
                            }
                        }
                        if !step.has_exec() {
                            continue;
                        }
                        step.push(opcode::XYZ_WING);
                        step.push_pos(pivot_pos);
                        step.push_pos(x_pos);
                        step.push_pos(y_pos);
                        step.push_digit(x);
                        step.push_digit(y);
                        step.push_digit(z);
                        return Some(step.finish());
                    }
                }
            }
        }
    }
    None
}

/// W-Wing: two bi-value cells `{bridge, loose}` joined through a strong link
/// on `bridge`; `loose` leaves every cell both pincers see.
pub(crate) fn w_wing(grid: &Grid) -> Option<Step> {
    for bridge in Digit::ALL {
        for &(link_a, link_b) in grid.strong_links(bridge) {
            let link_a_pos = grid.cell(link_a).pos();
            let link_b_pos = grid.cell(link_b).pos();
            for &pincer1 in grid.bi_values() {
                let cell1 = grid.cell(pincer1);
                if !cell1.candidates().contains(bridge) || !cell1.pos().sees(link_a_pos) {
                    continue;
                }
                let Some(loose) = cell1.candidates().into_iter().find(|&digit| digit != bridge)
                else {
                    continue;
                };

                for &pincer2 in grid.bi_values() {
                    if pincer2 == pincer1 {
                        continue;
                    }
                    let cell2 = grid.cell(pincer2);
                    if !is_bi_value(grid, pincer2, bridge, loose)
                        || !cell2.pos().sees(link_b_pos)
                        || cell1.pos().sees(cell2.pos())
                    {
                        continue;
                    }

                    let mut step = StepBuilder::new();
                    for victim in candidates_seeing_both(grid, cell1.pos(), cell2.pos(), loose) {
                        step.add_exec(victim, loose);
                    }
                    if !step.has_exec() {
                        continue;
                    }
                    step.push(opcode::W_WING);
                    step.push_pos(cell1.pos());
                    step.push_pos(cell2.pos());
                    step.push_digit(bridge);
                    step.push_digit(loose);
                    step.push_pos(link_a_pos);
                    step.push_pos(link_b_pos);
                    return Some(step.finish());
                }
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
    fn test_xy_wing() {
        let mut grid = testing::unconstrained();
        // Pivot (0, 0) {1, 2}, pincers (0, 4) {1, 3} and (4, 0) {2, 3}.
        testing::keep_candidates(&mut grid, Position::new(0, 0), [Digit::D1, Digit::D2]);
        testing::keep_candidates(&mut grid, Position::new(0, 4), [Digit::D1, Digit::D3]);
        testing::keep_candidates(&mut grid, Position::new(4, 0), [Digit::D2, Digit::D3]);

        let step = xy_wing(&grid).expect("xy-wing expected");
        assert_eq!(step.bytes()[0], opcode::XY_WING);
        assert_eq!(
            &step.bytes()[1..7],
            &[0x00, 0x04, 0x40, 0, 1, 2],
            "pivot, pincers, then x, y, z digit indices"
        );
        // The only cell seeing both pincers (besides the pivot) is (4, 4).
        let (pos, digit) = unpack_executee(step.execution().executees()[0]);
        assert_eq!(pos, Position::new(4, 4));
        assert_eq!(digit, Digit::D3);
    }

    #[test]
    fn test_xyz_wing_keeps_eliminations_near_pivot() {
        let mut grid = testing::unconstrained();
        // Pivot (0, 1) {1, 2, 3}; pincers (0, 7) {1, 3} and (2, 2) {2, 3}.
        testing::keep_candidates(
            &mut grid,
            Position::new(0, 1),
            [Digit::D1, Digit::D2, Digit::D3],
        );
        testing::keep_candidates(&mut grid, Position::new(0, 7), [Digit::D1, Digit::D3]);
        testing::keep_candidates(&mut grid, Position::new(2, 2), [Digit::D2, Digit::D3]);

        let step = xyz_wing(&grid).expect("xyz-wing expected");
        assert_eq!(step.bytes()[0], opcode::XYZ_WING);
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert_eq!(digit, Digit::D3);
            assert!(pos.sees(Position::new(0, 1)), "must see the pivot");
            assert!(pos.sees(Position::new(0, 7)));
            assert!(pos.sees(Position::new(2, 2)));
        }
    }

    #[test]
    fn test_w_wing_over_a_strong_link() {
        let mut grid = testing::unconstrained();
        // Strong link on 5 in row 4: only (4, 0) and (4, 8) hold it.
        for y in 1..8 {
            testing::remove_candidate(&mut grid, Position::new(4, y), Digit::D5);
        }
        // Pincers {5, 8} seeing opposite link ends.
        testing::keep_candidates(&mut grid, Position::new(2, 0), [Digit::D5, Digit::D8]);
        testing::keep_candidates(&mut grid, Position::new(6, 8), [Digit::D5, Digit::D8]);

        let step = w_wing(&grid).expect("w-wing expected");
        assert_eq!(step.bytes()[0], opcode::W_WING);
        assert_eq!(step.bytes()[3], Digit::D5.index(), "bridge digit");
        assert_eq!(step.bytes()[4], Digit::D8.index(), "loose digit");
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            assert_eq!(digit, Digit::D8);
            assert!(pos.sees(Position::new(2, 0)) && pos.sees(Position::new(6, 8)));
        }
    }

    #[test]
    fn test_no_wings_without_bi_values() {
        let grid = testing::unconstrained();
        assert!(xy_wing(&grid).is_none());
        assert!(xyz_wing(&grid).is_none());
        assert!(w_wing(&grid).is_none());
    }
}
