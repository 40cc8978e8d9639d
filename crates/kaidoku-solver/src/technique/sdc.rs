//! Sue-de-Coq: an almost-almost-locked set in a box/line intersection,
//! completed by disjoint almost-locked sets in the line and box remainders.

use kaidoku_core::{DigitSet, House, HouseKind, Position};

use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

/// A completion candidate: the chosen remainder cells, the cells left out,
/// and the chosen cells' candidate union.
struct Completion {
    chosen: Vec<Position>,
    rest: Vec<Position>,
    union: DigitSet,
}

/// Every subset of `pool` that forms an almost-locked set together with the
/// intersection cells: `|C| + |subset|` cells carrying exactly one extra
/// candidate over the combined union.
fn completions(grid: &Grid, pool: &[Position], core_union: DigitSet, core_len: usize) -> Vec<Completion> {
    let mut out = Vec::new();
    for mask in 1u32..(1 << pool.len()) {
        if mask.count_ones() as usize == pool.len() {
            continue;
        }
        let mut chosen = Vec::new();
        let mut rest = Vec::new();
        let mut union = DigitSet::EMPTY;
        for (i, &pos) in pool.iter().enumerate() {
            if mask & (1 << i) != 0 {
                chosen.push(pos);
                union |= grid.cell_at(pos).candidates();
            } else {
                rest.push(pos);
            }
        }
        if (union | core_union).len() == core_len + chosen.len() + 1 {
            out.push(Completion { chosen, rest, union });
        }
    }
    out
}

pub(crate) fn sue_de_coq(grid: &Grid) -> Option<Step> {
    for box_index in 0..9u8 {
        for kind in HouseKind::LINES {
            let lines = match kind {
                HouseKind::Row => [(box_index / 3) * 3, (box_index / 3) * 3 + 1, (box_index / 3) * 3 + 2],
                HouseKind::Column => [(box_index % 3) * 3, (box_index % 3) * 3 + 1, (box_index % 3) * 3 + 2],
                HouseKind::Box => unreachable!(),
            };
            for line in lines {
                let intersection: Vec<Position> = House::new(kind, line)
                    .positions()
                    .filter(|&pos| {
                        pos.box_index() == box_index && grid.cell_at(pos).value().is_none()
                    })
                    .collect();
                if intersection.len() < 2 {
                    continue;
                }

                // All 2-subsets first, then the full triple, as candidates
                // for the core C.
                let mut cores: Vec<Vec<Position>> = Vec::new();
                if intersection.len() == 2 {
                    cores.push(intersection.clone());
                } else {
                    cores.push(vec![intersection[0], intersection[1]]);
                    cores.push(vec![intersection[0], intersection[2]]);
                    cores.push(vec![intersection[1], intersection[2]]);
                    cores.push(intersection.clone());
                }

                for core in cores {
                    let core_union: DigitSet = core
                        .iter()
                        .fold(DigitSet::EMPTY, |acc, &pos| acc | grid.cell_at(pos).candidates());
                    // The core must be an AALS: at least two extra digits.
                    if core_union.len() < core.len() + 2 {
                        continue;
                    }

                    let line_pool: Vec<Position> = House::new(kind, line)
                        .positions()
                        .filter(|&pos| {
                            pos.box_index() != box_index && grid.cell_at(pos).value().is_none()
                        })
                        .collect();
                    let line_completions =
                        completions(grid, &line_pool, core_union, core.len());
                    if line_completions.is_empty() {
                        continue;
                    }

                    let box_pool: Vec<Position> = House::new(HouseKind::Box, box_index)
                        .positions()
                        .filter(|&pos| {
                            let along = match kind {
                                HouseKind::Row => pos.x(),
                                HouseKind::Column => pos.y(),
                                HouseKind::Box => unreachable!(),
                            };
                            along != line && grid.cell_at(pos).value().is_none()
                        })
                        .collect();
                    let box_completions = completions(grid, &box_pool, core_union, core.len());

                    for line_set in &line_completions {
                        for box_set in &box_completions {
                            // The two completions must not compete for any
                            // core digit.
                            if !(line_set.union & box_set.union & core_union).is_empty() {
                                continue;
                            }

                            let mut step = StepBuilder::new();
                            // Line leftovers lose the line union plus the
                            // core digits the box cannot take; box leftovers
                            // symmetrically.
                            let line_mask =
                                line_set.union | core_union.difference(box_set.union);
                            for &pos in &line_set.rest {
                                for digit in grid.cell_at(pos).candidates() & line_mask {
                                    step.add_exec(pos, digit);
                                }
                            }
                            let box_mask =
                                box_set.union | core_union.difference(line_set.union);
                            for &pos in &box_set.rest {
                                for digit in grid.cell_at(pos).candidates() & box_mask {
                                    step.add_exec(pos, digit);
                                }
                            }
                            if !step.has_exec() {
                                continue;
                            }

                            #[expect(clippy::cast_possible_truncation)]
                            let len = |v: &Vec<Position>| v.len() as u8;
                            step.push(opcode::SUE_DE_COQ);
                            step.push(len(&core));
                            for &pos in &core {
                                step.push_pos(pos);
                            }
                            step.push(len(&line_set.chosen));
                            for &pos in &line_set.chosen {
                                step.push_pos(pos);
                            }
                            step.push(len(&box_set.chosen));
                            for &pos in &box_set.chosen {
                                step.push_pos(pos);
                            }
                            return Some(step.finish());
                        }
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use kaidoku_core::Digit;

    use super::*;
    use crate::{grid::unpack_executee, testing};

    #[test]
    fn test_sue_de_coq_in_a_row_box_intersection() {
        let mut grid = testing::unconstrained();
        // Core (0,0),(0,1) holds {1,2,3,4}; the line completes it with
        // (0,5) = {3,4} and the box with (1,0) = {1,2}. The four digits
        // split cleanly, so the line remainder loses 3/4 and the box
        // remainder loses 1/2.
        testing::keep_candidates(
            &mut grid,
            Position::new(0, 0),
            [Digit::D1, Digit::D2, Digit::D3, Digit::D4],
        );
        testing::keep_candidates(
            &mut grid,
            Position::new(0, 1),
            [Digit::D1, Digit::D2, Digit::D3, Digit::D4],
        );
        testing::keep_candidates(&mut grid, Position::new(0, 5), [Digit::D3, Digit::D4]);
        testing::keep_candidates(&mut grid, Position::new(1, 0), [Digit::D1, Digit::D2]);

        let step = sue_de_coq(&grid).expect("sue-de-coq expected");
        assert_eq!(step.bytes()[0], opcode::SUE_DE_COQ);
        assert_eq!(step.bytes()[1], 2, "core size");
        for &word in step.execution().executees() {
            let (pos, digit) = unpack_executee(word);
            // Line leftovers lose 3/4, box leftovers lose 1/2.
            if pos.x() == 0 && pos.y() >= 2 {
                assert!(matches!(digit, Digit::D3 | Digit::D4));
            } else {
                assert!(matches!(digit, Digit::D1 | Digit::D2));
            }
        }
    }

    #[test]
    fn test_no_sue_de_coq_on_unconstrained_grid() {
        let grid = testing::unconstrained();
        assert!(sue_de_coq(&grid).is_none());
    }
}
