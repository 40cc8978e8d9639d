//! Single-digit coloring arguments.

use kaidoku_core::{Digit, House, HouseKind, Position, encode};

use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

/// Simple coloring: two-color a digit's strong-link graph; any uncolored
/// candidate seeing both colors is false.
pub(crate) fn simple_coloring(grid: &Grid) -> Option<Step> {
    for digit in Digit::ALL {
        let nodes: Vec<Position> = grid
            .cells()
            .filter(|cell| cell.candidates().contains(digit))
            .map(|cell| cell.pos())
            .collect();
        let index_of = |pos: Position| nodes.iter().position(|&p| p == pos);

        let mut used = vec![false; nodes.len()];
        for start in 0..nodes.len() {
            if used[start] {
                continue;
            }
            used[start] = true;

            // Alternating BFS over the strong-link slots of each cell.
            let mut colors = vec![0i8; nodes.len()];
            colors[start] = 1;
            let mut queue = std::collections::VecDeque::from([start]);
            while let Some(head) = queue.pop_front() {
                for kind in HouseKind::ALL {
                    let Some(next_id) = grid.cell_at(nodes[head]).strong_link(kind, digit)
                    else {
                        continue;
                    };
                    let Some(next) = index_of(grid.cell(next_id).pos()) else {
                        continue;
                    };
                    if colors[next] == 0 {
                        used[next] = true;
                        colors[next] = -colors[head];
                        queue.push_back(next);
                    }
                }
            }

            let mut step = StepBuilder::new();
            for (i, &pos) in nodes.iter().enumerate() {
                if colors[i] != 0 {
                    continue;
                }
                let sees_color = |color: i8| {
                    nodes
                        .iter()
                        .zip(&colors)
                        .any(|(&other, &c)| c == color && other.sees(pos))
                };
                if sees_color(1) && sees_color(-1) {
                    step.add_exec(pos, digit);
                }
            }
            if !step.has_exec() {
                continue;
            }

            step.push(opcode::SIMPLE_COLORING);
            step.push_digit(digit);
            for color in [1i8, -1] {
                let members: Vec<Position> = nodes
                    .iter()
                    .zip(&colors)
                    .filter(|&(_, &c)| c == color)
                    .map(|(&p, _)| p)
                    .collect();
                #[expect(clippy::cast_possible_truncation)]
                step.push(members.len() as u8);
                for pos in members {
                    step.push_pos(pos);
                }
            }
            return Some(step.finish());
        }
    }
    None
}

/// The single-digit board the forcing search runs on.
struct VirtualBoard {
    present: [bool; 81],
    /// Remaining candidate count per `[house kind][house index]`.
    counts: [[u8; 9]; 3],
}

impl VirtualBoard {
    fn new(grid: &Grid, digit: Digit) -> Self {
        let mut board = Self {
            present: [false; 81],
            counts: [[0; 9]; 3],
        };
        for (id, cell) in grid.cells().enumerate() {
            if cell.candidates().contains(digit) {
                board.present[id] = true;
                board.counts[0][usize::from(cell.pos().x())] += 1;
                board.counts[1][usize::from(cell.pos().y())] += 1;
                board.counts[2][usize::from(cell.pos().box_index())] += 1;
            }
        }
        board
    }

    fn remove(&mut self, pos: Position) {
        let id = Grid::id_of(pos);
        if self.present[id] {
            self.present[id] = false;
            self.counts[0][usize::from(pos.x())] -= 1;
            self.counts[1][usize::from(pos.y())] -= 1;
            self.counts[2][usize::from(pos.box_index())] -= 1;
        }
    }

    fn count(&self, kind: HouseKind, index: u8) -> u8 {
        self.counts[usize::from(kind.index())][usize::from(index)]
    }

    /// First house drained to zero that neither started empty nor holds one
    /// of the chain's placements. Scans rows, then columns, then boxes.
    fn emptied_house(&self, initial: &Self, chain: &[Position]) -> Option<(HouseKind, u8)> {
        for kind in HouseKind::ALL {
            for index in 0..9u8 {
                if self.count(kind, index) != 0 || initial.count(kind, index) == 0 {
                    continue;
                }
                let house = House::new(kind, index);
                let satisfied = chain
                    .iter()
                    .any(|&placed| House::containing(kind, placed) == house);
                if !satisfied {
                    return Some((kind, index));
                }
            }
        }
        None
    }

    /// A house left with exactly one candidate forces the next placement.
    fn forced_cell(&self) -> Option<Position> {
        for kind in HouseKind::ALL {
            for index in 0..9u8 {
                if self.count(kind, index) != 1 {
                    continue;
                }
                for pos in House::new(kind, index).positions() {
                    if self.present[Grid::id_of(pos)] {
                        return Some(pos);
                    }
                }
            }
        }
        None
    }
}

/// Single-digit forcing: assume a candidate is true, propagate forced
/// placements within the digit's virtual grid, and eliminate the starting
/// candidate if some house runs empty.
pub(crate) fn single_digit_forcing(grid: &Grid) -> Option<Step> {
    for digit in Digit::ALL {
        let initial = VirtualBoard::new(grid, digit);
        let rows_alive = initial.counts[0].iter().filter(|&&c| c > 0).count();

        for &start in &Position::ALL {
            if !initial.present[Grid::id_of(start)] {
                continue;
            }
            let mut board = VirtualBoard::new(grid, digit);
            let mut chain = vec![start];
            let mut cur = start;

            for _ in 0..rows_alive {
                board.remove(cur);
                for kind in HouseKind::ALL {
                    for peer in House::containing(kind, cur).positions() {
                        board.remove(peer);
                    }
                }
                if let Some((kind, index)) = board.emptied_house(&initial, &chain) {
                    return Some(emit_forcing(digit, &chain, kind, index, start));
                }
                let Some(next) = board.forced_cell() else {
                    break;
                };
                chain.push(next);
                cur = next;
            }
        }
    }
    None
}

fn emit_forcing(
    digit: Digit,
    chain: &[Position],
    kind: HouseKind,
    index: u8,
    start: Position,
) -> Step {
    let mut step = StepBuilder::new();
    step.add_exec(start, digit);
    step.push(opcode::SINGLE_DIGIT_FORCING);
    step.push_digit(digit);
    #[expect(clippy::cast_possible_truncation)]
    step.push(chain.len() as u8);
    for &pos in chain {
        step.push_pos(pos);
    }
    // Boxes get their own marker nibble; rows and columns use the line byte.
    step.push(match kind {
        HouseKind::Box => 0xB0 | index,
        kind => encode::line(kind, index),
    });
    step.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::unpack_executee, testing};

    /// Leaves `digit` in the house only at the listed cell indices.
    fn confine(grid: &mut Grid, house: House, digit: Digit, keep: &[Position]) {
        for pos in house.positions() {
            if !keep.contains(&pos) {
                testing::remove_candidate(grid, pos, digit);
            }
        }
    }

    #[test]
    fn test_simple_coloring_eliminates_between_colors() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D2;
        // Conjugate chain (1,1)=(7,1), (1,1)=(1,5), (1,5)=(7,5): colors make
        // (7,1) and (7,5) opposite, so the rest of row 7 sees both.
        confine(
            &mut grid,
            House::new(HouseKind::Column, 1),
            digit,
            &[Position::new(1, 1), Position::new(7, 1)],
        );
        confine(
            &mut grid,
            House::new(HouseKind::Column, 5),
            digit,
            &[Position::new(1, 5), Position::new(7, 5)],
        );
        confine(
            &mut grid,
            House::new(HouseKind::Row, 1),
            digit,
            &[Position::new(1, 1), Position::new(1, 5)],
        );

        let step = simple_coloring(&grid).expect("coloring expected");
        assert_eq!(step.bytes()[0], opcode::SIMPLE_COLORING);
        assert_eq!(step.bytes()[1], digit.index());
        // Positives (1,1),(7,5); negatives (1,5),(7,1).
        assert_eq!(&step.bytes()[2..8], &[2, 0x11, 0x75, 2, 0x15, 0x71]);
        assert_eq!(step.execution().executees().len(), 7);
        for &word in step.execution().executees() {
            let (pos, d) = unpack_executee(word);
            assert_eq!(d, digit);
            assert_eq!(pos.x(), 7, "eliminations land in the roof row");
            assert!(pos.y() != 1 && pos.y() != 5);
        }
    }

    #[test]
    fn test_forcing_chain_eliminates_its_start() {
        let mut grid = testing::unconstrained();
        let digit = Digit::D7;
        // Assuming 7 at (0,0) leaves both column 1 and column 2 forcing into
        // row 4, which cannot hold two sevens.
        confine(
            &mut grid,
            House::new(HouseKind::Column, 0),
            digit,
            &[Position::new(0, 0), Position::new(1, 0)],
        );
        for y in 1..9u8 {
            confine(
                &mut grid,
                House::new(HouseKind::Column, y),
                digit,
                &[Position::new(0, y), Position::new(1, y), Position::new(4, y)],
            );
        }

        let step = single_digit_forcing(&grid).expect("forcing chain expected");
        assert_eq!(step.bytes()[0], opcode::SINGLE_DIGIT_FORCING);
        assert_eq!(step.bytes()[1], digit.index());
        let (pos, d) = unpack_executee(step.execution().executees()[0]);
        assert_eq!(d, digit);
        assert_eq!(
            step.bytes()[3],
            pos.encode(),
            "the eliminated candidate is the chain start"
        );
        assert!(grid.cell_at(pos).candidates().contains(digit));
    }

    #[test]
    fn test_nothing_on_unconstrained_grid() {
        let grid = testing::unconstrained();
        assert!(simple_coloring(&grid).is_none());
        assert!(single_digit_forcing(&grid).is_none());
    }
}
