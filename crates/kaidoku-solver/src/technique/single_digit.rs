//! Single-digit patterns built from strong links: the turbot family and the
//! empty rectangle.

use kaidoku_core::{Digit, HouseKind, Position};

use super::candidates_seeing_both;
use crate::{
    Step,
    grid::Grid,
    step::{StepBuilder, opcode},
};

/// Two strong links for one digit joined by a weak link between one endpoint
/// of each; the unused endpoints become pincers.
///
/// Sub-classification by geometry: both links aligned the same way is a
/// skyscraper, aligned crosswise is a two-string kite, and any link lying
/// inside a box (not along a line) makes it a turbot fish proper.
pub(crate) fn turbot_fish(grid: &Grid) -> Option<Step> {
    for digit in Digit::ALL {
        let links = grid.strong_links(digit);
        for (i, &(a1, b1)) in links.iter().enumerate() {
            let link1 = [grid.cell(a1).pos(), grid.cell(b1).pos()];
            for &(a2, b2) in &links[i + 1..] {
                let link2 = [grid.cell(a2).pos(), grid.cell(b2).pos()];
                for e1 in 0..2 {
                    for e2 in 0..2 {
                        if link1[e1] == link2[e2] || !link1[e1].sees(link2[e2]) {
                            continue;
                        }
                        let mut bridge = [link1[e1], link2[e2]];
                        let mut pincers = [link1[1 - e1], link2[1 - e2]];
                        if pincers[0].sees(pincers[1]) {
                            continue;
                        }
                        if bridge[1] < bridge[0] {
                            bridge.swap(0, 1);
                            pincers.swap(0, 1);
                        }

                        let in_box = |link: [Position; 2]| {
                            link[0].x() != link[1].x() && link[0].y() != link[1].y()
                        };
                        let kind = if in_box(link1) || in_box(link2) {
                            2 // turbot fish proper
                        } else {
                            let vertical1 = link1[0].y() == link1[1].y();
                            let vertical2 = link2[0].y() == link2[1].y();
                            u8::from(vertical1 != vertical2) // kite if crossed
                        };

                        let mut step = StepBuilder::new();
                        for victim in candidates_seeing_both(grid, pincers[0], pincers[1], digit)
                        {
                            step.add_exec(victim, digit);
                        }
                        if !step.has_exec() {
                            continue;
                        }
                        step.push(opcode::TURBOT + kind);
                        step.push_pos(bridge[0]);
                        step.push_pos(bridge[1]);
                        step.push_pos(pincers[0]);
                        step.push_pos(pincers[1]);
                        step.push_digit(digit);
                        return Some(step.finish());
                    }
                }
            }
        }
    }
    None
}

/// Empty rectangle: a box whose candidates for a digit all sit on one row
/// and one column, combined with an aligned strong link, pins the digit at
/// the opposite corner.
pub(crate) fn empty_rectangle(grid: &Grid) -> Option<Step> {
    for digit in Digit::ALL {
        for box_index in 0..9u8 {
            if grid.filled(HouseKind::Box, box_index).contains(digit) {
                continue;
            }
            let cells: Vec<Position> = (0..9u8)
                .map(|i| grid.house_cell(HouseKind::Box, box_index, i).pos())
                .filter(|&pos| grid.cell_at(pos).candidates().contains(digit))
                .collect();

            let row_base = (box_index / 3) * 3;
            let col_base = (box_index % 3) * 3;
            let mut crossing = None;
            'rows: for row in row_base..row_base + 3 {
                for col in col_base..col_base + 3 {
                    let mut on_row = false;
                    let mut on_col = false;
                    let mut outside = false;
                    for &pos in &cells {
                        if pos.x() != row && pos.y() != col {
                            outside = true;
                            break;
                        }
                        if pos.x() == row && pos.y() == col {
                            continue; // the crossing cell itself
                        }
                        if pos.x() == row {
                            on_row = true;
                        }
                        if pos.y() == col {
                            on_col = true;
                        }
                    }
                    if !outside && on_row && on_col {
                        crossing = Some((row, col));
                        break 'rows;
                    }
                }
            }
            let Some((row, col)) = crossing else { continue };

            // A column strong link hanging off the crossing row first, then
            // a row strong link off the crossing column.
            for i in 0..9u8 {
                let pointed = grid.house_cell(HouseKind::Row, row, i);
                if pointed.pos().y() / 3 == box_index % 3 {
                    continue; // inside the box
                }
                if let Some(other) = pointed.strong_link(HouseKind::Column, digit) {
                    let other_pos = grid.cell(other).pos();
                    if other_pos.x() / 3 == box_index / 3 {
                        continue; // same band as the rectangle
                    }
                    let victim = Position::new(other_pos.x(), col);
                    if grid.cell_at(victim).candidates().contains(digit) {
                        let mut step = StepBuilder::new();
                        step.push(opcode::EMPTY_RECTANGLE);
                        step.push_line(HouseKind::Row, row);
                        step.push_line(HouseKind::Column, col);
                        step.push_pos(pointed.pos());
                        step.push_pos(other_pos);
                        step.push_digit(digit);
                        step.add_exec(victim, digit);
                        return Some(step.finish());
                    }
                }
            }
            for i in 0..9u8 {
                let pointed = grid.house_cell(HouseKind::Column, col, i);
                if pointed.pos().x() / 3 == box_index / 3 {
                    continue;
                }
                if let Some(other) = pointed.strong_link(HouseKind::Row, digit) {
                    let other_pos = grid.cell(other).pos();
                    if other_pos.y() / 3 == box_index % 3 {
                        continue;
                    }
                    let victim = Position::new(row, other_pos.y());
                    if grid.cell_at(victim).candidates().contains(digit) {
                        let mut step = StepBuilder::new();
                        step.push(opcode::EMPTY_RECTANGLE);
                        step.push_line(HouseKind::Column, col);
                        step.push_line(HouseKind::Row, row);
                        step.push_pos(pointed.pos());
                        step.push_pos(other_pos);
                        step.push_digit(digit);
                        step.add_exec(victim, digit);
                        return Some(step.finish());
                    }
                }
            }
        }
    }
    None
}
