//! Uniqueness arguments: unique rectangles, hidden rectangles, avoidable
//! rectangles, and BUG+1.
//!
//! These techniques assume the puzzle has a unique solution and refute any
//! candidate configuration that would complete a deadly pattern. The
//! rectangle preconditions are checked against `cand_could_be` (what the
//! original givens allow) rather than the current candidates, and avoidable
//! rectangles additionally require the involved values not to be givens.

use kaidoku_core::{Digit, DigitSet, House, HouseKind, Position};

use crate::{
    Step,
    cell::Cell,
    grid::Grid,
    step::{ExecMode, StepBuilder, opcode},
};

/// Digit pairs `(hi, lo)` with `lo < hi`, in the scan order of the
/// bi-value index.
fn digit_pairs_desc() -> impl Iterator<Item = (Digit, Digit)> {
    Digit::ALL
        .into_iter()
        .enumerate()
        .flat_map(|(i, hi)| Digit::ALL[..i].iter().map(move |&lo| (hi, lo)))
}

fn could_hold_pair(cell: &Cell, hi: Digit, lo: Digit) -> bool {
    cell.cand_could_be.contains(hi) && cell.cand_could_be.contains(lo)
}

/// Type 1: a bi-value cell strong-linked to the same partners on both of
/// its digits spans three corners of a rectangle; the fourth corner drops
/// both digits.
pub(crate) fn unique_rectangle_1(grid: &Grid) -> Option<Step> {
    for (hi, lo) in digit_pairs_desc() {
        for &id in grid.bi_values_by_cands(hi, lo) {
            let cell = grid.cell(id);
            let row_partner = cell.strong_link(HouseKind::Row, hi);
            if row_partner.is_none() || row_partner != cell.strong_link(HouseKind::Row, lo) {
                continue;
            }
            let col_partner = cell.strong_link(HouseKind::Column, hi);
            if col_partner.is_none() || col_partner != cell.strong_link(HouseKind::Column, lo) {
                continue;
            }
            let pincer1 = grid.cell(row_partner?).pos();
            let pincer2 = grid.cell(col_partner?).pos();
            // At least one side of the rectangle must stay inside a box.
            if cell.pos().y() / 3 != pincer1.y() / 3 && cell.pos().x() / 3 != pincer2.x() / 3 {
                continue;
            }

            let corner = grid.cell_at(Position::new(pincer2.x(), pincer1.y()));
            if corner.value().is_some() || !could_hold_pair(corner, hi, lo) {
                continue;
            }

            let mut step = StepBuilder::new();
            for digit in [lo, hi] {
                if corner.candidates().contains(digit) {
                    step.add_exec(corner.pos(), digit);
                }
            }
            if !step.has_exec() {
                continue;
            }

            step.push(opcode::UNIQUE_RECTANGLE);
            let (row1, row2) = sorted(cell.pos().x(), pincer2.x());
            step.push_line(HouseKind::Row, row1);
            step.push_line(HouseKind::Row, row2);
            let (col1, col2) = sorted(cell.pos().y(), pincer1.y());
            step.push_line(HouseKind::Column, col1);
            step.push_line(HouseKind::Column, col2);
            step.push_digit(lo);
            step.push_digit(hi);
            return Some(step.finish());
        }
    }
    None
}

fn sorted(a: u8, b: u8) -> (u8, u8) {
    if a <= b { (a, b) } else { (b, a) }
}

/// The rectangle geometry shared by types 2-4: a naked pair along one line
/// and the two facing cells of a parallel line.
struct Rectangle {
    kind: HouseKind,
    /// Line holding the naked pair.
    floor: u8,
    /// Parallel line holding the two tails.
    roof: u8,
    /// Coordinates of the two corners along the lines.
    side1: u8,
    side2: u8,
    hi: Digit,
    lo: Digit,
    /// The pair sits inside one box (the roof may then be anywhere).
    aligned: bool,
    tail1: Position,
    tail2: Position,
}

/// Enumerates rectangles built on a bi-value cell whose both digits are
/// strong-linked to the same partner, and feeds them to `check` until one
/// emits.
fn for_each_pair_rectangle<F>(grid: &Grid, mut check: F) -> Option<Step>
where
    F: FnMut(&Grid, &Rectangle) -> Option<Step>,
{
    for (hi, lo) in digit_pairs_desc() {
        for &id in grid.bi_values_by_cands(hi, lo) {
            let cell = grid.cell(id);
            for kind in HouseKind::LINES {
                let partner = cell.strong_link(kind, hi);
                if partner.is_none() || partner != cell.strong_link(kind, lo) {
                    continue;
                }
                let partner = grid.cell(partner?).pos();

                let (floor, side1, side2) = match kind {
                    HouseKind::Row => (cell.pos().x(), cell.pos().y(), partner.y()),
                    HouseKind::Column => (cell.pos().y(), cell.pos().x(), partner.x()),
                    HouseKind::Box => unreachable!(),
                };
                let aligned = side1 / 3 == side2 / 3;

                for roof in 0..9u8 {
                    if roof == floor || (!aligned && floor / 3 != roof / 3) {
                        continue;
                    }
                    let tail1 = House::new(kind, roof).cell(side1);
                    let tail2 = House::new(kind, roof).cell(side2);
                    let ok = |pos: Position| {
                        let tail = grid.cell_at(pos);
                        tail.value().is_none() && could_hold_pair(tail, hi, lo)
                    };
                    if !ok(tail1) || !ok(tail2) {
                        continue;
                    }
                    let rect = Rectangle {
                        kind,
                        floor,
                        roof,
                        side1,
                        side2,
                        hi,
                        lo,
                        aligned,
                        tail1,
                        tail2,
                    };
                    if let Some(step) = check(grid, &rect) {
                        return Some(step);
                    }
                }
            }
        }
    }
    None
}

fn push_rectangle_lines(step: &mut StepBuilder, rect: &Rectangle, side1: u8, side2: u8) {
    step.push_line(rect.kind, rect.floor);
    step.push_line(rect.kind, rect.roof);
    step.push_line(rect.kind.crossed(), side1);
    step.push_line(rect.kind.crossed(), side2);
}

/// Type 2: both tails carry the same single extra digit, which then leaves
/// every cell seeing both tails.
pub(crate) fn unique_rectangle_2(grid: &Grid) -> Option<Step> {
    for_each_pair_rectangle(grid, |grid, rect| {
        let pair: DigitSet = [rect.hi, rect.lo].into_iter().collect();
        let extras1 = grid.cell_at(rect.tail1).candidates().difference(pair);
        let extras2 = grid.cell_at(rect.tail2).candidates().difference(pair);
        let extra = extras1.single()?;
        if !extras2.difference(extras1).is_empty() {
            return None;
        }

        let mut step = StepBuilder::new();
        for cell in grid.cells() {
            let pos = cell.pos();
            if pos == rect.tail1 || pos == rect.tail2 {
                continue;
            }
            if pos.sees(rect.tail1) && pos.sees(rect.tail2) && cell.candidates().contains(extra)
            {
                step.add_exec(pos, extra);
            }
        }
        if !step.has_exec() {
            return None;
        }

        step.push(opcode::UNIQUE_RECTANGLE + 1);
        let (side1, side2) = sorted(rect.side1, rect.side2);
        push_rectangle_lines(&mut step, rect, side1, side2);
        step.push_digit(rect.lo);
        step.push_digit(rect.hi);
        let marker = if rect.aligned { 0xF0 } else { 0x00 };
        step.push(marker | extra.index());
        Some(step.finish())
    })
}

/// Type 3: the tails' extra digits act as one virtual cell that may complete
/// a naked subset in the roof line or in the tails' box.
pub(crate) fn unique_rectangle_3(grid: &Grid) -> Option<Step> {
    for_each_pair_rectangle(grid, |grid, rect| {
        let pair: DigitSet = [rect.hi, rect.lo].into_iter().collect();
        let virtual_cell = (grid.cell_at(rect.tail1).candidates()
            | grid.cell_at(rect.tail2).candidates())
        .difference(pair);
        if virtual_cell.len() <= 1 {
            return None;
        }

        let roof_house = House::new(rect.kind, rect.roof);
        let in_line: Vec<Position> = roof_house
            .positions()
            .filter(|&pos| {
                pos != rect.tail1
                    && pos != rect.tail2
                    && grid.cell_at(pos).value().is_none()
            })
            .collect();
        if let Some(step) = virtual_naked_subset(grid, rect, virtual_cell, &in_line) {
            return Some(step);
        }

        let box_house = House::new(HouseKind::Box, rect.tail1.box_index());
        let in_box: Vec<Position> = box_house
            .positions()
            .filter(|&pos| {
                pos != rect.tail1
                    && pos != rect.tail2
                    && grid.cell_at(pos).value().is_none()
            })
            .collect();
        virtual_naked_subset(grid, rect, virtual_cell, &in_box)
    })
}

/// Searches for a naked subset formed by the virtual cell plus `size - 1`
/// house cells; the rest of the house drops the subset digits.
fn virtual_naked_subset(
    grid: &Grid,
    rect: &Rectangle,
    virtual_cell: DigitSet,
    pool: &[Position],
) -> Option<Step> {
    for size in virtual_cell.len()..=pool.len() {
        let mut chosen = vec![false; pool.len()];
        if let Some(step) = choose_subset(grid, rect, virtual_cell, pool, &mut chosen, 0, size - 1)
        {
            return Some(step);
        }
    }
    None
}

fn choose_subset(
    grid: &Grid,
    rect: &Rectangle,
    virtual_cell: DigitSet,
    pool: &[Position],
    chosen: &mut Vec<bool>,
    from: usize,
    remaining: usize,
) -> Option<Step> {
    if remaining == 0 {
        let union = pool
            .iter()
            .zip(chosen.iter())
            .filter(|&(_, &c)| c)
            .fold(virtual_cell, |acc, (&pos, _)| {
                acc | grid.cell_at(pos).candidates()
            });
        let size = chosen.iter().filter(|&&c| c).count() + 1;
        if union.len() != size {
            return None;
        }

        let mut step = StepBuilder::new();
        for (&pos, &picked) in pool.iter().zip(chosen.iter()) {
            if picked {
                continue;
            }
            for digit in grid.cell_at(pos).candidates() & union {
                step.add_exec(pos, digit);
            }
        }
        if !step.has_exec() {
            return None;
        }

        step.push(opcode::UNIQUE_RECTANGLE + 2);
        push_rectangle_lines(&mut step, rect, rect.side1, rect.side2);
        step.push_digit(rect.lo);
        step.push_digit(rect.hi);
        #[expect(clippy::cast_possible_truncation)]
        step.push(size as u8);
        for (&pos, &picked) in pool.iter().zip(chosen.iter()) {
            if picked {
                step.push_pos(pos);
            }
        }
        return Some(step.finish());
    }
    for i in from..pool.len() {
        if pool.len() - i < remaining {
            break;
        }
        chosen[i] = true;
        if let Some(step) =
            choose_subset(grid, rect, virtual_cell, pool, chosen, i + 1, remaining - 1)
        {
            return Some(step);
        }
        chosen[i] = false;
    }
    None
}

/// Type 4: if one pair digit appears nowhere else in the roof's houses, the
/// other digit leaves both tails.
pub(crate) fn unique_rectangle_4(grid: &Grid) -> Option<Step> {
    for_each_pair_rectangle(grid, |grid, rect| {
        let mut mask = DigitSet::EMPTY;
        let mut absorb = |pos: Position| {
            let cell = grid.cell_at(pos);
            if let Some(value) = cell.value() {
                mask.insert(value);
            }
            if pos != rect.tail1 && pos != rect.tail2 {
                mask |= cell.candidates();
            }
        };
        for pos in House::new(rect.kind, rect.roof).positions() {
            absorb(pos);
        }
        if rect.aligned {
            for pos in House::new(HouseKind::Box, rect.tail1.box_index()).positions() {
                absorb(pos);
            }
        }

        for (kept, dropped) in [(rect.hi, rect.lo), (rect.lo, rect.hi)] {
            if mask.contains(kept) {
                continue;
            }
            let mut step = StepBuilder::new();
            for tail in [rect.tail1, rect.tail2] {
                if grid.cell_at(tail).candidates().contains(dropped) {
                    step.add_exec(tail, dropped);
                }
            }
            if !step.has_exec() {
                continue;
            }
            step.push(opcode::UNIQUE_RECTANGLE + 3);
            push_rectangle_lines(&mut step, rect, rect.side1, rect.side2);
            step.push_digit(kept);
            step.push_digit(dropped);
            return Some(step.finish());
        }
        None
    })
}

/// The corner-based enumeration shared by type 5 and the hidden rectangle:
/// a bi-value corner plus three empty cells completing a rectangle that
/// spans exactly two boxes.
fn for_each_corner_rectangle<F>(grid: &Grid, mut check: F) -> Option<Step>
where
    F: FnMut(&Grid, &CornerRectangle) -> Option<Step>,
{
    for (hi, lo) in digit_pairs_desc() {
        for &id in grid.bi_values_by_cands(hi, lo) {
            let corner = grid.cell(id).pos();
            for row in 0..9u8 {
                if row == corner.x() {
                    continue;
                }
                let rows_aligned = row / 3 == corner.x() / 3;
                for col in 0..9u8 {
                    if col == corner.y() {
                        continue;
                    }
                    if (col / 3 != corner.y() / 3) != rows_aligned {
                        continue;
                    }
                    let same_row = Position::new(corner.x(), col);
                    let same_col = Position::new(row, corner.y());
                    let diagonal = Position::new(row, col);
                    let ok = |pos: Position| {
                        let cell = grid.cell_at(pos);
                        cell.value().is_none() && could_hold_pair(cell, hi, lo)
                    };
                    if !ok(same_row) || !ok(same_col) || !ok(diagonal) {
                        continue;
                    }
                    let rect = CornerRectangle {
                        corner,
                        same_row,
                        same_col,
                        diagonal,
                        hi,
                        lo,
                    };
                    if let Some(step) = check(grid, &rect) {
                        return Some(step);
                    }
                }
            }
        }
    }
    None
}

struct CornerRectangle {
    corner: Position,
    same_row: Position,
    same_col: Position,
    diagonal: Position,
    hi: Digit,
    lo: Digit,
}

/// Type 5: the three non-bi-value corners share a single extra digit, which
/// leaves every cell seeing all corners that hold it.
pub(crate) fn unique_rectangle_5(grid: &Grid) -> Option<Step> {
    for_each_corner_rectangle(grid, |grid, rect| {
        let pair: DigitSet = [rect.hi, rect.lo].into_iter().collect();
        let others = [rect.same_row, rect.same_col, rect.diagonal];
        let extras = others
            .iter()
            .fold(DigitSet::EMPTY, |acc, &pos| {
                acc | grid.cell_at(pos).candidates()
            })
            .difference(pair);
        let extra = extras.single()?;

        let mut step = StepBuilder::new();
        step.set_mode(ExecMode::Eliminate);
        for cell in grid.cells() {
            let pos = cell.pos();
            if pos == rect.corner || others.contains(&pos) {
                continue;
            }
            let sees_all_holders = others.iter().all(|&other| {
                !grid.cell_at(other).candidates().contains(extra) || pos.sees(other)
            });
            if sees_all_holders && cell.candidates().contains(extra) {
                step.add_exec(pos, extra);
            }
        }
        if !step.has_exec() {
            return None;
        }

        step.push(opcode::UNIQUE_RECTANGLE + 4);
        let mut corners = [
            rect.corner.encode(),
            rect.same_row.encode(),
            rect.same_col.encode(),
            rect.diagonal.encode(),
        ];
        corners.sort_unstable();
        for byte in corners {
            step.push(byte);
        }
        step.push_digit(rect.lo);
        step.push_digit(rect.hi);
        step.push_digit(extra);
        Some(step.finish())
    })
}

/// Hidden rectangle: if one pair digit is confined to the rectangle within
/// the diagonal corner's row and column, the other digit leaves the
/// diagonal corner.
pub(crate) fn hidden_rectangle(grid: &Grid) -> Option<Step> {
    for_each_corner_rectangle(grid, |grid, rect| {
        for (good, bad) in [(rect.hi, rect.lo), (rect.lo, rect.hi)] {
            if !grid.cell_at(rect.diagonal).candidates().contains(bad) {
                continue;
            }
            let row_clear = House::new(HouseKind::Row, rect.diagonal.x())
                .positions()
                .filter(|&pos| pos != rect.same_col && pos != rect.diagonal)
                .all(|pos| !grid.cell_at(pos).candidates().contains(good));
            if !row_clear {
                continue;
            }
            let col_clear = House::new(HouseKind::Column, rect.diagonal.y())
                .positions()
                .filter(|&pos| pos != rect.same_row && pos != rect.diagonal)
                .all(|pos| {
                    let cell = grid.cell_at(pos);
                    !cell.candidates().contains(good) && cell.value() != Some(good)
                });
            if !col_clear {
                continue;
            }

            let mut step = StepBuilder::new();
            step.add_exec(rect.diagonal, bad);
            step.push(opcode::HIDDEN_RECTANGLE);
            step.push_pos(rect.corner);
            step.push_pos(rect.diagonal);
            step.push_digit(good);
            step.push_digit(bad);
            return Some(step.finish());
        }
        None
    })
}

/// Avoidable rectangle type 1: three solved, non-given corners in an
/// `(a, b) / (b, a)` arrangement forbid `a` at the empty fourth corner.
pub(crate) fn avoidable_rectangle_1(grid: &Grid) -> Option<Step> {
    for start in grid.cells() {
        if start.given() {
            continue;
        }
        let Some(a) = start.value() else { continue };
        let (sx, sy) = (start.pos().x(), start.pos().y());
        for col in 0..9u8 {
            if col == sy {
                continue;
            }
            let same_row = grid.cell_at(Position::new(sx, col));
            if same_row.given() || !same_row.cand_could_be.contains(a) {
                continue;
            }
            let Some(b) = same_row.value() else { continue };
            let cols_aligned = col / 3 == sy / 3;
            for row in 0..9u8 {
                if row == sx {
                    continue;
                }
                if (sx / 3 != row / 3) != cols_aligned {
                    continue;
                }
                let same_col = grid.cell_at(Position::new(row, sy));
                if same_col.given()
                    || same_col.value() != Some(b)
                    || !same_col.cand_could_be.contains(a)
                {
                    continue;
                }
                let diagonal = grid.cell_at(Position::new(row, col));
                if diagonal.value().is_some() || !diagonal.candidates().contains(a) {
                    continue;
                }

                let mut step = StepBuilder::new();
                step.set_mode(ExecMode::Eliminate);
                step.push(opcode::AVOIDABLE_RECTANGLE_1);
                let mut corners = [
                    start.pos().encode(),
                    same_col.pos().encode(),
                    same_row.pos().encode(),
                ];
                corners.sort_unstable();
                for byte in corners {
                    step.push(byte);
                }
                step.add_exec(diagonal.pos(), a);
                return Some(step.finish());
            }
        }
    }
    None
}

/// Avoidable rectangle type 2: two solved, non-given corners plus two
/// bi-value tails sharing an extra digit; the extra leaves every cell
/// seeing both tails.
pub(crate) fn avoidable_rectangle_2(grid: &Grid) -> Option<Step> {
    for base in grid.cells() {
        if base.given() {
            continue;
        }
        let Some(a) = base.value() else { continue };
        for kind in HouseKind::LINES {
            let (along, across) = match kind {
                HouseKind::Row => (base.pos().y(), base.pos().x()),
                HouseKind::Column => (base.pos().x(), base.pos().y()),
                HouseKind::Box => unreachable!(),
            };
            for second in along + 1..9 {
                let partner = grid.house_cell(kind, across, second);
                if partner.given() {
                    continue;
                }
                let Some(b) = partner.value() else { continue };
                let aligned = second / 3 == along / 3;
                for other in 0..9u8 {
                    if other == across || (across / 3 != other / 3) != aligned {
                        continue;
                    }
                    let tail1 = grid.house_cell(kind, other, along);
                    let tail2 = grid.house_cell(kind, other, second);
                    if tail1.given() || tail2.given() {
                        continue;
                    }
                    if tail1.value().is_some() || tail2.value().is_some() {
                        continue;
                    }
                    if tail1.candidates().len() != 2 {
                        continue;
                    }
                    let Some(extra) =
                        tail1.candidates().difference(DigitSet::from_digit(b)).single()
                    else {
                        continue;
                    };
                    if !tail1.cand_could_be.contains(a) {
                        continue;
                    }
                    if tail2.candidates().len() != 2
                        || !tail2.candidates().contains(a)
                        || !tail2.candidates().contains(extra)
                        || !tail2.cand_could_be.contains(b)
                    {
                        continue;
                    }

                    let mut step = StepBuilder::new();
                    for cell in grid.cells() {
                        let pos = cell.pos();
                        if pos == base.pos() || pos == partner.pos() {
                            continue;
                        }
                        if pos.sees(tail1.pos())
                            && pos.sees(tail2.pos())
                            && cell.candidates().contains(extra)
                        {
                            step.add_exec(pos, extra);
                        }
                    }
                    if !step.has_exec() {
                        continue;
                    }

                    step.push(opcode::AVOIDABLE_RECTANGLE_2);
                    step.push_pos(base.pos());
                    step.push_pos(partner.pos());
                    step.push_pos(tail1.pos());
                    step.push_pos(tail2.pos());
                    let (first, second_digit) = if a <= b { (a, b) } else { (b, a) };
                    step.push_digit(first);
                    step.push_digit(second_digit);
                    step.push_digit(extra);
                    return Some(step.finish());
                }
            }
        }
    }
    None
}

/// BUG+1: if placing one candidate turns the whole grid into a bi-value
/// universal grave, that candidate must be true.
pub(crate) fn bug_plus_one(grid: &Grid) -> Option<Step> {
    let mut tri: Option<&Cell> = None;
    for cell in grid.cells() {
        if cell.value().is_some() {
            continue;
        }
        match cell.candidates().len() {
            2 => {}
            3 if tri.is_none() => tri = Some(cell),
            _ => return None,
        }
    }
    let tri = tri?;

    // The extra candidate occurs three times in each of the tri-cell's
    // houses; every other candidate occurs twice.
    let mut extra: Option<Digit> = None;
    for digit in tri.candidates() {
        let count_in = |house: House| {
            house
                .positions()
                .filter(|&pos| grid.cell_at(pos).candidates().contains(digit))
                .count()
        };
        let rows = count_in(House::containing(HouseKind::Row, tri.pos()));
        if rows == 2 {
            continue;
        }
        if rows != 3
            || count_in(House::containing(HouseKind::Column, tri.pos())) != 3
            || count_in(House::containing(HouseKind::Box, tri.pos())) != 3
            || extra.is_some()
        {
            return None;
        }
        extra = Some(digit);
    }
    let extra = extra?;

    // Discounting the extra at the tri-cell, every house must hold each
    // candidate exactly zero or two times.
    for house in House::ALL {
        let mut counts = [0u8; 9];
        for pos in house.positions() {
            let cell = grid.cell_at(pos);
            for digit in cell.candidates() {
                counts[usize::from(digit.index())] += 1;
            }
            if pos == tri.pos() {
                counts[usize::from(extra.index())] -= 1;
            }
        }
        if counts.iter().any(|&c| c != 0 && c != 2) {
            return None;
        }
    }

    let mut step = StepBuilder::new();
    step.set_mode(ExecMode::Place);
    step.push(opcode::BUG_PLUS_ONE);
    step.add_exec(tri.pos(), extra);
    Some(step.finish())
}
