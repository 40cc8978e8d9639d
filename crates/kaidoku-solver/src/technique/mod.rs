//! The deduction technique library.
//!
//! Every technique is a pure function over the grid's derived indexes: it
//! scans in a deterministic order and, at the first pattern with a non-empty
//! effect, returns a finished [`Step`]. [`ORDERED`] lists the techniques in
//! the fixed pipeline order; [`Grid::next_step`](crate::Grid::next_step)
//! runs them until one emits.

use kaidoku_core::{Digit, Position};
use tinyvec::ArrayVec;

use crate::{Step, cell::Cell, grid::Grid};

mod chains;
mod coloring;
mod fish;
mod sdc;
mod single_digit;
mod singles;
mod subsets;
mod uniqueness;
mod wings;

/// A deduction technique: emits at most one finding per call.
pub(crate) type TechniqueFn = fn(&Grid) -> Option<Step>;

/// The pipeline, ordered easiest to hardest. The first technique to produce
/// a non-empty step wins, so the opcode classes climb monotonically only as
/// the easier techniques run dry.
pub(crate) const ORDERED: &[(&str, TechniqueFn)] = &[
    ("naked single", singles::naked_single),
    ("hidden single", singles::hidden_single),
    ("locked candidates", singles::locked_candidates),
    ("naked pair", subsets::naked_pair),
    ("naked triple", subsets::naked_triple),
    ("naked quad", subsets::naked_quad),
    ("hidden pair", subsets::hidden_pair),
    ("hidden triple", subsets::hidden_triple),
    ("hidden quad", subsets::hidden_quad),
    ("x-wing", fish::x_wing),
    ("swordfish", fish::swordfish),
    ("jellyfish", fish::jellyfish),
    ("w-wing", wings::w_wing),
    ("xy-wing", wings::xy_wing),
    ("xyz-wing", wings::xyz_wing),
    ("turbot fish", single_digit::turbot_fish),
    ("empty rectangle", single_digit::empty_rectangle),
    ("simple coloring", coloring::simple_coloring),
    ("x-chain", chains::x_chain),
    ("xy-chain", chains::xy_chain),
    ("finned x-wing", fish::finned_x_wing),
    ("finned swordfish", fish::finned_swordfish),
    ("finned jellyfish", fish::finned_jellyfish),
    ("sue-de-coq", sdc::sue_de_coq),
    ("unique rectangle 1", uniqueness::unique_rectangle_1),
    ("unique rectangle 2", uniqueness::unique_rectangle_2),
    ("unique rectangle 3", uniqueness::unique_rectangle_3),
    ("unique rectangle 4", uniqueness::unique_rectangle_4),
    ("unique rectangle 5", uniqueness::unique_rectangle_5),
    ("hidden rectangle", uniqueness::hidden_rectangle),
    ("avoidable rectangle 1", uniqueness::avoidable_rectangle_1),
    ("avoidable rectangle 2", uniqueness::avoidable_rectangle_2),
    ("bug+1", uniqueness::bug_plus_one),
    ("single-digit forcing", coloring::single_digit_forcing),
    ("aic", chains::aic),
    ("nice loop", chains::nice_loop),
];

/// All `k`-element subsets of `0..9`, in lexicographic order.
pub(crate) fn combinations(k: usize) -> Vec<ArrayVec<[u8; 4]>> {
    debug_assert!((2..=4).contains(&k));
    let mut out = Vec::new();
    let mut combo = ArrayVec::<[u8; 4]>::new();
    fn extend(out: &mut Vec<ArrayVec<[u8; 4]>>, combo: &mut ArrayVec<[u8; 4]>, from: u8, k: usize) {
        if combo.len() == k {
            out.push(*combo);
            return;
        }
        for next in from..9 {
            combo.push(next);
            extend(out, combo, next + 1, k);
            combo.pop();
        }
    }
    extend(&mut out, &mut combo, 0, k);
    out
}

/// Candidate cells of `digit` that see both `a` and `b`, in row-major order.
pub(crate) fn candidates_seeing_both(
    grid: &Grid,
    a: Position,
    b: Position,
    digit: Digit,
) -> Vec<Position> {
    grid.cells()
        .filter(|cell| {
            cell.candidates().contains(digit) && cell.pos().sees(a) && cell.pos().sees(b)
        })
        .map(Cell::pos)
        .collect()
}

/// Returns `true` if any of the cells carries `digit` as a candidate.
pub(crate) fn any_has_candidate<'a, I>(cells: I, digit: Digit) -> bool
where
    I: IntoIterator<Item = &'a Cell>,
{
    cells.into_iter().any(|cell| cell.candidates().contains(digit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_counts() {
        assert_eq!(combinations(2).len(), 36);
        assert_eq!(combinations(3).len(), 84);
        assert_eq!(combinations(4).len(), 126);
    }

    #[test]
    fn test_combinations_are_lexicographic_and_strictly_increasing() {
        let pairs = combinations(2);
        assert_eq!(&pairs[0][..], &[0, 1]);
        assert_eq!(&pairs[35][..], &[7, 8]);
        for combo in combinations(4) {
            assert!(combo.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_pipeline_runs_cheap_techniques_first() {
        let names: Vec<_> = ORDERED.iter().map(|&(name, _)| name).collect();
        let position = |name| names.iter().position(|&n| n == name).unwrap();
        assert_eq!(position("naked single"), 0);
        assert_eq!(position("hidden single"), 1);
        assert!(position("locked candidates") < position("naked pair"));
        assert!(position("jellyfish") < position("w-wing"));
        assert!(position("sue-de-coq") < position("unique rectangle 1"));
        assert_eq!(position("nice loop"), ORDERED.len() - 1);
    }
}
