use kaidoku_core::{Digit, DigitSet, Position};

/// Index of a cell in the grid's fixed 81-slot arena, `x * 9 + y`.
///
/// All cross-references between cells (strong-link slots, graph nodes,
/// derived index tables) are arena indices, never pointers; their validity
/// is tied to the next derived rebuild.
pub type CellId = usize;

/// One cell of the grid.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) pos: Position,
    pub(crate) given: bool,
    pub(crate) value: Option<Digit>,
    pub(crate) candidates: DigitSet,
    /// Candidates not excluded by the givens alone. Uniqueness and avoidable
    /// rectangle techniques reason about the original puzzle shape with this.
    pub(crate) cand_could_be: DigitSet,
    pub(crate) ans: Option<Digit>,
    /// Strong-link partners, one slot per `(house kind, digit)` pair,
    /// indexed `kind * 9 + digit index`.
    pub(crate) sl: [Option<CellId>; 27],
}

impl Cell {
    pub(crate) fn new(pos: Position) -> Self {
        Self {
            pos,
            given: false,
            value: None,
            candidates: DigitSet::EMPTY,
            cand_could_be: DigitSet::FULL,
            ans: None,
            sl: [None; 27],
        }
    }

    /// Returns the position of this cell.
    #[must_use]
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Returns `true` if the cell is part of the original clue set.
    #[must_use]
    pub fn given(&self) -> bool {
        self.given
    }

    /// Returns the placed value, or `None` for an empty cell.
    #[must_use]
    pub fn value(&self) -> Option<Digit> {
        self.value
    }

    /// Returns the candidate set. Empty whenever a value is placed.
    #[must_use]
    pub fn candidates(&self) -> DigitSet {
        self.candidates
    }

    /// Returns the final solution digit, if known.
    #[must_use]
    pub fn ans(&self) -> Option<Digit> {
        self.ans
    }

    /// Returns `true` if the cell is empty and has `digit` as a candidate.
    #[must_use]
    pub fn has_candidate(&self, digit: Digit) -> bool {
        self.candidates.contains(digit)
    }

    /// Returns the strong-link partner for `digit` in the cell's house of
    /// the given kind, if that house holds exactly two candidates for it.
    #[must_use]
    pub(crate) fn strong_link(&self, kind: kaidoku_core::HouseKind, digit: Digit) -> Option<CellId> {
        self.sl[usize::from(kind.index()) * 9 + usize::from(digit.index())]
    }

    /// Returns `true` if `self` sees `other`.
    #[must_use]
    pub fn sees(&self, other: &Cell) -> bool {
        self.pos.sees(other.pos)
    }
}
