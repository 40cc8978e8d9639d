//! Core primitives for the kaidoku Sudoku engine.
//!
//! This crate holds the board vocabulary shared by the solver and the
//! generator: type-safe digits, 9-bit candidate sets, cell positions, house
//! (row/column/box) addressing, and the compact byte encodings used by the
//! engine's instruction stream.
//!
//! # Coordinate convention
//!
//! Throughout the engine, `x` is the row (0-8, top to bottom) and `y` is the
//! column (0-8, left to right). This matches the wire format, where a cell
//! position is packed as `(x << 4) | y`.

pub use self::{
    digit::Digit,
    digit_set::DigitSet,
    house::{House, HouseKind},
    position::Position,
};

mod digit;
mod digit_set;
pub mod encode;
mod house;
mod position;
