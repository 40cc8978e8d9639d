//! House (row, column, box) addressing.

use crate::Position;

/// The three kinds of house, with the stable indices used by the strong-link
/// table and the line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HouseKind {
    /// A row; `x` is constant across the house.
    Row = 0,
    /// A column; `y` is constant across the house.
    Column = 1,
    /// A 3×3 box.
    Box = 2,
}

impl HouseKind {
    /// All three kinds, in row / column / box order.
    pub const ALL: [Self; 3] = [Self::Row, Self::Column, Self::Box];

    /// The two straight-line kinds.
    pub const LINES: [Self; 2] = [Self::Row, Self::Column];

    /// Returns the stable index of this kind (row 0, column 1, box 2).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the opposite line orientation.
    ///
    /// # Panics
    ///
    /// Panics on [`HouseKind::Box`], which has no opposite.
    #[must_use]
    pub const fn crossed(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
            Self::Box => panic!("boxes have no crossing orientation"),
        }
    }
}

/// A single house: one of the 27 rows, columns, and boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct House {
    kind: HouseKind,
    index: u8,
}

impl House {
    /// All 27 houses, rows first, then columns, then boxes.
    pub const ALL: [Self; 27] = {
        let mut all = [Self {
            kind: HouseKind::Row,
            index: 0,
        }; 27];
        let mut i = 0;
        #[expect(clippy::cast_possible_truncation)]
        while i < 9 {
            all[i].index = i as u8;
            all[i + 9] = Self {
                kind: HouseKind::Column,
                index: i as u8,
            };
            all[i + 18] = Self {
                kind: HouseKind::Box,
                index: i as u8,
            };
            i += 1;
        }
        all
    };

    /// Creates a house from its kind and index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 9 or greater.
    #[must_use]
    pub const fn new(kind: HouseKind, index: u8) -> Self {
        assert!(index < 9);
        Self { kind, index }
    }

    /// Returns the kind of this house.
    #[must_use]
    pub const fn kind(self) -> HouseKind {
        self.kind
    }

    /// Returns the index of this house within its kind (0-8).
    #[must_use]
    pub const fn index(self) -> u8 {
        self.index
    }

    /// Converts a cell index within the house (0-8) into a [`Position`].
    ///
    /// Rows map `i` to the column, columns map `i` to the row, and boxes walk
    /// their cells left to right, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `i` is 9 or greater.
    #[must_use]
    pub const fn cell(self, i: u8) -> Position {
        assert!(i < 9);
        match self.kind {
            HouseKind::Row => Position::new(self.index, i),
            HouseKind::Column => Position::new(i, self.index),
            HouseKind::Box => Position::new(
                (self.index / 3) * 3 + i / 3,
                (self.index % 3) * 3 + i % 3,
            ),
        }
    }

    /// Returns an iterator over the nine positions of this house.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (0..9).map(move |i| self.cell(i))
    }

    /// Returns the house of the given kind containing `pos`.
    #[must_use]
    pub const fn containing(kind: HouseKind, pos: Position) -> Self {
        let index = match kind {
            HouseKind::Row => pos.x(),
            HouseKind::Column => pos.y(),
            HouseKind::Box => pos.box_index(),
        };
        Self { kind, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_conversion() {
        assert_eq!(House::new(HouseKind::Row, 4).cell(7), Position::new(4, 7));
        assert_eq!(
            House::new(HouseKind::Column, 4).cell(7),
            Position::new(7, 4)
        );
        // Box 5 starts at (3, 6); cell 4 is offset (1, 1).
        assert_eq!(House::new(HouseKind::Box, 5).cell(4), Position::new(4, 7));
    }

    #[test]
    fn test_every_house_covers_nine_distinct_cells() {
        for house in House::ALL {
            let mut seen = [false; 81];
            for pos in house.positions() {
                let idx = usize::from(pos.x()) * 9 + usize::from(pos.y());
                assert!(!seen[idx], "{house:?} repeats {pos:?}");
                seen[idx] = true;
            }
        }
    }

    #[test]
    fn test_containing_is_consistent_with_cell() {
        for house in House::ALL {
            for pos in house.positions() {
                assert_eq!(House::containing(house.kind(), pos), house);
            }
        }
    }

    #[test]
    fn test_all_ordering() {
        assert_eq!(House::ALL[0].kind(), HouseKind::Row);
        assert_eq!(House::ALL[9].kind(), HouseKind::Column);
        assert_eq!(House::ALL[18].kind(), HouseKind::Box);
        assert_eq!(House::ALL[26].index(), 8);
    }
}
