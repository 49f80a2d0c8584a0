//! Double-height coordinates for a hex grid.
//!
//! A traditional Hey, That's My Fish! board is square-ish, with every odd
//! row shoved a half-hex to the right of every even row. Rather than track
//! row/column parity as a side channel, double-height coordinates fold it
//! into the coordinate itself: even rows only ever have even `x`, odd rows
//! only ever have odd `x`. Every one of the six hex directions then becomes
//! ordinary vector addition, and two coordinates are in a straight line iff
//! repeated addition of one of those six vectors walks from one to the
//! other.
//!
//! See Amit Patel's guide for the general family this scheme belongs to:
//! <https://www.redblobgames.com/grids/hexagons/#coordinates-doubled>

use serde_derive::{Deserialize, Serialize};

/// A location on the board. `y` is the row, `x` is twice the column plus the
/// row's parity.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Coord {
        Coord { x, y }
    }

    /// True iff `x` and `y` have matching parity, which is the invariant
    /// every valid double-height coordinate must satisfy.
    pub const fn is_valid_parity(self) -> bool {
        (self.x & 1) == (self.y & 1)
    }

    /// The row and column this coordinate would occupy in a row-major,
    /// zero-indexed grid. Only meaningful for coordinates with valid parity.
    pub const fn row_col(self) -> (i64, i64) {
        let row = self.y;
        let col = if row % 2 == 0 { self.x / 2 } else { (self.x - 1) / 2 };
        (row, col)
    }

    /// Build a coordinate from a zero-indexed row and column, following the
    /// same convention as `row_col`.
    pub const fn from_row_col(row: i64, col: i64) -> Coord {
        let x = if row % 2 == 0 { col * 2 } else { col * 2 + 1 };
        Coord { x, y: row }
    }

    pub const fn step(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.unit_vector();
        Coord {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The six axes a penguin may slide along. `N`/`S` move along a column;
/// the rest are the two diagonals in each direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    N,
    S,
    NE,
    SE,
    NW,
    SW,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::N,
        Direction::S,
        Direction::NE,
        Direction::SE,
        Direction::NW,
        Direction::SW,
    ];

    pub const fn unit_vector(self) -> (i64, i64) {
        match self {
            Direction::N => (0, -2),
            Direction::S => (0, 2),
            Direction::NE => (1, -1),
            Direction::SE => (1, 1),
            Direction::NW => (-1, -1),
            Direction::SW => (-1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_col_round_trip() {
        for row in 0..8 {
            for col in 0..8 {
                let c = Coord::from_row_col(row, col);
                assert!(c.is_valid_parity());
                assert_eq!(c.row_col(), (row, col));
            }
        }
    }

    #[test]
    fn even_row_has_even_x() {
        let c = Coord::from_row_col(0, 3);
        assert_eq!(c.x % 2, 0);
    }

    #[test]
    fn odd_row_has_odd_x() {
        let c = Coord::from_row_col(1, 3);
        assert_eq!(c.x % 2, 1);
    }

    #[test]
    fn step_all_six_directions_distinct() {
        let origin = Coord::new(4, 4);
        let mut seen = std::collections::HashSet::new();
        for dir in Direction::ALL {
            let stepped = origin.step(dir);
            assert!(stepped.is_valid_parity());
            assert!(seen.insert(stepped));
        }
    }

    #[test]
    fn opposite_directions_cancel() {
        let origin = Coord::new(4, 4);
        assert_eq!(origin.step(Direction::N).step(Direction::S), origin);
        assert_eq!(origin.step(Direction::NE).step(Direction::SW), origin);
        assert_eq!(origin.step(Direction::NW).step(Direction::SE), origin);
    }

    #[test]
    fn straight_line_is_repeated_addition() {
        let origin = Coord::new(2, 2);
        let one = origin.step(Direction::S);
        let two = one.step(Direction::S);
        assert_eq!(one, Coord::new(2, 4));
        assert_eq!(two, Coord::new(2, 6));
    }
}
