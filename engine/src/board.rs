//! The hex board: a rectangular grid of tiles, each a hole or a fish count.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::coord::{Coord, Direction};
use crate::errors::BoardError;
use crate::{MAX_FISH, MIN_FISH};

/// A single tile: `None` is a hole, `Some(n)` is a tile with `n` fish.
pub type Tile = Option<u8>;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl Board {
    fn blank(rows: usize, cols: usize) -> Board {
        Board {
            rows,
            cols,
            tiles: vec![None; rows * cols],
        }
    }

    /// Every tile present with the same fish count. Useful for tests and for
    /// the concrete end-to-end scenarios that specify a uniform board.
    pub fn uniform(rows: usize, cols: usize, fish: u8) -> Board {
        debug_assert!((MIN_FISH..=MAX_FISH).contains(&fish));
        let mut board = Board::blank(rows, cols);
        for t in board.tiles.iter_mut() {
            *t = Some(fish);
        }
        board
    }

    /// Built directly from a `{coord -> fish}` map; coordinates not present
    /// are holes.
    pub fn sparse(rows: usize, cols: usize, fish: &[(Coord, u8)]) -> Result<Board, BoardError> {
        let mut board = Board::blank(rows, cols);
        for &(coord, count) in fish {
            let idx = board.index(coord)?;
            board.tiles[idx] = Some(count);
        }
        Ok(board)
    }

    /// Every tile present with a random fish count in `1..=5`, except the
    /// given holes, which are always absent. Fails if fewer than
    /// `min_one_fish_tiles` one-fish tiles can be guaranteed among the
    /// present tiles.
    pub fn randomized_with_holes(
        rows: usize,
        cols: usize,
        holes: &[Coord],
        min_one_fish_tiles: usize,
        rng: &mut impl Rng,
    ) -> Result<Board, BoardError> {
        let mut board = Board::blank(rows, cols);
        let hole_set: HashSet<Coord> = holes.iter().copied().collect();
        for &h in holes {
            board.index(h)?;
        }

        let mut present: Vec<usize> = Vec::new();
        for row in 0..rows as i64 {
            for col in 0..cols as i64 {
                let c = Coord::from_row_col(row, col);
                if hole_set.contains(&c) {
                    continue;
                }
                present.push(board.index(c).expect("in-bounds coordinate"));
            }
        }
        if present.len() < min_one_fish_tiles {
            return Err(BoardError::OutOfBounds(Coord::from_row_col(0, 0)));
        }

        present.shuffle(rng);
        for (i, &idx) in present.iter().enumerate() {
            let fish = if i < min_one_fish_tiles {
                1
            } else {
                rng.random_range(MIN_FISH..=MAX_FISH)
            };
            board.tiles[idx] = Some(fish);
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, c: Coord) -> Result<usize, BoardError> {
        if !c.is_valid_parity() {
            return Err(BoardError::BadParity(c));
        }
        let (row, col) = c.row_col();
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return Err(BoardError::OutOfBounds(c));
        }
        Ok(row as usize * self.cols + col as usize)
    }

    pub fn tile_at(&self, c: Coord) -> Result<Tile, BoardError> {
        let idx = self.index(c)?;
        Ok(self.tiles[idx])
    }

    pub fn is_present(&self, c: Coord) -> bool {
        matches!(self.tile_at(c), Ok(Some(_)))
    }

    /// Remove the tile at `c`, returning what was there. The `Result` layer
    /// exists only to reject bad coordinates; `Ok(None)` means `c` was
    /// already a hole.
    pub fn remove_tile(&mut self, c: Coord) -> Result<Tile, BoardError> {
        let idx = self.index(c)?;
        Ok(self.tiles[idx].take())
    }

    /// Coordinates reachable from `c` by following `dir`, stopping at (and
    /// excluding) the first hole or the grid edge. `c` itself is never
    /// included.
    pub fn straight_line(&self, c: Coord, dir: Direction) -> Vec<Coord> {
        self.straight_line_unblocked(c, dir, &HashSet::new())
    }

    /// Union of `straight_line` over all six directions, with `blocked`
    /// coordinates (typically: every penguin's position) treated as holes.
    pub fn reachable_from(&self, c: Coord, blocked: &HashSet<Coord>) -> Vec<Coord> {
        let mut out = Vec::new();
        for dir in Direction::ALL {
            out.extend(self.straight_line_unblocked(c, dir, blocked));
        }
        out
    }

    fn straight_line_unblocked(&self, c: Coord, dir: Direction, blocked: &HashSet<Coord>) -> Vec<Coord> {
        let mut out = Vec::new();
        let mut cur = c.step(dir);
        loop {
            match self.tile_at(cur) {
                Ok(Some(_)) if !blocked.contains(&cur) => {
                    out.push(cur);
                    cur = cur.step(dir);
                }
                _ => break,
            }
        }
        out
    }

    /// All coordinates on the board in row-major order, regardless of
    /// whether they're holes. Used by placement order and by board-wide
    /// scans.
    pub fn coords_row_major(&self) -> Vec<Coord> {
        let mut out = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows as i64 {
            for col in 0..self.cols as i64 {
                out.push(Coord::from_row_col(row, col));
            }
        }
        out
    }
}
