//! The domain error taxonomy. The referee is the only caller that should
//! ever match on these; everywhere else they just propagate with `?`.

use std::fmt;

use crate::coord::Coord;
use crate::state::PlayerColor;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BoardError {
    OutOfBounds(Coord),
    BadParity(Coord),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfBounds(c) => write!(f, "coordinate {:?} is outside the board", c),
            BoardError::BadParity(c) => write!(f, "coordinate {:?} has invalid row/column parity", c),
        }
    }
}

impl std::error::Error for BoardError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PenguinPlacementError {
    NotYourTurn { expected: PlayerColor, got: PlayerColor },
    WrongPhase,
    Board(BoardError),
    Hole(Coord),
    Occupied(Coord),
    QuotaExceeded { color: PlayerColor },
}

impl fmt::Display for PenguinPlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PenguinPlacementError::NotYourTurn { expected, got } => {
                write!(f, "expected {:?} to place, got {:?}", expected, got)
            }
            PenguinPlacementError::WrongPhase => write!(f, "not in the placement phase"),
            PenguinPlacementError::Board(e) => write!(f, "{}", e),
            PenguinPlacementError::Hole(c) => write!(f, "{:?} is a hole", c),
            PenguinPlacementError::Occupied(c) => write!(f, "{:?} is already occupied", c),
            PenguinPlacementError::QuotaExceeded { color } => {
                write!(f, "{:?} has already placed all its penguins", color)
            }
        }
    }
}

impl std::error::Error for PenguinPlacementError {}

impl From<BoardError> for PenguinPlacementError {
    fn from(e: BoardError) -> Self {
        PenguinPlacementError::Board(e)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PenguinMovementError {
    NotYourTurn { expected: PlayerColor, got: PlayerColor },
    WrongPhase,
    NoPenguinAt(Coord),
    Unreachable { from: Coord, to: Coord },
}

impl fmt::Display for PenguinMovementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PenguinMovementError::NotYourTurn { expected, got } => {
                write!(f, "expected {:?} to move, got {:?}", expected, got)
            }
            PenguinMovementError::WrongPhase => write!(f, "not in the movement phase"),
            PenguinMovementError::NoPenguinAt(c) => write!(f, "no penguin at {:?}", c),
            PenguinMovementError::Unreachable { from, to } => {
                write!(f, "{:?} cannot reach {:?} in a straight line", from, to)
            }
        }
    }
}

impl std::error::Error for PenguinMovementError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateError {
    PhaseTransitionRejected,
    PoolTooSmall { size: usize },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::PhaseTransitionRejected => write!(f, "illegal phase transition"),
            StateError::PoolTooSmall { size } => {
                write!(f, "a tournament needs at least 2 players, got {}", size)
            }
        }
    }
}

impl std::error::Error for StateError {}
