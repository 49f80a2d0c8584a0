//! Game state: players, board, turn, and phase, plus the operations that
//! advance them.

use std::collections::HashSet;

use serde_derive::{Deserialize, Serialize};

use crate::board::Board;
use crate::coord::Coord;
use crate::errors::{PenguinMovementError, PenguinPlacementError, StateError};
use crate::penguins_per_player;

/// The four colors a penguin can be painted, in the fixed order new players
/// are assigned them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    White,
    Brown,
    Black,
}

impl PlayerColor {
    pub const ORDER: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::White,
        PlayerColor::Brown,
        PlayerColor::Black,
    ];
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub color: PlayerColor,
    pub penguins: Vec<Coord>,
    pub score: u32,
}

impl PlayerInfo {
    fn new(color: PlayerColor) -> PlayerInfo {
        PlayerInfo {
            color,
            penguins: Vec::new(),
            score: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    PlacePenguins,
    MovePenguins,
    EndGame,
}

/// An ordered `color -> info` map. A small vector beats a hash map here:
/// there are at most four players, iteration order is the turn rotation,
/// and a linear scan over four elements is cheaper than hashing a color.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    players: Vec<PlayerInfo>,
    turn: PlayerColor,
    phase: Phase,
}

/// `(from, to)`. Ordered lexicographically on `(from.y, from.x, to.y,
/// to.x)`, which is exactly the tie-break rule strategy search uses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub from: Coord,
    pub to: Coord,
}

impl Action {
    pub fn new(from: Coord, to: Coord) -> Action {
        Action { from, to }
    }

    fn tie_break_key(self) -> (i64, i64, i64, i64) {
        (self.from.y, self.from.x, self.to.y, self.to.x)
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.tie_break_key().cmp(&other.tie_break_key())
    }
}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl GameState {
    /// Colors are assigned `PlayerColor::ORDER[0..colors.len()]`, i.e. the
    /// caller is responsible for having already sorted players by age.
    pub fn new(board: Board, num_players: usize) -> Result<GameState, StateError> {
        if !(crate::MIN_PLAYERS..=crate::MAX_PLAYERS).contains(&num_players) {
            return Err(StateError::PoolTooSmall { size: num_players });
        }
        let players = PlayerColor::ORDER[..num_players]
            .iter()
            .map(|&c| PlayerInfo::new(c))
            .collect();
        Ok(GameState {
            board,
            players,
            turn: PlayerColor::ORDER[0],
            phase: Phase::PlacePenguins,
        })
    }

    /// Assembles a state directly from its parts, bypassing the normal
    /// placement-quota bookkeeping. For building test fixtures and for the
    /// JSON harness, which both need to materialize a state mid-game
    /// without replaying every turn that led to it.
    pub fn from_parts(board: Board, players: Vec<PlayerInfo>, turn: PlayerColor, phase: Phase) -> GameState {
        GameState {
            board,
            players,
            turn,
            phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> PlayerColor {
        self.turn
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn player(&self, color: PlayerColor) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| p.color == color)
    }

    fn player_mut(&mut self, color: PlayerColor) -> Option<&mut PlayerInfo> {
        self.players.iter_mut().find(|p| p.color == color)
    }

    fn player_index(&self, color: PlayerColor) -> Option<usize> {
        self.players.iter().position(|p| p.color == color)
    }

    /// Every occupied coordinate across every surviving player, used to
    /// block straight lines through other penguins.
    pub fn occupied(&self) -> HashSet<Coord> {
        self.players.iter().flat_map(|p| p.penguins.iter().copied()).collect()
    }

    pub fn quota(&self) -> usize {
        penguins_per_player(self.players.len())
    }

    /// `turn := key_after(turn)`, cyclic over the current player list.
    /// Idempotent only when exactly one player remains.
    pub fn increase_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        let idx = self.player_index(self.turn).unwrap_or(0);
        let next = (idx + 1) % self.players.len();
        self.turn = self.players[next].color;
    }

    pub fn place_penguin(&mut self, color: PlayerColor, at: Coord) -> Result<(), PenguinPlacementError> {
        if self.phase != Phase::PlacePenguins {
            return Err(PenguinPlacementError::WrongPhase);
        }
        if color != self.turn {
            return Err(PenguinPlacementError::NotYourTurn {
                expected: self.turn,
                got: color,
            });
        }
        match self.board.tile_at(at) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(PenguinPlacementError::Hole(at)),
            Err(e) => return Err(e.into()),
        }
        if self.occupied().contains(&at) {
            return Err(PenguinPlacementError::Occupied(at));
        }
        let quota = self.quota();
        let info = self.player_mut(color).expect("turn is always a live player");
        if info.penguins.len() >= quota {
            return Err(PenguinPlacementError::QuotaExceeded { color });
        }
        info.penguins.push(at);
        self.increase_turn();
        Ok(())
    }

    /// True once every surviving player has placed a full quota of
    /// penguins (or there's nobody left to place them).
    pub fn placement_complete(&self) -> bool {
        let quota = self.quota();
        self.players.iter().all(|p| p.penguins.len() >= quota)
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn move_penguin(&mut self, color: PlayerColor, from: Coord, to: Coord) -> Result<(), PenguinMovementError> {
        if self.phase != Phase::MovePenguins {
            return Err(PenguinMovementError::WrongPhase);
        }
        if color != self.turn {
            return Err(PenguinMovementError::NotYourTurn {
                expected: self.turn,
                got: color,
            });
        }
        {
            let info = self.player(color).ok_or(PenguinMovementError::NoPenguinAt(from))?;
            if !info.penguins.contains(&from) {
                return Err(PenguinMovementError::NoPenguinAt(from));
            }
        }
        let blocked = self.occupied();
        let reachable = self.board.reachable_from(from, &blocked);
        if !reachable.contains(&to) {
            return Err(PenguinMovementError::Unreachable { from, to });
        }
        let fish = self.board.tile_at(from).unwrap_or(None).unwrap_or(0);
        {
            let info = self.player_mut(color).expect("checked above");
            let slot = info.penguins.iter_mut().find(|c| **c == from).expect("checked above");
            *slot = to;
            info.score += fish as u32;
        }
        let _ = self.board.remove_tile(from);
        self.increase_turn();
        Ok(())
    }

    /// All legal moves for the current turn's player.
    pub fn actions_for_current_turn(&self) -> Vec<Action> {
        let blocked = self.occupied();
        let Some(info) = self.player(self.turn) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for &from in &info.penguins {
            for to in self.board.reachable_from(from, &blocked) {
                out.push(Action::new(from, to));
            }
        }
        out
    }

    pub fn any_player_can_move(&self) -> bool {
        let blocked = self.occupied();
        self.players
            .iter()
            .any(|p| p.penguins.iter().any(|&c| !self.board.reachable_from(c, &blocked).is_empty()))
    }

    /// Remove `color` from the game: bump the turn first if it was their
    /// turn, then drop them from the player list. If `rebuild_tree` is
    /// true (i.e. the referee is in the movement phase), the caller is
    /// responsible for rebuilding its `GameTree` afterward — this method
    /// only touches state.
    pub fn eject(&mut self, color: PlayerColor) {
        if self.turn == color {
            self.increase_turn();
        }
        self.players.retain(|p| p.color != color);
        // If ejecting the sole remaining player left `turn` stale, any
        // later read of `turn()` is meaningless anyway — the referee must
        // check `players().is_empty()` before continuing.
        if !self.players.is_empty() && self.player(self.turn).is_none() {
            self.turn = self.players[0].color;
        }
    }

    /// Winners per the end-of-game rule: survivors tied for the maximum
    /// score. Empty if there are no survivors.
    pub fn winners(&self) -> Vec<PlayerColor> {
        let Some(max) = self.players.iter().map(|p| p.score).max() else {
            return Vec::new();
        };
        self.players.iter().filter(|p| p.score == max).map(|p| p.color).collect()
    }
}
