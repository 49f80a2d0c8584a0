//! JSON wire forms and the conversions to/from internal double-height
//! representations. Every boundary crossing goes through here and nowhere
//! else — nothing outside this module should know the wire format exists.

use serde_derive::{Deserialize, Serialize};

use fish_engine::board::Board;
use fish_engine::coord::Coord;
use fish_engine::state::{Action, GameState, Phase, PlayerColor, PlayerInfo};

use crate::errors::ProtocolError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WirePlayer {
    pub color: String,
    pub score: u32,
    pub places: Vec<[i64; 2]>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireState {
    pub players: Vec<WirePlayer>,
    pub board: Vec<Vec<u8>>,
}

pub fn color_name(color: PlayerColor) -> String {
    match color {
        PlayerColor::Red => "red",
        PlayerColor::White => "white",
        PlayerColor::Brown => "brown",
        PlayerColor::Black => "black",
    }
    .to_string()
}

fn color_from_name(name: &str) -> Result<PlayerColor, ProtocolError> {
    match name {
        "red" => Ok(PlayerColor::Red),
        "white" => Ok(PlayerColor::White),
        "brown" => Ok(PlayerColor::Brown),
        "black" => Ok(PlayerColor::Black),
        _ => Err(ProtocolError::WrongShape),
    }
}

/// `[row, col]` to internal double-height. The one formula every wire
/// boundary must apply: `x = col*2` on even rows, `col*2 + 1` on odd, `y =
/// row`. `Coord::from_row_col` already implements exactly this.
pub fn coord_from_wire(pos: [i64; 2]) -> Coord {
    Coord::from_row_col(pos[0], pos[1])
}

pub fn coord_to_wire(c: Coord) -> [i64; 2] {
    let (row, col) = c.row_col();
    [row, col]
}

pub fn action_to_wire(action: Action) -> [[i64; 2]; 2] {
    [coord_to_wire(action.from), coord_to_wire(action.to)]
}

pub fn action_from_wire(pair: [[i64; 2]; 2]) -> Action {
    Action::new(coord_from_wire(pair[0]), coord_from_wire(pair[1]))
}

pub fn board_to_wire(board: &Board) -> Vec<Vec<u8>> {
    let mut rows = Vec::with_capacity(board.rows());
    for row in 0..board.rows() as i64 {
        let mut cols = Vec::with_capacity(board.cols());
        for col in 0..board.cols() as i64 {
            let c = Coord::from_row_col(row, col);
            cols.push(board.tile_at(c).unwrap_or(None).unwrap_or(0));
        }
        rows.push(cols);
    }
    rows
}

/// Board rows may be ragged; tiles missing from a short row are holes, same
/// as a zero entry.
pub fn board_from_wire(rows_json: &[Vec<u8>]) -> Board {
    let rows = rows_json.len();
    let cols = rows_json.iter().map(|r| r.len()).max().unwrap_or(0);
    let fish: Vec<(Coord, u8)> = rows_json
        .iter()
        .enumerate()
        .flat_map(|(row, cols_json)| {
            cols_json.iter().enumerate().filter_map(move |(col, &count)| {
                if count > 0 {
                    Some((Coord::from_row_col(row as i64, col as i64), count))
                } else {
                    None
                }
            })
        })
        .collect();
    Board::sparse(rows, cols, &fish).expect("wire coordinates are in-bounds by construction")
}

/// Rotates `state`'s players so the current turn's entry comes first, per
/// the wire format's convention.
pub fn state_to_wire(state: &GameState) -> WireState {
    let players = state.players();
    let turn_idx = players.iter().position(|p| p.color == state.turn()).unwrap_or(0);
    let wire_players = players[turn_idx..]
        .iter()
        .chain(players[..turn_idx].iter())
        .map(|p| WirePlayer {
            color: color_name(p.color),
            score: p.score,
            places: p.penguins.iter().map(|&c| coord_to_wire(c)).collect(),
        })
        .collect();
    WireState {
        players: wire_players,
        board: board_to_wire(&state.board),
    }
}

/// Inverse of `state_to_wire`. `phase` isn't carried on the wire, so the
/// caller supplies it — the JSON harness always reconstructs states in the
/// movement phase, mirroring `create_move_penguins_state`'s
/// `check_penguin_amount=False` escape hatch.
pub fn state_from_wire(wire: &WireState, phase: Phase) -> Result<GameState, ProtocolError> {
    if wire.players.is_empty() {
        return Err(ProtocolError::WrongShape);
    }
    let board = board_from_wire(&wire.board);
    let mut players = Vec::with_capacity(wire.players.len());
    for wp in &wire.players {
        let color = color_from_name(&wp.color)?;
        players.push(PlayerInfo {
            color,
            penguins: wp.places.iter().map(|&p| coord_from_wire(p)).collect(),
            score: wp.score,
        });
    }
    let turn = players[0].color;
    Ok(GameState::from_parts(board, players, turn, phase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_round_trips_through_wire() {
        for row in 0..6i64 {
            for col in 0..6i64 {
                let internal = coord_from_wire([row, col]);
                assert_eq!(coord_to_wire(internal), [row, col]);
            }
        }
    }

    #[test]
    fn state_round_trips_up_to_rotation() {
        let board = fish_engine::board::Board::uniform(3, 3, 2);
        let state = GameState::new(board, 2).unwrap();
        let wire = state_to_wire(&state);
        let back = state_from_wire(&wire, Phase::PlacePenguins).unwrap();
        assert_eq!(back.turn(), state.turn());
        assert_eq!(back.players().len(), state.players().len());
    }

    #[test]
    fn rotation_puts_current_turn_first() {
        let mut board = fish_engine::board::Board::uniform(3, 3, 2);
        let _ = board.remove_tile(Coord::from_row_col(0, 0));
        let state = GameState::new(fish_engine::board::Board::uniform(3, 3, 2), 3).unwrap();
        let wire = state_to_wire(&state);
        assert_eq!(wire.players[0].color, color_name(state.turn()));
    }

    #[test]
    fn ragged_board_rows_treat_missing_tiles_as_holes() {
        let board = board_from_wire(&[vec![1, 2], vec![3]]);
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 2);
        assert_eq!(board.tile_at(Coord::from_row_col(1, 1)).unwrap(), None);
    }
}
