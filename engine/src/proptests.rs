//! Randomized playouts checking the quantified invariants against arbitrary
//! board sizes, player counts, and move choices rather than a handful of
//! fixed fixtures.

use std::collections::HashMap;

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

use crate::board::Board;
use crate::state::{GameState, Phase, PlayerColor};

const MAX_MOVES: usize = 500;

/// A playable board size plus a deterministic stream of "dice rolls" used to
/// pick among legal options at every decision point. Shrinking a failing
/// case just trims `picks`, which quickcheck does well on a `Vec`.
#[derive(Clone, Debug)]
struct Playout {
    num_players: usize,
    rows: usize,
    cols: usize,
    fish: u8,
    picks: Vec<u32>,
}

impl Arbitrary for Playout {
    fn arbitrary(g: &mut Gen) -> Playout {
        Playout {
            num_players: 2 + (u8::arbitrary(g) as usize % 3),
            rows: 4 + (u8::arbitrary(g) as usize % 4),
            cols: 4 + (u8::arbitrary(g) as usize % 4),
            fish: 1 + (u8::arbitrary(g) % 5),
            picks: (0..MAX_MOVES as u32 * 2).map(|_| u32::arbitrary(g)).collect(),
        }
    }
}

fn pick<T: Copy>(options: &[T], picks: &mut impl Iterator<Item = u32>) -> T {
    let i = picks.next().unwrap_or(0) as usize % options.len();
    options[i]
}

fn no_duplicate_penguins(state: &GameState) -> bool {
    let mut seen = std::collections::HashSet::new();
    state.players().iter().flat_map(|p| p.penguins.iter()).all(|c| seen.insert(*c))
}

#[quickcheck]
fn invariants_hold_through_a_random_playout(playout: Playout) -> bool {
    let board = Board::uniform(playout.rows, playout.cols, playout.fish);
    let Ok(mut state) = GameState::new(board, playout.num_players) else {
        return true;
    };
    let mut picks = playout.picks.into_iter();
    let mut scores_before: HashMap<PlayerColor, u32> =
        state.players().iter().map(|p| (p.color, p.score)).collect();

    // Placement: round-robin until every surviving player has a full quota.
    let mut placement_steps = 0;
    while state.phase() == Phase::PlacePenguins && !state.placement_complete() && placement_steps < MAX_MOVES {
        placement_steps += 1;
        let occupied = state.occupied();
        let open: Vec<_> = state
            .board
            .coords_row_major()
            .into_iter()
            .filter(|c| state.board.is_present(*c) && !occupied.contains(c))
            .collect();
        if open.is_empty() {
            break;
        }
        let turn = state.turn();
        let choice = pick(&open, &mut picks);
        if state.place_penguin(turn, choice).is_err() {
            return false;
        }
        if !no_duplicate_penguins(&state) {
            return false;
        }
        let counts: Vec<usize> = state.players().iter().map(|p| p.penguins.len()).collect();
        let (min, max) = (
            counts.iter().copied().min().unwrap_or(0),
            counts.iter().copied().max().unwrap_or(0),
        );
        if max - min > 1 {
            return false;
        }
    }
    state.set_phase(Phase::MovePenguins);

    // Movement: drive the game to completion, or give up after MAX_MOVES
    // steps (a quickcheck shrink target, not a hang).
    let mut steps = 0;
    while state.any_player_can_move() && steps < MAX_MOVES {
        steps += 1;
        if !state.players().iter().any(|p| p.color == state.turn()) {
            return false;
        }
        let actions = state.actions_for_current_turn();
        if actions.is_empty() {
            state.increase_turn();
            continue;
        }
        let turn = state.turn();
        let action = pick(&actions, &mut picks);
        if state.move_penguin(turn, action.from, action.to).is_err() {
            return false;
        }
        if !no_duplicate_penguins(&state) {
            return false;
        }
        for p in state.players() {
            for &penguin in &p.penguins {
                if !matches!(state.board.tile_at(penguin), Ok(Some(_))) {
                    return false;
                }
            }
            let before = *scores_before.get(&p.color).unwrap_or(&0);
            if p.score < before {
                return false;
            }
        }
        scores_before = state.players().iter().map(|p| (p.color, p.score)).collect();
    }

    true
}

#[quickcheck]
fn eject_removes_the_color_from_every_later_read(playout: Playout) -> bool {
    let board = Board::uniform(playout.rows, playout.cols, playout.fish);
    let Ok(mut state) = GameState::new(board, playout.num_players) else {
        return true;
    };
    let victim = state.turn();
    state.eject(victim);
    let turn_still_valid = state.players().is_empty() || state.players().iter().any(|p| p.color == state.turn());
    state.player(victim).is_none() && turn_still_valid
}
