//! A lazy, pull-based tree of successor game states.
//!
//! Nothing here is memoized centrally: every node recomputes its own
//! `possible_moves` from its own state, and `bfs`/`preorder` build their
//! worklists on demand rather than materializing a whole level at once.
//! Both require an explicit depth budget — there is no unbounded walk.

use crate::errors::StateError;
use crate::state::{Action, GameState, Phase};

#[derive(Clone, Debug)]
pub struct GameTree {
    state: GameState,
    possible_moves: Vec<Action>,
    depth: u32,
    incoming: Option<Action>,
    terminal: bool,
}

impl GameTree {
    pub fn new(state: GameState) -> Result<GameTree, StateError> {
        Self::at_depth(state, 0, None)
    }

    fn at_depth(state: GameState, depth: u32, incoming: Option<Action>) -> Result<GameTree, StateError> {
        if state.phase() != Phase::MovePenguins {
            return Err(StateError::PhaseTransitionRejected);
        }
        let possible_moves = state.actions_for_current_turn();
        let terminal = possible_moves.is_empty() && !state.any_player_can_move();
        Ok(GameTree {
            state,
            possible_moves,
            depth,
            incoming,
            terminal,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn incoming(&self) -> Option<Action> {
        self.incoming
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn possible_moves(&self) -> &[Action] {
        &self.possible_moves
    }

    pub fn turn_color(&self) -> crate::state::PlayerColor {
        self.state.turn()
    }

    /// Direct children: one per legal action, or exactly one "skip" child
    /// (turn advanced, nothing else changed) when the current player has no
    /// legal action but someone else can still move. Empty when terminal.
    pub fn direct_children(&self) -> Vec<GameTree> {
        if self.terminal {
            return Vec::new();
        }
        if !self.possible_moves.is_empty() {
            self.possible_moves
                .iter()
                .map(|&action| {
                    let mut next = self.state.clone();
                    next.move_penguin(self.turn_color(), action.from, action.to)
                        .expect("action was drawn from possible_moves");
                    GameTree::at_depth(next, self.depth + 1, Some(action)).expect("still in movement phase")
                })
                .collect()
        } else {
            let mut next = self.state.clone();
            next.increase_turn();
            vec![GameTree::at_depth(next, self.depth + 1, None).expect("still in movement phase")]
        }
    }

    /// Nodes up to `depth` levels down, level by level (all of level 1
    /// before any of level 2, and so on).
    pub fn bfs(&self, depth: u32) -> Vec<GameTree> {
        let mut out = Vec::new();
        if self.terminal {
            return out;
        }
        let mut frontier = vec![self.clone()];
        let mut remaining = depth;
        while remaining > 0 && !frontier.is_empty() {
            remaining -= 1;
            let mut next_frontier = Vec::new();
            for node in frontier {
                if node.is_terminal() {
                    continue;
                }
                for child in node.direct_children() {
                    out.push(child.clone());
                    next_frontier.push(child);
                }
            }
            frontier = next_frontier;
        }
        out
    }

    /// Nodes up to `depth` levels down, left subtree before root's sibling
    /// subtrees (i.e. depth-first: a child, then that child's whole
    /// preorder subtree, then the next child).
    pub fn preorder(&self, depth: u32) -> Vec<GameTree> {
        let mut out = Vec::new();
        if self.terminal || depth == 0 {
            return out;
        }
        for child in self.direct_children() {
            out.push(child.clone());
            out.extend(child.preorder(depth - 1));
        }
        out
    }

    pub fn validate_and_apply(&self, action: Action) -> Result<GameState, StateError> {
        if !self.possible_moves.contains(&action) {
            return Err(StateError::PhaseTransitionRejected);
        }
        let mut next = self.state.clone();
        next.move_penguin(self.turn_color(), action.from, action.to)
            .map_err(|_| StateError::PhaseTransitionRejected)?;
        Ok(next)
    }

    pub fn validate_and_compute_node(&self, action: Action) -> Result<GameTree, StateError> {
        let next = self.validate_and_apply(action)?;
        GameTree::at_depth(next, self.depth + 1, Some(action))
    }
}
