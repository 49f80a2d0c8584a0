//! Tournament administration: a `Player` capability trait, the `Referee`
//! that drives one game to completion, and the `Manager` that pools
//! referees across rounds until a champion set is stable.

use std::collections::HashMap;

use fish_engine::board::Board;
use fish_engine::coord::Coord;
use fish_engine::errors::StateError;
use fish_engine::state::{Action, GameState, Phase, PlayerColor};
use fish_engine::tree::GameTree;

/// Any error a player interaction can produce that isn't a rules
/// violation — a timeout, a malformed reply, a panic caught at the
/// transport boundary. The referee treats all of these identically: the
/// player is marked failing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayerFailure;

/// The capability set a referee drives a player through. Local bots and
/// remote socket proxies both implement this; the referee never knows
/// which it's talking to.
pub trait Player {
    fn name(&self) -> &str;

    fn start(&mut self) -> bool;
    fn playing_as(&mut self, color: PlayerColor) -> bool;
    fn playing_with(&mut self, opponents: &[PlayerColor]) -> bool;

    fn setup(&mut self, state: &GameState) -> Result<Coord, PlayerFailure>;
    fn take_turn(&mut self, state: &GameState, previous_actions: &[Action]) -> Result<Action, PlayerFailure>;

    fn end(&mut self, is_winner: bool) -> bool;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KickReason {
    Cheating,
    Failing,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KickedRegistry {
    pub cheating: Vec<PlayerColor>,
    pub failing: Vec<PlayerColor>,
}

/// The outcome of one game: surviving winners (handed back so a tournament
/// manager can seat them in the next round) and the kicked-player ledger.
pub struct GameResult {
    pub winners: Vec<(PlayerColor, Box<dyn Player>)>,
    pub kicked: KickedRegistry,
}

struct Referee {
    players: Vec<(PlayerColor, Box<dyn Player>)>,
    state: GameState,
    kicked: KickedRegistry,
    history: Vec<Action>,
    last_seen: HashMap<PlayerColor, usize>,
}

impl Referee {
    fn player_mut(&mut self, color: PlayerColor) -> Option<&mut Box<dyn Player>> {
        self.players.iter_mut().find(|(c, _)| *c == color).map(|(_, p)| p)
    }

    fn is_live(&self, color: PlayerColor) -> bool {
        self.players.iter().any(|(c, _)| *c == color)
    }

    /// Remove `color` from state and roster, recording why. The movement
    /// loop rebuilds its `GameTree` from scratch on every turn anyway, so
    /// ejecting mid-movement needs no extra bookkeeping here: the next
    /// loop iteration already sees the state with `color` gone.
    fn kick(&mut self, color: PlayerColor, reason: KickReason) {
        self.state.eject(color);
        self.players.retain(|(c, _)| *c != color);
        match reason {
            KickReason::Cheating => self.kicked.cheating.push(color),
            KickReason::Failing => self.kicked.failing.push(color),
        }
    }

    fn announce_colors(&mut self) {
        let colors: Vec<PlayerColor> = self.players.iter().map(|(c, _)| *c).collect();
        for color in colors {
            let opponents: Vec<PlayerColor> = colors.iter().copied().filter(|&c| c != color).collect();
            let ack = self
                .player_mut(color)
                .map(|p| p.start() && p.playing_as(color) && p.playing_with(&opponents))
                .unwrap_or(false);
            if !ack {
                log::warn!("{:?} failed to acknowledge color assignment", color);
                self.kick(color, KickReason::Failing);
            }
        }
    }

    fn run_placement(&mut self) {
        while self.state.players().len() > 1 && !self.state.placement_complete() {
            let color = self.state.turn();
            self.run_placement_turn(color);
        }
    }

    fn run_placement_turn(&mut self, color: PlayerColor) {
        let snapshot = self.state.clone();
        let reply = match self.player_mut(color) {
            Some(p) => p.setup(&snapshot),
            None => return,
        };
        match reply {
            Ok(coord) => {
                if self.state.place_penguin(color, coord).is_err() {
                    log::info!("{:?} proposed an illegal placement at {:?}", color, coord);
                    self.kick(color, KickReason::Cheating);
                }
            }
            Err(PlayerFailure) => {
                log::info!("{:?} failed to respond to a placement request", color);
                self.kick(color, KickReason::Failing);
            }
        }
    }

    fn run_movement(&mut self) {
        self.state.set_phase(Phase::MovePenguins);
        loop {
            if self.state.players().is_empty() || !self.state.any_player_can_move() {
                break;
            }
            let tree = match GameTree::new(self.state.clone()) {
                Ok(t) => t,
                Err(_) => break,
            };
            if tree.is_terminal() {
                break;
            }
            if tree.possible_moves().is_empty() {
                self.state.increase_turn();
                continue;
            }
            let color = tree.turn_color();
            self.run_movement_turn(color, &tree);
        }
    }

    fn run_movement_turn(&mut self, color: PlayerColor, tree: &GameTree) {
        let snapshot = self.state.clone();
        let seen = *self.last_seen.get(&color).unwrap_or(&0);
        let previous: Vec<Action> = self.history[seen..].to_vec();
        let reply = match self.player_mut(color) {
            Some(p) => p.take_turn(&snapshot, &previous),
            None => return,
        };
        self.last_seen.insert(color, self.history.len());
        match reply {
            Ok(action) => {
                if tree.possible_moves().contains(&action) {
                    self.state
                        .move_penguin(color, action.from, action.to)
                        .expect("action was validated against the tree's possible moves");
                    self.history.push(action);
                } else {
                    log::info!("{:?} proposed an illegal move {:?}", color, action);
                    self.kick(color, KickReason::Cheating);
                }
            }
            Err(PlayerFailure) => {
                log::info!("{:?} failed to respond to a move request", color);
                self.kick(color, KickReason::Failing);
            }
        }
    }

    /// Winners are notified first; a winner that fails to acknowledge is
    /// recorded as failing but the winner list itself is not recomputed.
    fn report(mut self) -> GameResult {
        let winner_colors = self.state.winners();
        for &color in &winner_colors {
            let acked = self.player_mut(color).map(|p| p.end(true)).unwrap_or(false);
            if !acked {
                self.kicked.failing.push(color);
            }
        }
        for (color, player) in self.players.iter_mut() {
            if !winner_colors.contains(color) {
                player.end(false);
            }
        }
        self.players.retain(|(color, _)| winner_colors.contains(color));
        let winners = self.players.into_iter().collect();
        GameResult {
            winners,
            kicked: self.kicked,
        }
    }
}

/// Runs one complete game: color announcement, placement, movement, and
/// reporting. `players` is assumed already sorted by age; colors are
/// assigned in `PlayerColor::ORDER`.
pub fn run_game(rows: usize, cols: usize, fish_per_tile: u8, players: Vec<Box<dyn Player>>) -> GameResult {
    let board = Board::uniform(rows, cols, fish_per_tile);
    let state = GameState::new(board, players.len()).expect("caller guarantees 2..=4 players");
    run_from_state(players, state)
}

/// Runs a game starting from an already-constructed state — used by the
/// JSON harness to resume mid-game, and by tests.
pub fn run_from_state(players: Vec<Box<dyn Player>>, state: GameState) -> GameResult {
    let assigned: Vec<(PlayerColor, Box<dyn Player>)> =
        PlayerColor::ORDER.iter().copied().zip(players).collect();
    let mut referee = Referee {
        players: assigned,
        state,
        kicked: KickedRegistry::default(),
        history: Vec::new(),
        last_seen: HashMap::new(),
    };
    referee.announce_colors();
    if referee.state.phase() == Phase::PlacePenguins {
        referee.run_placement();
        if referee.state.players().len() > 1 {
            referee.run_movement();
        }
    } else if referee.state.phase() == Phase::MovePenguins {
        referee.run_movement();
    }
    referee.state.set_phase(Phase::EndGame);
    referee.report()
}

/// Fires once per completed tournament round. Purely a notification sink —
/// it cannot change the tournament's outcome.
pub trait Observer {
    fn on_round_complete(&mut self, round: u32, winners: &[String]);
}

pub struct Competitor {
    pub age: u32,
    pub player: Box<dyn Player>,
}

pub struct TournamentReport {
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub cheaters: Vec<String>,
}

pub struct Manager {
    max_game_size: usize,
    rows: usize,
    cols: usize,
    fish_per_tile: u8,
    observer: Option<Box<dyn Observer>>,
}

impl Manager {
    pub fn new(rows: usize, cols: usize, fish_per_tile: u8) -> Manager {
        Manager {
            max_game_size: 4,
            rows,
            cols,
            fish_per_tile,
            observer: None,
        }
    }

    pub fn with_max_game_size(mut self, max_game_size: usize) -> Manager {
        assert!(
            (2..=fish_engine::MAX_PLAYERS).contains(&max_game_size),
            "a game seats between two and {} players",
            fish_engine::MAX_PLAYERS
        );
        self.max_game_size = max_game_size;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Manager {
        self.observer = Some(observer);
        self
    }

    /// Greedily groups `pool` into games of `max_size`, dissolving and
    /// redistributing a trailing singleton rather than running a one-player
    /// "game", and running an undersized final game for any other
    /// remainder.
    fn allocate_games<T>(pool: Vec<T>, max_size: usize) -> Vec<Vec<T>> {
        let p = pool.len();
        if p <= max_size {
            return vec![pool];
        }
        let full_chunks = p / max_size;
        let remainder = p % max_size;

        let mut remaining = pool;
        let mut games: Vec<Vec<T>> = Vec::new();
        for _ in 0..full_chunks {
            let chunk: Vec<T> = remaining.drain(..max_size).collect();
            games.push(chunk);
        }
        let rest = remaining;

        if remainder == 0 {
            games
        } else if remainder == 1 && max_size >= 2 {
            let mut last = games.pop().unwrap_or_default();
            last.extend(rest);
            games.extend(Self::allocate_games(last, max_size - 1));
            games
        } else {
            games.push(rest);
            games
        }
    }

    /// Runs the tournament to completion: repeated rounds of games over a
    /// shrinking survivor pool, until one survivor remains, two consecutive
    /// rounds produce the same survivor set, or the survivor set has fit in
    /// a single game for one round already (that round is always played to
    /// a decisive conclusion before the tournament ends on its result —
    /// fitting in one game only schedules the *next* round as the last).
    pub fn run_tournament(&mut self, mut pool: Vec<Competitor>) -> Result<TournamentReport, StateError> {
        if pool.len() < 2 {
            return Err(StateError::PoolTooSmall { size: pool.len() });
        }
        pool.sort_by_key(|c| c.age);
        let original_names: Vec<String> = pool.iter().map(|c| c.player.name().to_string()).collect();

        let mut survivors = pool;
        let mut cheaters: Vec<String> = Vec::new();
        let mut previous_round_names: Option<Vec<String>> = None;
        let mut round: u32 = 0;
        let mut last_round = false;

        loop {
            round += 1;
            survivors.sort_by_key(|c| c.age);
            let games = Self::allocate_games(survivors, self.max_game_size);

            let mut next_survivors: Vec<Competitor> = Vec::new();
            let mut round_winner_names: Vec<String> = Vec::new();

            for game in games {
                let names: Vec<String> = game.iter().map(|c| c.player.name().to_string()).collect();
                let ages: Vec<u32> = game.iter().map(|c| c.age).collect();
                let boxed: Vec<Box<dyn Player>> = game.into_iter().map(|c| c.player).collect();

                let result = run_game(self.rows, self.cols, self.fish_per_tile, boxed);

                for &color in &result.kicked.cheating {
                    if let Some(i) = PlayerColor::ORDER.iter().position(|&c| c == color) {
                        if let Some(name) = names.get(i) {
                            cheaters.push(name.clone());
                        }
                    }
                }

                for (color, player) in result.winners {
                    let i = PlayerColor::ORDER.iter().position(|&c| c == color).expect("color was assigned");
                    round_winner_names.push(names[i].clone());
                    next_survivors.push(Competitor {
                        age: ages[i],
                        player,
                    });
                }
            }

            round_winner_names.sort();
            if let Some(observer) = self.observer.as_mut() {
                observer.on_round_complete(round, &round_winner_names);
            }

            let stable = previous_round_names.as_ref() == Some(&round_winner_names);
            let exhausted = next_survivors.len() <= 1;
            let done = exhausted || stable || last_round;

            if !done && next_survivors.len() <= self.max_game_size {
                last_round = true;
            }

            survivors = next_survivors;
            previous_round_names = Some(round_winner_names);

            if done {
                break;
            }
        }

        let final_names: std::collections::HashSet<String> =
            survivors.iter().map(|c| c.player.name().to_string()).collect();
        let winners: Vec<String> = original_names.iter().filter(|n| final_names.contains(*n)).cloned().collect();
        let losers: Vec<String> = original_names.into_iter().filter(|n| !final_names.contains(n)).collect();

        Ok(TournamentReport { winners, losers, cheaters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fish_engine::coord::Coord;

    /// A player that always proposes the first open cell and, once in the
    /// movement phase, the first legal move in `Action`'s tie-break order.
    struct Greedy {
        name: String,
    }

    impl Player for Greedy {
        fn name(&self) -> &str {
            &self.name
        }
        fn start(&mut self) -> bool {
            true
        }
        fn playing_as(&mut self, _color: PlayerColor) -> bool {
            true
        }
        fn playing_with(&mut self, _opponents: &[PlayerColor]) -> bool {
            true
        }
        fn setup(&mut self, state: &GameState) -> Result<Coord, PlayerFailure> {
            fish_strategy::find_next_placement(state).map_err(|_| PlayerFailure)
        }
        fn take_turn(&mut self, state: &GameState, _previous_actions: &[Action]) -> Result<Action, PlayerFailure> {
            fish_strategy::find_next_move(state, 1).ok_or(PlayerFailure)
        }
        fn end(&mut self, _is_winner: bool) -> bool {
            true
        }
    }

    /// Always proposes an off-grid placement; never gets past round one.
    struct Cheater {
        name: String,
    }

    impl Player for Cheater {
        fn name(&self) -> &str {
            &self.name
        }
        fn start(&mut self) -> bool {
            true
        }
        fn playing_as(&mut self, _color: PlayerColor) -> bool {
            true
        }
        fn playing_with(&mut self, _opponents: &[PlayerColor]) -> bool {
            true
        }
        fn setup(&mut self, _state: &GameState) -> Result<Coord, PlayerFailure> {
            Ok(Coord::new(-1, -1))
        }
        fn take_turn(&mut self, _state: &GameState, _previous_actions: &[Action]) -> Result<Action, PlayerFailure> {
            Ok(Action::new(Coord::new(-1, -1), Coord::new(-1, -1)))
        }
        fn end(&mut self, _is_winner: bool) -> bool {
            true
        }
    }

    #[test]
    fn s6_cheater_is_ejected_and_legal_player_wins() {
        let players: Vec<Box<dyn Player>> = vec![
            Box::new(Cheater { name: "cheater".into() }),
            Box::new(Greedy { name: "honest".into() }),
        ];
        let result = run_game(5, 5, 2, players);
        assert_eq!(result.kicked.cheating.len(), 1);
        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].1.name(), "honest");
    }

    /// Records how many rounds actually ran, without affecting the
    /// tournament's outcome.
    struct RoundCounter(std::rc::Rc<std::cell::Cell<u32>>);

    impl Observer for RoundCounter {
        fn on_round_complete(&mut self, round: u32, _winners: &[String]) {
            self.0.set(round);
        }
    }

    #[test]
    fn s5_identical_survivors_trigger_stability_not_a_further_round() {
        // A single-row board has no diagonal or vertical neighbor in
        // bounds, so no penguin can ever move: every 2-player game on it
        // ties 0-0, and every player in the pool survives every round.
        // With a max game size of 2, round one's survivor set (all 8) is
        // never small enough to stop on size alone, so without the
        // stability check the manager would loop forever; it must instead
        // recognize that round two reproduces round one's exact survivor
        // set and stop there.
        let pool: Vec<Competitor> = (0..8u32)
            .map(|age| Competitor {
                age,
                player: Box::new(Greedy { name: format!("p{}", age) }) as Box<dyn Player>,
            })
            .collect();

        let rounds_run = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut manager = Manager::new(1, 8, 1)
            .with_max_game_size(2)
            .with_observer(Box::new(RoundCounter(rounds_run.clone())));
        let report = manager.run_tournament(pool).unwrap();

        assert_eq!(report.winners.len(), 8);
        assert!(report.losers.is_empty());
        assert!(report.cheaters.is_empty());
        assert_eq!(rounds_run.get(), 2);
    }

    #[test]
    fn decisive_round_is_always_played_before_the_tournament_ends() {
        // Two games of 4, each seeded with one honest player and three
        // cheaters who are ejected on their first placement, leave exactly
        // one survivor per game — a pool of 8 collapses to 2 after round
        // one, small enough to fit in a single game. The manager must still
        // play that game as round two rather than crowning both survivors
        // on the spot.
        let pool: Vec<Competitor> = (0..8u32)
            .map(|age| {
                let player: Box<dyn Player> = if age == 0 || age == 4 {
                    Box::new(Greedy { name: format!("honest{}", age) })
                } else {
                    Box::new(Cheater { name: format!("cheater{}", age) })
                };
                Competitor { age, player }
            })
            .collect();

        let rounds_run = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut manager = Manager::new(5, 5, 2).with_observer(Box::new(RoundCounter(rounds_run.clone())));
        let report = manager.run_tournament(pool).unwrap();

        assert_eq!(rounds_run.get(), 2);
        assert!(report.winners.iter().all(|n| n.starts_with("honest")));
        assert!(report.losers.iter().all(|n| n.starts_with("cheater")));
    }

    #[test]
    fn allocate_games_splits_evenly() {
        let pool: Vec<u32> = (0..8).collect();
        let games = Manager::allocate_games(pool, 4);
        assert_eq!(games, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn allocate_games_dissolves_trailing_singleton() {
        // 9 players, max 4: one chunk of 4, then a lone 5th player gets
        // folded back in and redistributed at size 3.
        let pool: Vec<u32> = (0..9).collect();
        let games = Manager::allocate_games(pool, 4);
        let total: usize = games.iter().map(|g| g.len()).sum();
        assert_eq!(total, 9);
        assert!(games.iter().all(|g| g.len() >= 2));
    }

    #[test]
    fn allocate_games_keeps_small_remainder_as_its_own_game() {
        let pool: Vec<u32> = (0..6).collect();
        let games = Manager::allocate_games(pool, 4);
        assert_eq!(games, vec![vec![0, 1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn single_undersized_pool_is_one_game() {
        let pool: Vec<u32> = (0..3).collect();
        let games = Manager::allocate_games(pool, 4);
        assert_eq!(games, vec![vec![0, 1, 2]]);
    }
}
