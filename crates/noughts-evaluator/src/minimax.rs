//! Adversarial search agent: minimax with alpha-beta pruning, mixed with
//! uniform-random play according to a difficulty setting.
//!
//! # Sign Convention
//!
//! Terminal boards score `+1` when X has won, `-1` when O has won and `0` for a
//! draw. The agent always plays O and always searches as the minimizing side,
//! so it picks the legal move with the LOWEST score. Ties go to the lowest cell
//! index, which makes `hard` play fully deterministic.
//!
//! The search always runs to terminal leaves; there is no heuristic cut-off.
//! Pruning only skips work: the chosen move is the same as exhaustive minimax.
//!
//! # Difficulty
//!
//! | difficulty | randomness |
//! |------------|------------|
//! | `easy`     | 0.8        |
//! | `medium`   | 0.5        |
//! | `hard`     | 0.0        |
//!
//! With probability `randomness` the agent skips the search and plays a legal
//! move drawn uniformly at random.

use std::{fmt, str::FromStr};

use noughts_engine::{Board, BoardStatus, Player};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::policy::{Policy, PolicyError};

/// Opponent strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Probability of playing a uniformly random legal move instead of searching.
    #[must_use]
    pub const fn randomness(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 0.5,
            Difficulty::Hard => 0.0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid difficulty {mode:?} (expected easy, medium or hard)")]
pub struct InvalidDifficultyError {
    pub mode: String,
}

/// Parses a difficulty name, ignoring ASCII case.
impl FromStr for Difficulty {
    type Err = InvalidDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidDifficultyError { mode: s.to_owned() })
    }
}

/// The minimax opponent. Always plays O.
///
/// Each agent owns its random number generator; agents are never shared
/// between concurrent games.
///
/// # Example
///
/// ```
/// use noughts_engine::{Board, Player};
/// use noughts_evaluator::{minimax::{Difficulty, MinimaxAgent}, policy::Policy as _};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
///
/// let mut agent = MinimaxAgent::new(Difficulty::Hard, Pcg32::seed_from_u64(0));
///
/// // X took a corner: the only non-losing reply is the center.
/// let board = Board::EMPTY.with_move(Player::X, 0);
/// assert_eq!(agent.predict(&board).unwrap(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct MinimaxAgent<R> {
    difficulty: Difficulty,
    rng: R,
}

impl<R> MinimaxAgent<R>
where
    R: Rng,
{
    #[must_use]
    pub fn new(difficulty: Difficulty, rng: R) -> Self {
        Self { difficulty, rng }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Chooses a move for O.
    ///
    /// Finished boards are rejected before any search starts.
    pub fn choose_move(&mut self, board: &Board) -> Result<usize, PolicyError> {
        if board.status().is_terminal() {
            return Err(PolicyError::FinishedBoard { board: *board });
        }
        if self.rng.random_bool(self.difficulty.randomness()) {
            let moves = board.legal_moves();
            if let Some(&index) = moves.choose(&mut self.rng) {
                return Ok(index);
            }
        }
        best_move(board).ok_or(PolicyError::FinishedBoard { board: *board })
    }
}

impl<R> Policy for MinimaxAgent<R>
where
    R: Rng + fmt::Debug,
{
    fn predict(&mut self, board: &Board) -> Result<usize, PolicyError> {
        self.choose_move(board)
    }
}

/// Returns the move minimizing the minimax score for O, or `None` if the game
/// is already over.
///
/// Every root move is searched with a full `(-∞, +∞)` window; the first move
/// reaching the lowest score wins.
#[must_use]
pub fn best_move(board: &Board) -> Option<usize> {
    if board.status().is_terminal() {
        return None;
    }
    let mut best = None;
    let mut best_score = i8::MAX;
    for index in board.legal_moves() {
        let score = minimax(&board.with_move(Player::O, index), Player::X, i8::MIN, i8::MAX);
        if best.is_none() || score < best_score {
            best = Some(index);
            best_score = score;
        }
    }
    best
}

/// Scores `board` with `to_move` about to play, both sides playing optimally.
///
/// X maximizes and O minimizes. The `[alpha, beta]` window is narrowed as
/// siblings are searched, and a node stops searching once `beta <= alpha`.
#[must_use]
pub fn minimax(board: &Board, to_move: Player, mut alpha: i8, mut beta: i8) -> i8 {
    match board.status() {
        BoardStatus::Won(player) => return player.sign(),
        BoardStatus::Draw => return 0,
        BoardStatus::Ongoing => {}
    }

    let next = to_move.opponent();
    match to_move {
        Player::X => {
            let mut value = i8::MIN;
            for index in board.legal_moves() {
                let score = minimax(&board.with_move(to_move, index), next, alpha, beta);
                value = value.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
        Player::O => {
            let mut value = i8::MAX;
            for index in board.legal_moves() {
                let score = minimax(&board.with_move(to_move, index), next, alpha, beta);
                value = value.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn board(signs: [i8; 9]) -> Board {
        Board::try_from(signs).unwrap()
    }

    fn hard_agent() -> MinimaxAgent<Pcg32> {
        MinimaxAgent::new(Difficulty::Hard, Pcg32::seed_from_u64(42))
    }

    /// Plain minimax without pruning.
    fn exhaustive(board: &Board, to_move: Player) -> i8 {
        match board.status() {
            BoardStatus::Won(player) => return player.sign(),
            BoardStatus::Draw => return 0,
            BoardStatus::Ongoing => {}
        }
        let scores = board
            .legal_moves()
            .into_iter()
            .map(|i| exhaustive(&board.with_move(to_move, i), to_move.opponent()));
        match to_move {
            Player::X => scores.max().unwrap(),
            Player::O => scores.min().unwrap(),
        }
    }

    fn exhaustive_best_move(board: &Board) -> Option<usize> {
        let mut best: Option<(usize, i8)> = None;
        for index in board.legal_moves() {
            let score = exhaustive(&board.with_move(Player::O, index), Player::X);
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Boards reachable with O to move (X has made one more move than O).
    fn boards_with_o_to_move(max_depth: usize) -> Vec<Board> {
        fn walk(board: Board, to_move: Player, depth: usize, out: &mut Vec<Board>) {
            if board.status().is_terminal() || depth == 0 {
                return;
            }
            if to_move == Player::O {
                out.push(board);
            }
            for index in board.legal_moves() {
                walk(board.with_move(to_move, index), to_move.opponent(), depth - 1, out);
            }
        }
        let mut out = Vec::new();
        walk(Board::EMPTY, Player::X, max_depth, &mut out);
        out.sort_by_key(Board::signs);
        out.dedup();
        out
    }

    mod difficulty {
        use super::*;

        #[test]
        fn test_randomness_table() {
            assert_eq!(Difficulty::Easy.randomness(), 0.8);
            assert_eq!(Difficulty::Medium.randomness(), 0.5);
            assert_eq!(Difficulty::Hard.randomness(), 0.0);
        }

        #[test]
        fn test_parse() {
            assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
            assert_eq!("Medium".parse::<Difficulty>(), Ok(Difficulty::Medium));
            assert_eq!(" HARD ".parse::<Difficulty>(), Ok(Difficulty::Hard));
            for d in Difficulty::ALL {
                assert_eq!(d.to_string().parse::<Difficulty>(), Ok(d));
            }
        }

        #[test]
        fn test_invalid_mode_fails() {
            assert_eq!(
                "impossible".parse::<Difficulty>(),
                Err(InvalidDifficultyError {
                    mode: "impossible".to_owned()
                })
            );
            assert!("".parse::<Difficulty>().is_err());
        }
    }

    mod search {
        use super::*;

        #[test]
        fn test_terminal_scores() {
            let x_won = board([1, 1, 1, -1, -1, 0, 0, 0, 0]);
            let o_won = board([1, 1, 0, -1, -1, -1, 1, 0, 0]);
            let draw = board([1, -1, 1, 1, -1, -1, -1, 1, 1]);
            for to_move in [Player::X, Player::O] {
                assert_eq!(minimax(&x_won, to_move, i8::MIN, i8::MAX), 1);
                assert_eq!(minimax(&o_won, to_move, i8::MIN, i8::MAX), -1);
                assert_eq!(minimax(&draw, to_move, i8::MIN, i8::MAX), 0);
            }
        }

        #[test]
        fn test_no_move_on_finished_board() {
            assert_eq!(best_move(&board([1, 1, 1, -1, -1, 0, 0, 0, 0])), None);
            assert_eq!(best_move(&board([1, 1, 0, -1, -1, -1, 1, 0, 0])), None);
            assert_eq!(best_move(&board([1, -1, 1, 1, -1, -1, -1, 1, 1])), None);
        }

        #[test]
        fn test_empty_board_is_a_draw() {
            assert_eq!(minimax(&Board::EMPTY, Player::X, i8::MIN, i8::MAX), 0);
        }

        #[test]
        fn test_blocks_immediate_threat() {
            // X X . / . O . / . . .
            let b = board([1, 1, 0, 0, -1, 0, 0, 0, 0]);
            assert_eq!(best_move(&b), Some(2));
        }

        #[test]
        fn test_takes_center_after_corner_opening() {
            for corner in [0, 2, 6, 8] {
                let b = Board::EMPTY.with_move(Player::X, corner);
                assert_eq!(best_move(&b), Some(4));
            }
        }

        #[test]
        fn test_ties_go_to_lowest_index() {
            // X . . / . . . / . . .  after O center, X opposite corner:
            // X . . / . O . / . . X  -- every edge draws; corners lose.
            let b = board([1, 0, 0, 0, -1, 0, 0, 0, 1]);
            assert_eq!(best_move(&b), Some(1));
        }

        #[test]
        fn test_alpha_beta_matches_exhaustive_minimax() {
            let boards = boards_with_o_to_move(6);
            assert!(boards.len() > 500);
            for b in &boards {
                assert_eq!(
                    minimax(b, Player::O, i8::MIN, i8::MAX),
                    exhaustive(b, Player::O),
                    "{b}"
                );
                assert_eq!(best_move(b), exhaustive_best_move(b), "{b}");
            }
        }
    }

    mod agent {
        use super::*;

        #[test]
        fn test_rejects_finished_board_before_search() {
            let mut agent = hard_agent();
            let full = board([1, -1, 1, 1, -1, -1, -1, 1, 1]);
            assert!(matches!(
                agent.predict(&full),
                Err(PolicyError::FinishedBoard { .. })
            ));
            let won = board([1, 1, 1, -1, -1, 0, 0, 0, 0]);
            assert!(matches!(
                agent.predict(&won),
                Err(PolicyError::FinishedBoard { .. })
            ));
        }

        #[test]
        fn test_hard_agent_never_loses() {
            /// Walks every X move sequence against the agent's replies.
            fn walk(agent: &mut MinimaxAgent<Pcg32>, board: Board, games: &mut usize) {
                for index in board.legal_moves() {
                    let after_x = board.with_move(Player::X, index);
                    match after_x.status() {
                        BoardStatus::Won(player) => panic!("{player} beat hard agent: {after_x}"),
                        BoardStatus::Draw => *games += 1,
                        BoardStatus::Ongoing => {
                            let reply = agent.predict(&after_x).unwrap();
                            let after_o = after_x.with_move(Player::O, reply);
                            if after_o.status().is_terminal() {
                                assert_ne!(after_o.status(), BoardStatus::Won(Player::X));
                                *games += 1;
                            } else {
                                walk(agent, after_o, games);
                            }
                        }
                    }
                }
            }
            let mut agent = hard_agent();
            let mut games = 0;
            walk(&mut agent, Board::EMPTY, &mut games);
            assert!(games > 100);
        }

        #[test]
        fn test_hard_agent_is_deterministic() {
            let b = board([1, 0, 0, 0, 0, 0, 0, 0, 1]);
            let expected = best_move(&b).unwrap();
            for seed in 0..20 {
                let mut agent = MinimaxAgent::new(Difficulty::Hard, Pcg32::seed_from_u64(seed));
                assert_eq!(agent.predict(&b).unwrap(), expected);
            }
        }

        #[test]
        fn test_random_moves_are_legal() {
            let b = board([1, -1, 0, 0, 1, 0, 0, 0, 0]);
            let mut agent = MinimaxAgent::new(Difficulty::Easy, Pcg32::seed_from_u64(3));
            for _ in 0..500 {
                let index = agent.predict(&b).unwrap();
                assert!(b.is_legal_move(index));
            }
        }

        #[expect(clippy::cast_precision_loss)]
        fn deviation_rate(difficulty: Difficulty) -> f64 {
            const TRIALS: usize = 20_000;
            // Corner opening: the center is the unique optimal reply among 8 legal moves.
            let b = Board::EMPTY.with_move(Player::X, 0);
            let optimal = best_move(&b).unwrap();
            let mut agent = MinimaxAgent::new(difficulty, Pcg32::seed_from_u64(0xDEC0DE));
            let deviations = (0..TRIALS)
                .filter(|_| agent.predict(&b).unwrap() != optimal)
                .count();
            deviations as f64 / TRIALS as f64
        }

        #[test]
        fn test_easy_deviates_at_randomness_rate() {
            // A random draw still hits the optimal move 1 time in 8.
            let expected = 0.8 * 7.0 / 8.0;
            let rate = deviation_rate(Difficulty::Easy);
            assert!((rate - expected).abs() < 0.02, "rate = {rate}");
        }

        #[test]
        fn test_medium_deviates_at_randomness_rate() {
            let expected = 0.5 * 7.0 / 8.0;
            let rate = deviation_rate(Difficulty::Medium);
            assert!((rate - expected).abs() < 0.02, "rate = {rate}");
        }

        #[test]
        fn test_set_difficulty() {
            let mut agent = hard_agent();
            agent.set_difficulty(Difficulty::Easy);
            assert_eq!(agent.difficulty(), Difficulty::Easy);
        }
    }
}
