use arrayvec::ArrayVec;

use crate::{
    IllegalMoveError,
    core::{Board, BoardStatus, CELL_COUNT, Player},
};

/// How a finished game ended.
///
/// `InvalidMove` is not a board pattern: it records that `player` attempted an
/// illegal move, which ends the game immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameOutcome {
    Won(Player),
    Draw,
    InvalidMove { player: Player, index: usize },
}

impl GameOutcome {
    /// Converts a terminal board status into an outcome, or `None` if the game is still ongoing.
    #[must_use]
    pub fn from_status(status: BoardStatus) -> Option<Self> {
        match status {
            BoardStatus::Ongoing => None,
            BoardStatus::Won(player) => Some(GameOutcome::Won(player)),
            BoardStatus::Draw => Some(GameOutcome::Draw),
        }
    }
}

/// A single game in progress.
///
/// `X` moves first and the players alternate. The board is created empty and
/// discarded with the game.
///
/// # Example
///
/// ```
/// use noughts_engine::{BoardStatus, Game, Player};
///
/// let mut game = Game::new();
/// for index in [0, 3, 1, 4] {
///     game.play(index).unwrap();
/// }
/// assert_eq!(game.to_move(), Player::X);
/// assert_eq!(game.play(2).unwrap(), BoardStatus::Won(Player::X));
/// assert!(game.play(5).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Game {
    board: Board,
    to_move: Player,
    moves: ArrayVec<usize, CELL_COUNT>,
}

impl Game {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the cell indices played so far, in order.
    #[must_use]
    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    #[must_use]
    pub fn status(&self) -> BoardStatus {
        self.board.status()
    }

    /// Plays `index` for the side to move and returns the resulting status.
    ///
    /// On error nothing changes and the same side remains to move.
    pub fn play(&mut self, index: usize) -> Result<BoardStatus, IllegalMoveError> {
        if self.status().is_terminal() {
            return Err(IllegalMoveError::GameFinished);
        }
        self.board.apply_move(self.to_move, index)?;
        self.moves.push(index);
        self.to_move = self.to_move.opponent();
        Ok(self.status())
    }
}
