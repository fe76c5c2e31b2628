//! Tic-tac-toe rules: board state, move validation and terminal-state detection.
//!
//! - [`core`] - the 3×3 [`Board`], the two [`Player`]s and the board-derived [`BoardStatus`]
//! - [`engine`] - a turn-taking [`Game`] and the final [`GameOutcome`] of a played game
//!
//! # Example
//!
//! ```
//! use noughts_engine::{Board, BoardStatus, Player};
//!
//! let mut board = Board::EMPTY;
//! board.apply_move(Player::X, 4).unwrap();
//! assert!(board.apply_move(Player::O, 4).is_err());
//! assert_eq!(board.status(), BoardStatus::Ongoing);
//! assert_eq!(board.legal_moves().len(), 8);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A move that cannot be applied to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalMoveError {
    #[display("cell index {index} is out of range")]
    OutOfRange { index: usize },
    #[display("cell {index} is already occupied")]
    Occupied { index: usize },
    #[display("game is already finished")]
    GameFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid cell value {value} (expected -1, 0 or 1)")]
pub struct InvalidCellError {
    pub value: i8,
}
