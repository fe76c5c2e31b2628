//! Turn-taking on top of the [`Board`](crate::Board).
//!
//! - [`Game`] - a board plus the side to move; rejects moves after the game has ended
//! - [`GameOutcome`] - how a finished game ended, including forfeits by illegal moves

pub use self::game::*;

mod game;
