//! Move-choosing capabilities shared by candidates and agents.
//!
//! Any type implementing [`Policy`] can take part in a game; types that are
//! also [`Trainable`] can be optimized by loading a flat parameter vector.

use std::fmt;

use noughts_engine::Board;

/// A policy chooses a cell index for the side to move.
///
/// The returned index is not required to be legal: illegal answers are scored
/// by the caller (see [`match_play`](crate::match_play)). An error is returned
/// only when the policy cannot answer at all.
pub trait Policy: fmt::Debug {
    fn predict(&mut self, board: &Board) -> Result<usize, PolicyError>;
}

/// A policy whose behavior is fully determined by a flat parameter vector.
pub trait Trainable: Policy {
    /// Number of parameters expected by [`Trainable::load_parameters`].
    fn parameter_count(&self) -> usize;

    /// Replaces all parameters.
    ///
    /// Fails without modifying `self` if `parameters.len()` differs from
    /// [`Trainable::parameter_count`].
    fn load_parameters(&mut self, parameters: &[f32]) -> Result<(), ParameterCountError>;
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("asked for a move on finished board {board}")]
    FinishedBoard { board: Board },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected {expected} parameters, got {actual}")]
pub struct ParameterCountError {
    pub expected: usize,
    pub actual: usize,
}
