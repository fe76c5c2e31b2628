use std::slice;

use noughts_engine::Board;

use crate::policy::{Policy, PolicyError};

/// Plays the lowest empty cell.
#[derive(Debug)]
pub(crate) struct FirstLegal;

impl Policy for FirstLegal {
    fn predict(&mut self, board: &Board) -> Result<usize, PolicyError> {
        board
            .legal_moves()
            .first()
            .copied()
            .ok_or(PolicyError::FinishedBoard { board: *board })
    }
}

/// Plays a fixed sequence of cells, legal or not.
#[derive(Debug)]
pub(crate) struct Scripted<'a>(slice::Iter<'a, usize>);

impl<'a> Scripted<'a> {
    pub(crate) fn new(moves: &'a [usize]) -> Self {
        Self(moves.iter())
    }
}

impl Policy for Scripted<'_> {
    fn predict(&mut self, _board: &Board) -> Result<usize, PolicyError> {
        Ok(*self.0.next().expect("script ran out of moves"))
    }
}
