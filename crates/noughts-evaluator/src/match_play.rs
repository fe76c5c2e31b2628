//! Plays games between two policies.
//!
//! The turn protocol is the same for every caller:
//!
//! 1. X (the candidate) moves first; the players alternate.
//! 2. The board status is rechecked after every move, so a winning move is
//!    never followed by an opponent move.
//! 3. An illegal move ends the game at once with
//!    [`GameOutcome::InvalidMove`]; the other side does not move again.
//!
//! Illegal moves are outcomes, not errors. Only a policy that cannot answer at
//! all produces a [`MatchError`].

use std::fmt;

use log::trace;
use noughts_engine::{Game, GameOutcome, Player};
use serde::{Deserialize, Serialize};

use crate::policy::{Policy, PolicyError};

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("{player} policy failed: {source}")]
pub struct MatchError {
    pub player: Player,
    pub source: PolicyError,
}

/// A finished game and how it ended.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub outcome: GameOutcome,
    pub game: Game,
}

/// Plays one game with `x` moving first.
pub fn play_match<X, O>(x: &mut X, o: &mut O) -> Result<MatchRecord, MatchError>
where
    X: Policy + ?Sized,
    O: Policy + ?Sized,
{
    let mut game = Game::new();
    loop {
        let player = game.to_move();
        let index = match player {
            Player::X => x.predict(game.board()),
            Player::O => o.predict(game.board()),
        }
        .map_err(|source| MatchError { player, source })?;

        match game.play(index) {
            Ok(status) => {
                if let Some(outcome) = GameOutcome::from_status(status) {
                    trace!("game over: {outcome:?} after {:?}", game.moves());
                    return Ok(MatchRecord { outcome, game });
                }
            }
            Err(err) => {
                trace!("{player} made an illegal move on {}: {err}", game.board());
                let outcome = GameOutcome::InvalidMove { player, index };
                return Ok(MatchRecord { outcome, game });
            }
        }
    }
}

/// Outcome counts of a series of games, from the candidate's (X) side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub candidate_invalid: usize,
    pub opponent_invalid: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: GameOutcome) {
        let counter = match outcome {
            GameOutcome::Won(Player::X) => &mut self.wins,
            GameOutcome::Won(Player::O) => &mut self.losses,
            GameOutcome::Draw => &mut self.draws,
            GameOutcome::InvalidMove {
                player: Player::X, ..
            } => &mut self.candidate_invalid,
            GameOutcome::InvalidMove {
                player: Player::O, ..
            } => &mut self.opponent_invalid,
        };
        *counter += 1;
    }

    #[must_use]
    pub fn games(&self) -> usize {
        self.wins + self.draws + self.losses + self.candidate_invalid + self.opponent_invalid
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            wins,
            draws,
            losses,
            candidate_invalid,
            opponent_invalid,
        } = self;
        write!(
            f,
            "wins: {wins}, draws: {draws}, losses: {losses}, \
             candidate invalid: {candidate_invalid}, opponent invalid: {opponent_invalid}"
        )
    }
}

/// Plays `rounds` independent games and tallies the outcomes.
///
/// Diagnostic only; fitness is computed by
/// [`FitnessEvaluator`](crate::fitness::FitnessEvaluator), which treats an
/// opponent illegal move as a hard failure instead of counting it.
pub fn test_against<C, O>(candidate: &mut C, opponent: &mut O, rounds: usize) -> Result<Tally, MatchError>
where
    C: Policy + ?Sized,
    O: Policy + ?Sized,
{
    let mut tally = Tally::default();
    for _ in 0..rounds {
        let record = play_match(candidate, opponent)?;
        tally.record(record.outcome);
    }
    Ok(tally)
}
