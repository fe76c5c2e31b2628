//! Fitness evaluation: turns a chromosome into a scalar score by playing games.
//!
//! # How It Works
//!
//! For one chromosome, [`FitnessEvaluator::evaluate`]:
//!
//! 1. clones the candidate prototype and loads the chromosome into the clone,
//! 2. builds a private [`MinimaxAgent`] seeded from the caller's RNG,
//! 3. for each difficulty in the [`DifficultyPipeline`], reconfigures the agent
//!    and plays exactly one game with the candidate moving first,
//! 4. converts each outcome to a reward with the [`RewardTable`] and sums them.
//!
//! Totals are not normalized: a longer pipeline has a proportionally larger
//! best possible score ([`FitnessEvaluator::perfect_score`]).
//!
//! # Concurrency
//!
//! `evaluate` takes `&self` and never mutates the evaluator. Every call owns its
//! candidate and agent, so one evaluator can be shared by reference across
//! worker threads.
//!
//! # Failures
//!
//! A candidate illegal move is scored (the worst reward). An illegal move by the
//! agent is an internal-consistency fault and fails the evaluation with
//! [`FitnessError::OpponentIllegalMove`].

use std::{fmt, str::FromStr};

use log::debug;
use noughts_engine::{Board, GameOutcome, Player};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    match_play::{self, MatchError, MatchRecord},
    minimax::{Difficulty, InvalidDifficultyError, MinimaxAgent},
    policy::{ParameterCountError, Trainable},
};

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display(
    "rewards must satisfy win > draw > loss > invalid_move and be finite \
     (got win={win}, draw={draw}, loss={loss}, invalid_move={invalid_move})"
)]
pub struct RewardTableError {
    pub win: f32,
    pub draw: f32,
    pub loss: f32,
    pub invalid_move: f32,
}

/// Per-game rewards, from the candidate's side.
///
/// Always ordered `win > draw > loss > invalid_move`; the constructor and the
/// deserializer reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RewardTableFields")]
pub struct RewardTable {
    win: f32,
    draw: f32,
    loss: f32,
    invalid_move: f32,
}

#[derive(Deserialize)]
struct RewardTableFields {
    win: f32,
    draw: f32,
    loss: f32,
    invalid_move: f32,
}

impl TryFrom<RewardTableFields> for RewardTable {
    type Error = RewardTableError;

    fn try_from(fields: RewardTableFields) -> Result<Self, Self::Error> {
        Self::new(fields.win, fields.draw, fields.loss, fields.invalid_move)
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            win: 10.0,
            draw: 3.0,
            loss: -5.0,
            invalid_move: -50.0,
        }
    }
}

impl RewardTable {
    pub fn new(win: f32, draw: f32, loss: f32, invalid_move: f32) -> Result<Self, RewardTableError> {
        let finite = [win, draw, loss, invalid_move].iter().all(|r| r.is_finite());
        if !(finite && win > draw && draw > loss && loss > invalid_move) {
            return Err(RewardTableError {
                win,
                draw,
                loss,
                invalid_move,
            });
        }
        Ok(Self {
            win,
            draw,
            loss,
            invalid_move,
        })
    }

    #[must_use]
    pub fn win(&self) -> f32 {
        self.win
    }

    #[must_use]
    pub fn draw(&self) -> f32 {
        self.draw
    }

    #[must_use]
    pub fn loss(&self) -> f32 {
        self.loss
    }

    #[must_use]
    pub fn invalid_move(&self) -> f32 {
        self.invalid_move
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("difficulty pipeline must not be empty")]
    Empty,
    #[display("{source}")]
    Difficulty { source: InvalidDifficultyError },
}

impl From<InvalidDifficultyError> for PipelineError {
    fn from(source: InvalidDifficultyError) -> Self {
        Self::Difficulty { source }
    }
}

/// Ordered, non-empty list of opponent difficulties; one game is played per entry.
///
/// Parses from a comma-separated list such as `easy,medium,hard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Difficulty>", into = "Vec<Difficulty>")]
pub struct DifficultyPipeline(Vec<Difficulty>);

impl DifficultyPipeline {
    pub fn new(difficulties: Vec<Difficulty>) -> Result<Self, PipelineError> {
        if difficulties.is_empty() {
            return Err(PipelineError::Empty);
        }
        Ok(Self(difficulties))
    }

    #[must_use]
    pub fn difficulties(&self) -> &[Difficulty] {
        &self.0
    }

    /// Number of games played per evaluation.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.0.len()
    }
}

impl Default for DifficultyPipeline {
    fn default() -> Self {
        Self(Difficulty::ALL.to_vec())
    }
}

impl TryFrom<Vec<Difficulty>> for DifficultyPipeline {
    type Error = PipelineError;

    fn try_from(difficulties: Vec<Difficulty>) -> Result<Self, Self::Error> {
        Self::new(difficulties)
    }
}

impl From<DifficultyPipeline> for Vec<Difficulty> {
    fn from(pipeline: DifficultyPipeline) -> Self {
        pipeline.0
    }
}

impl FromStr for DifficultyPipeline {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PipelineError::Empty);
        }
        let difficulties = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(difficulties)
    }
}

impl fmt::Display for DifficultyPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, difficulty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{difficulty}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum FitnessError {
    #[display("chromosome does not fit the candidate: {source}")]
    Parameters { source: ParameterCountError },
    #[display("{source}")]
    Match { source: MatchError },
    #[display("{difficulty} opponent played illegal cell {index} on {board}")]
    OpponentIllegalMove {
        difficulty: Difficulty,
        index: usize,
        board: Board,
    },
}

impl From<ParameterCountError> for FitnessError {
    fn from(source: ParameterCountError) -> Self {
        Self::Parameters { source }
    }
}

impl From<MatchError> for FitnessError {
    fn from(source: MatchError) -> Self {
        Self::Match { source }
    }
}

/// Scores chromosomes by playing a candidate against the minimax agent.
///
/// `prototype` fixes the candidate's shape (e.g. an [`Mlp`](crate::mlp::Mlp)
/// topology); its own parameters are never used, each evaluation loads the
/// chromosome into a fresh clone.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<C> {
    prototype: C,
    pipeline: DifficultyPipeline,
    rewards: RewardTable,
}

impl<C> FitnessEvaluator<C>
where
    C: Trainable + Clone,
{
    #[must_use]
    pub fn new(prototype: C, pipeline: DifficultyPipeline, rewards: RewardTable) -> Self {
        Self {
            prototype,
            pipeline,
            rewards,
        }
    }

    #[must_use]
    pub fn prototype(&self) -> &C {
        &self.prototype
    }

    #[must_use]
    pub fn pipeline(&self) -> &DifficultyPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    /// Length of the chromosomes this evaluator accepts.
    #[must_use]
    pub fn chromosome_size(&self) -> usize {
        self.prototype.parameter_count()
    }

    /// The total obtained by winning every game of the pipeline.
    #[must_use]
    pub fn perfect_score(&self) -> f32 {
        #[expect(clippy::cast_precision_loss)]
        let games = self.pipeline.game_count() as f32;
        self.rewards.win * games
    }

    /// Plays one game per pipeline entry and returns the summed rewards.
    ///
    /// `rng` is only used to seed the agent, so equal seeds give equal scores.
    pub fn evaluate<R>(&self, chromosome: &[f32], rng: &mut R) -> Result<f32, FitnessError>
    where
        R: Rng + ?Sized,
    {
        let mut candidate = self.prototype.clone();
        candidate.load_parameters(chromosome)?;

        let mut agent = MinimaxAgent::new(Difficulty::Hard, Pcg32::seed_from_u64(rng.random()));
        let mut total = 0.0;
        for &difficulty in self.pipeline.difficulties() {
            agent.set_difficulty(difficulty);
            let record = match_play::play_match(&mut candidate, &mut agent)?;
            total += self.score_match(difficulty, &record)?;
        }
        debug!("fitness {total} over {} games", self.pipeline.game_count());
        Ok(total)
    }

    /// Converts a finished game against a `difficulty` opponent into a reward.
    pub fn score_match(&self, difficulty: Difficulty, record: &MatchRecord) -> Result<f32, FitnessError> {
        let reward = match record.outcome {
            GameOutcome::Won(Player::X) => self.rewards.win,
            GameOutcome::Draw => self.rewards.draw,
            GameOutcome::Won(Player::O) => self.rewards.loss,
            GameOutcome::InvalidMove {
                player: Player::X, ..
            } => self.rewards.invalid_move,
            GameOutcome::InvalidMove {
                player: Player::O,
                index,
            } => {
                return Err(FitnessError::OpponentIllegalMove {
                    difficulty,
                    index,
                    board: *record.game.board(),
                });
            }
        };
        Ok(reward)
    }
}
