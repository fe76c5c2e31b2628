//! Policies, the adversarial search agent and the fitness function that scores
//! a candidate by playing it against that agent.
//!
//! The crate is layered the same way a fitness computation flows:
//!
//! ```text
//! Fitness Evaluation (chromosome → scalar fitness)
//!     ↓ plays
//! Match Play (one game between two policies, turn protocol)
//!     ↓ asks
//! Policies: Mlp candidate (X, first mover) and MinimaxAgent (O, second mover)
//! ```
//!
//! - [`policy`] - the [`Policy`](policy::Policy) and [`Trainable`](policy::Trainable) traits
//! - [`mlp`] - a multilayer perceptron candidate and its persisted record
//! - [`minimax`] - minimax with alpha-beta pruning and difficulty-controlled randomness
//! - [`match_play`] - plays games between policies and tallies results
//! - [`fitness`] - reward table, difficulty pipeline and the fitness evaluator
//!
//! # Example
//!
//! ```
//! use noughts_evaluator::{
//!     fitness::{DifficultyPipeline, FitnessEvaluator, RewardTable},
//!     mlp::Mlp,
//!     policy::Trainable as _,
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mlp = Mlp::new(vec![9, 9, 9]).unwrap();
//! let chromosome = vec![0.1; mlp.parameter_count()];
//! let evaluator = FitnessEvaluator::new(mlp, DifficultyPipeline::default(), RewardTable::default());
//!
//! let mut rng = Pcg32::seed_from_u64(7);
//! let fitness = evaluator.evaluate(&chromosome, &mut rng).unwrap();
//! assert!(fitness <= evaluator.perfect_score());
//! ```

pub mod fitness;
pub mod match_play;
pub mod minimax;
pub mod mlp;
pub mod policy;

#[cfg(test)]
mod test_util;
