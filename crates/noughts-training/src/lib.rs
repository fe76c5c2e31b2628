//! Evolutionary optimizer for candidate parameter vectors.
//!
//! This crate evolves chromosomes (flat `f32` parameter vectors) to maximize a
//! fitness function. With [`FitnessEvaluator`](noughts_evaluator::fitness::FitnessEvaluator)
//! as the fitness function, each chromosome is loaded into a network that plays
//! tic-tac-toe against the minimax agent.
//!
//! # How Training Works
//!
//! 1. **Initialize** - create `population_size` chromosomes with genes uniform in `[-1, 1]`
//! 2. **Evaluate** - score every chromosome in parallel
//! 3. **Check** - stop if the best score meets the threshold
//! 4. **Reshape** - keep the elites, fill the rest with mutated crossover children
//! 5. **Repeat** - until convergence or `max_generations`
//!
//! # Architecture
//!
//! ```text
//! GeneticAlgorithm (generation loop, termination)
//!     ↓ owns
//! Population (chromosomes + fitness)
//!     ↓ scored by
//! FitnessFunction (e.g. FitnessEvaluator from noughts-evaluator)
//!     ↓ reshaped by
//! PopulationEvolver (elitism, tournament, crossover, mutation)
//! ```
//!
//! - [`chromosome`] - gene-level operators
//! - [`genetic`] - population, evolver and the generation loop
//! - [`params`] - [`TrainingParams`](params::TrainingParams) and configuration errors
//!
//! # Example
//!
//! ```
//! use noughts_evaluator::{
//!     fitness::{DifficultyPipeline, FitnessEvaluator, RewardTable},
//!     mlp::Mlp,
//! };
//! use noughts_training::{genetic::GeneticAlgorithm, params::TrainingParams};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let evaluator = FitnessEvaluator::new(
//!     Mlp::new(vec![9, 9, 9]).unwrap(),
//!     DifficultyPipeline::default(),
//!     RewardTable::default(),
//! );
//! let params = TrainingParams {
//!     population_size: 8,
//!     max_generations: 2,
//!     ..TrainingParams::default()
//! };
//! let mut ga = GeneticAlgorithm::new(params, evaluator.chromosome_size(), Pcg32::seed_from_u64(0)).unwrap();
//! let outcome = ga.run(&evaluator).unwrap();
//! assert!(outcome.best.fitness() <= evaluator.perfect_score());
//! ```
//!
//! # Current Limitations
//!
//! - **Noisy fitness**: easy and medium opponents play randomly, so one game per
//!   difficulty gives a noisy score; elites are re-evaluated every generation
//!   and may drop out after an unlucky game
//! - **Fixed operators**: learning rate and mutation rate do not adapt over time
//! - **One thread per individual**: evaluation does not use a bounded worker pool

pub mod chromosome;
pub mod genetic;
pub mod params;
