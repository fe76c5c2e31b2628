//! Genetic algorithm evolving candidate parameter vectors.
//!
//! # Algorithm Overview
//!
//! Every generation goes through the same phases:
//!
//! 1. **Evaluate Fitness** - every chromosome is scored by the fitness function, in parallel
//! 2. **Convergence Check** - stop if the best fitness reaches the threshold
//! 3. **Elite Selection** - the top `elite_count` chromosomes are copied unchanged
//! 4. **Binary Tournament** - two distinct individuals are drawn; the fitter one becomes a parent
//! 5. **Arithmetic Crossover** - one child per pair of parents, blended with a single factor
//! 6. **Mutation** - Gaussian noise on a random subset of the child's genes
//!
//! The run ends either [`Termination::Converged`] or, after `max_generations`
//! evaluations, [`Termination::ExhaustedBudget`]. Either way the result is the
//! best individual of the last evaluated population.
//!
//! # Key Components
//!
//! - [`Individual`] - a chromosome and its fitness
//! - [`Population`] - a fixed-size set of individuals, evaluated together
//! - [`PopulationEvolver`] - builds the next generation from an evaluated one
//! - [`GeneticAlgorithm`] - drives generations until termination
//! - [`FitnessFunction`] - what the optimizer maximizes
//!
//! # Parallelization
//!
//! Fitness evaluation spawns one scoped thread per individual. The coordinator
//! draws one seed per individual before spawning, and each worker builds its
//! own [`Pcg32`] from that seed. Results are collected in submission order, so
//! a run is reproducible for a fixed coordinator seed regardless of thread
//! scheduling. A panicking worker panics the coordinator.
//!
//! # Example
//!
//! ```
//! use noughts_training::{
//!     genetic::{FitnessFunction, GeneticAlgorithm, Termination},
//!     params::TrainingParams,
//! };
//! use rand::{Rng, SeedableRng as _};
//! use rand_pcg::Pcg32;
//!
//! /// Rewards chromosomes whose genes are all close to 1.
//! struct SumOfGenes;
//!
//! impl FitnessFunction for SumOfGenes {
//!     type Error = std::convert::Infallible;
//!
//!     fn fitness<R: Rng + ?Sized>(&self, chromosome: &[f32], _rng: &mut R) -> Result<f32, Self::Error> {
//!         Ok(chromosome.iter().sum())
//!     }
//! }
//!
//! let params = TrainingParams {
//!     population_size: 20,
//!     max_generations: 500,
//!     threshold: Some(3.0),
//!     ..TrainingParams::default()
//! };
//! let mut ga = GeneticAlgorithm::new(params, 4, Pcg32::seed_from_u64(1)).unwrap();
//! let outcome = ga.run(&SumOfGenes).unwrap();
//! assert!(matches!(outcome.termination, Termination::Converged { .. }));
//! assert!(outcome.best.fitness() >= 3.0);
//! ```

use std::{error::Error, panic, thread};

use log::{debug, info};
use noughts_evaluator::{
    fitness::{FitnessError, FitnessEvaluator},
    policy::Trainable,
};
use rand::{Rng, SeedableRng as _, seq::index};
use rand_distr::Normal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    chromosome,
    params::{ConfigError, TrainingParams},
};

/// Maps a chromosome to a scalar to maximize.
///
/// Called concurrently from worker threads through `&self`; implementations
/// must not rely on shared mutable state. Randomness comes only from `rng`.
pub trait FitnessFunction: Sync {
    type Error: Error + Send + 'static;

    fn fitness<R>(&self, chromosome: &[f32], rng: &mut R) -> Result<f32, Self::Error>
    where
        R: Rng + ?Sized;

    /// Highest achievable fitness, used as the default convergence threshold.
    fn perfect_score(&self) -> Option<f32> {
        None
    }
}

impl<C> FitnessFunction for FitnessEvaluator<C>
where
    C: Trainable + Clone + Sync,
{
    type Error = FitnessError;

    fn fitness<R>(&self, chromosome: &[f32], rng: &mut R) -> Result<f32, Self::Error>
    where
        R: Rng + ?Sized,
    {
        self.evaluate(chromosome, rng)
    }

    fn perfect_score(&self) -> Option<f32> {
        Some(FitnessEvaluator::perfect_score(self))
    }
}

/// Why a population could not be scored.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvaluationError<E> {
    #[display("fitness evaluation failed")]
    Fitness { source: E },
    #[display("individual #{index} scored a non-finite fitness {fitness}")]
    NonFinite { index: usize, fitness: f32 },
}

/// A chromosome and its most recent fitness score.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Vec<f32>,
    fitness: f32,
}

impl Individual {
    /// Creates an unevaluated individual (fitness `0.0`) with uniform random genes.
    pub fn random<R>(rng: &mut R, chromosome_size: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            chromosome: chromosome::random(rng, chromosome_size),
            fitness: 0.0,
        }
    }

    #[must_use]
    pub fn chromosome(&self) -> &[f32] {
        &self.chromosome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Minimum, mean and maximum fitness of a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub min: f32,
    pub mean: f32,
    pub max: f32,
}

/// A non-empty population of equally sized chromosomes.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` random individuals.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    #[must_use]
    pub fn random<R>(count: usize, chromosome_size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(count > 0, "population must not be empty");
        let individuals = (0..count)
            .map(|_| Individual::random(rng, chromosome_size))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Returns the first individual: the fittest once
    /// [`evaluate_fitness`](Self::evaluate_fitness) has run.
    #[must_use]
    pub fn best(&self) -> &Individual {
        &self.individuals[0]
    }

    /// Scores every individual in parallel, then sorts by fitness descending.
    ///
    /// All scores are replaced; none are carried over from the previous
    /// evaluation. Ties keep their previous relative order. If any evaluation
    /// fails or yields a NaN or infinite score, the first such individual in
    /// population order is reported and no score is updated.
    pub fn evaluate_fitness<F, R>(
        &mut self,
        fitness: &F,
        rng: &mut R,
    ) -> Result<(), EvaluationError<F::Error>>
    where
        F: FitnessFunction + ?Sized,
        R: Rng + ?Sized,
    {
        let seeds = self
            .individuals
            .iter()
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();

        let results = thread::scope(|s| {
            let handles = self
                .individuals
                .iter()
                .zip(seeds)
                .map(|(ind, seed)| {
                    s.spawn(move || {
                        let mut rng = Pcg32::seed_from_u64(seed);
                        fitness.fitness(&ind.chromosome, &mut rng)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect::<Vec<_>>()
        });
        let scores = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(fitness) if !fitness.is_finite() => Err(EvaluationError::NonFinite { index, fitness }),
                Ok(fitness) => Ok(fitness),
                Err(source) => Err(EvaluationError::Fitness { source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (ind, score) in self.individuals.iter_mut().zip(scores) {
            debug!("fitness {score:.3}");
            ind.fitness = score;
        }
        self.individuals
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(())
    }

    #[must_use]
    pub fn fitness_stats(&self) -> FitnessStats {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0;
        for ind in &self.individuals {
            min = min.min(ind.fitness);
            max = max.max(ind.fitness);
            sum += ind.fitness;
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = sum / self.individuals.len() as f32;
        FitnessStats { min, mean, max }
    }
}

/// Builds the next generation from an evaluated population.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    elite_count: usize,
    mutation_rate: f32,
    noise: Normal<f32>,
}

impl PopulationEvolver {
    pub fn from_params(params: &TrainingParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let noise = Normal::new(0.0, params.learning_rate).map_err(|_| ConfigError::LearningRate {
            rate: params.learning_rate,
        })?;
        Ok(Self {
            elite_count: params.elite_count(),
            mutation_rate: params.mutation_rate,
            noise,
        })
    }

    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// Creates the next generation, the same size as `population`.
    ///
    /// 1. Copies the top `elite_count` individuals unchanged
    /// 2. Fills the rest with mutated crossover children of tournament winners
    ///
    /// Children start with fitness `0.0`.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not sorted by fitness descending, has fewer
    /// than two individuals, or is not larger than `elite_count`.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let current = &population.individuals;
        assert!(
            current.is_sorted_by(|a, b| a.fitness >= b.fitness),
            "population must be evaluated and sorted by fitness before evolving"
        );
        assert!(current.len() >= 2 && self.elite_count < current.len());

        let mut next = Vec::with_capacity(current.len());
        next.extend(current[..self.elite_count].iter().cloned());

        while next.len() < current.len() {
            let p1 = binary_tournament(current, rng);
            let p2 = binary_tournament(current, rng);
            let mut child = chromosome::arithmetic_crossover(&p1.chromosome, &p2.chromosome, rng);
            chromosome::mutate(&mut child, self.noise, self.mutation_rate, rng);
            next.push(Individual {
                chromosome: child,
                fitness: 0.0,
            });
        }

        Population { individuals: next }
    }
}

/// Draws two distinct individuals and returns the fitter; the second on a tie.
fn binary_tournament<'a, R>(individuals: &'a [Individual], rng: &mut R) -> &'a Individual
where
    R: Rng + ?Sized,
{
    let picked = index::sample(rng, individuals.len(), 2);
    let first = &individuals[picked.index(0)];
    let second = &individuals[picked.index(1)];
    if first.fitness > second.fitness {
        first
    } else {
        second
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The best fitness of `generation` (0-based) reached the threshold.
    Converged { generation: usize },
    /// `max_generations` generations were evaluated without converging.
    ExhaustedBudget,
}

#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Best individual of the last evaluated generation.
    pub best: Individual,
    /// Number of generations evaluated.
    pub generations: usize,
    pub termination: Termination,
}

/// Drives a population through generations until convergence or budget exhaustion.
#[derive(Debug)]
pub struct GeneticAlgorithm<R> {
    params: TrainingParams,
    evolver: PopulationEvolver,
    rng: R,
    population: Population,
}

impl<R> GeneticAlgorithm<R>
where
    R: Rng,
{
    /// Validates `params` and creates the initial random population.
    pub fn new(params: TrainingParams, chromosome_size: usize, mut rng: R) -> Result<Self, ConfigError> {
        if chromosome_size == 0 {
            return Err(ConfigError::EmptyChromosome);
        }
        let evolver = PopulationEvolver::from_params(&params)?;
        let population = Population::random(params.population_size, chromosome_size, &mut rng);
        Ok(Self {
            params,
            evolver,
            rng,
            population,
        })
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Runs generations until the threshold is met or the budget is spent.
    ///
    /// The threshold is `params.threshold`, or the fitness function's perfect
    /// score when unset. With neither, the run always exhausts its budget.
    pub fn run<F>(&mut self, fitness: &F) -> Result<EvolutionOutcome, EvaluationError<F::Error>>
    where
        F: FitnessFunction + ?Sized,
    {
        let threshold = self.params.threshold.or_else(|| fitness.perfect_score());
        let max_generations = self.params.max_generations;
        info!(
            "training {} individuals for up to {max_generations} generations (threshold: {threshold:?})",
            self.population.individuals.len()
        );

        let mut generation = 0;
        loop {
            self.population.evaluate_fitness(fitness, &mut self.rng)?;
            let FitnessStats { min, mean, max } = self.population.fitness_stats();
            info!(
                "generation #{generation}: best {max:.3}, mean {mean:.3}, worst {min:.3} ({} elites)",
                self.evolver.elite_count
            );

            let best = self.population.best();
            if threshold.is_some_and(|t| best.fitness >= t) {
                info!("converged at generation #{generation} with fitness {:.3}", best.fitness);
                return Ok(EvolutionOutcome {
                    best: best.clone(),
                    generations: generation + 1,
                    termination: Termination::Converged { generation },
                });
            }

            generation += 1;
            if generation >= max_generations {
                info!("generation budget exhausted, best fitness {:.3}", best.fitness);
                return Ok(EvolutionOutcome {
                    best: best.clone(),
                    generations: generation,
                    termination: Termination::ExhaustedBudget,
                });
            }

            self.population = self.evolver.evolve(&self.population, &mut self.rng);
        }
    }
}
