//! Optimizer configuration.

use serde::{Deserialize, Serialize};

/// A training configuration that cannot run.
///
/// Returned before the first generation; a run never starts with one of these.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 2, got {population_size}")]
    PopulationTooSmall { population_size: usize },
    #[display("elite count {elite_count} must be less than population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("elite fraction must be in [0, 1], got {fraction}")]
    EliteFraction { fraction: f32 },
    #[display("mutation rate must be in [0, 1], got {rate}")]
    MutationRate { rate: f32 },
    #[display("learning rate must be finite and non-negative, got {rate}")]
    LearningRate { rate: f32 },
    #[display("threshold must be finite, got {threshold}")]
    Threshold { threshold: f32 },
    #[display("generation budget must be at least 1")]
    NoGenerations,
    #[display("chromosome size must be at least 1")]
    EmptyChromosome,
}

/// Genetic algorithm parameters.
///
/// `learning_rate` is the standard deviation of the Gaussian mutation noise;
/// `mutation_rate` is the per-gene probability of applying it.
///
/// # Example
///
/// ```
/// use noughts_training::params::TrainingParams;
///
/// let params = TrainingParams::default();
/// assert_eq!(params.elite_count(), 33);
/// params.validate().unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingParams {
    pub population_size: usize,
    pub max_generations: usize,
    pub learning_rate: f32,
    pub mutation_rate: f32,
    pub elite_fraction: f32,
    /// Best fitness at which the run stops early. `None` means the fitness
    /// function's perfect score, if it has one.
    pub threshold: Option<f32>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            learning_rate: 0.1,
            mutation_rate: 0.1,
            elite_fraction: 1.0 / 3.0,
            threshold: None,
        }
    }
}

impl TrainingParams {
    /// Number of individuals carried unchanged into the next generation.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn elite_count(&self) -> usize {
        (self.population_size as f32 * self.elite_fraction).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            population_size,
            max_generations,
            learning_rate,
            mutation_rate,
            elite_fraction,
            threshold,
        } = *self;

        if population_size < 2 {
            return Err(ConfigError::PopulationTooSmall { population_size });
        }
        if !(0.0..=1.0).contains(&elite_fraction) {
            return Err(ConfigError::EliteFraction {
                fraction: elite_fraction,
            });
        }
        let elite_count = self.elite_count();
        if elite_count >= population_size {
            return Err(ConfigError::TooManyElites {
                elite_count,
                population_size,
            });
        }
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(ConfigError::MutationRate {
                rate: mutation_rate,
            });
        }
        if !(learning_rate.is_finite() && learning_rate >= 0.0) {
            return Err(ConfigError::LearningRate {
                rate: learning_rate,
            });
        }
        if let Some(threshold) = threshold.filter(|t| !t.is_finite()) {
            return Err(ConfigError::Threshold { threshold });
        }
        if max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        Ok(())
    }
}
