use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use noughts_evaluator::{
    fitness::{DifficultyPipeline, FitnessEvaluator, RewardTable},
    mlp::Mlp,
    policy::Trainable as _,
};
use noughts_training::{genetic::GeneticAlgorithm, params::TrainingParams};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    model::TrainedModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// JSON file with training parameters; flags below override its values
    #[arg(long)]
    pub(crate) params: Option<PathBuf>,
    #[arg(long)]
    pub(crate) population_size: Option<usize>,
    #[arg(long)]
    pub(crate) max_generations: Option<usize>,
    /// Standard deviation of the Gaussian mutation noise
    #[arg(long)]
    pub(crate) learning_rate: Option<f32>,
    /// Per-gene mutation probability
    #[arg(long)]
    pub(crate) mutation_rate: Option<f32>,
    /// Share of the population carried over unchanged
    #[arg(long)]
    pub(crate) elite_fraction: Option<f32>,
    /// Fitness to stop at [default: win reward × number of difficulties]
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) threshold: Option<f32>,
    /// Layer sizes, input first; input and output must be 9
    #[arg(long, value_delimiter = ',', default_value = "9,9,9")]
    pub(crate) topology: Vec<usize>,
    /// Opponent difficulties, one game each per evaluation
    #[arg(long, default_value = "easy,medium,hard")]
    pub(crate) difficulties: DifficultyPipeline,
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub(crate) win: f32,
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    pub(crate) draw: f32,
    #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
    pub(crate) loss: f32,
    #[arg(long, default_value_t = -50.0, allow_negative_numbers = true)]
    pub(crate) invalid_move: f32,
    /// Seed for every random decision of the run
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    #[arg(long, default_value = "noughts")]
    pub(crate) name: String,
    /// Output file path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

impl TrainArg {
    fn training_params(&self) -> anyhow::Result<TrainingParams> {
        let mut params = match &self.params {
            Some(path) => util::read_json_file::<TrainingParams, _>("training parameters", path)?,
            None => TrainingParams::default(),
        };
        if let Some(population_size) = self.population_size {
            params.population_size = population_size;
        }
        if let Some(max_generations) = self.max_generations {
            params.max_generations = max_generations;
        }
        if let Some(learning_rate) = self.learning_rate {
            params.learning_rate = learning_rate;
        }
        if let Some(mutation_rate) = self.mutation_rate {
            params.mutation_rate = mutation_rate;
        }
        if let Some(elite_fraction) = self.elite_fraction {
            params.elite_fraction = elite_fraction;
        }
        if let Some(threshold) = self.threshold {
            params.threshold = Some(threshold);
        }
        Ok(params)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let params = arg.training_params()?;
    let rewards = RewardTable::new(arg.win, arg.draw, arg.loss, arg.invalid_move)
        .context("Invalid reward table")?;
    let prototype = Mlp::new(arg.topology.clone()).context("Invalid network topology")?;
    let evaluator = FitnessEvaluator::new(prototype, arg.difficulties.clone(), rewards);

    let seed = super::seed_or_random(arg.seed);
    let mut ga = GeneticAlgorithm::new(
        params,
        evaluator.chromosome_size(),
        Pcg32::seed_from_u64(seed),
    )
    .context("Invalid training parameters")?;

    let outcome = ga.run(&evaluator).context("Training failed")?;

    let mut network = evaluator.prototype().clone();
    network.load_parameters(outcome.best.chromosome())?;

    let model = TrainedModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        final_fitness: outcome.best.fitness(),
        generations: outcome.generations,
        termination: outcome.termination,
        seed,
        params,
        pipeline: arg.difficulties.clone(),
        rewards,
        network: network.to_record(),
    };
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Termination: {:?} after {} generations", model.termination, model.generations);
    eprintln!(
        "  Final fitness: {:.3} / {:.3}",
        model.final_fitness,
        evaluator.perfect_score()
    );
    eprintln!("  Network: {:?} ({} parameters)", network.topology(), network.parameter_count());

    Ok(())
}
