use std::path::PathBuf;

use anyhow::Context;
use noughts_evaluator::{
    match_play,
    minimax::{Difficulty, MinimaxAgent},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{model::TrainedModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Trained model file
    pub(crate) model: PathBuf,
    /// Opponent difficulty
    #[arg(long, default_value = "hard")]
    pub(crate) difficulty: Difficulty,
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    pub(crate) rounds: usize,
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Output file path for the JSON tally
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let model = TrainedModel::open(&arg.model)?;
    let mut candidate = model.to_mlp()?;
    let seed = super::seed_or_random(arg.seed);
    let mut opponent = MinimaxAgent::new(arg.difficulty, Pcg32::seed_from_u64(seed));

    let tally = match_play::test_against(&mut candidate, &mut opponent, arg.rounds)
        .with_context(|| format!("Failed to play {} against {}", model.name, arg.difficulty))?;

    eprintln!(
        "{} ({:?}) vs {} opponent, {} games:",
        model.name,
        candidate.topology(),
        arg.difficulty,
        tally.games()
    );
    eprintln!("  {tally}");
    Output::save_json(&tally, arg.output.clone())?;

    Ok(())
}
