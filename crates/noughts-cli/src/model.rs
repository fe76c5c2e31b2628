use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use noughts_evaluator::{
    fitness::{DifficultyPipeline, RewardTable},
    mlp::{Mlp, MlpRecord},
};
use noughts_training::{genetic::Termination, params::TrainingParams};
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained network together with how it was trained.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainedModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    pub generations: usize,
    pub termination: Termination,
    pub seed: u64,
    pub params: TrainingParams,
    pub pipeline: DifficultyPipeline,
    pub rewards: RewardTable,
    pub network: MlpRecord,
}

impl TrainedModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("model", path)
    }

    pub fn to_mlp(&self) -> anyhow::Result<Mlp> {
        Mlp::try_from(self.network.clone())
            .with_context(|| format!("Invalid network in model {}", self.name))
    }
}
