//! Configuration of the Q-learning agent.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Exploration strategy used when sampling actions.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum ExplorationStrategy {
    /// Always exploit the best-known action.
    Greedy,

    /// Explore uniformly with probability `epsilon`.
    EpsilonGreedy {
        /// Exploration probability in `[0, 1]`.
        epsilon: f32,
    },

    /// Boltzmann sampling at the given temperature.
    Softmax {
        /// Sampling temperature; values below the minimum degrade to greedy.
        temperature: f32,
    },
}

/// Configuration of [`QLearnAgent`](crate::agent::QLearnAgent).
///
/// `alpha` and `gamma` are expected in `[0, 1]`; they are the caller's
/// contract and not validated.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct QLearnConfig {
    /// Learning rate of the Bellman update.
    pub alpha: f32,

    /// Discount factor of the Bellman update.
    pub gamma: f32,

    /// Exploration strategy.
    pub strategy: ExplorationStrategy,
}

impl Default for QLearnConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            strategy: ExplorationStrategy::EpsilonGreedy { epsilon: 0.1 },
        }
    }
}

impl QLearnConfig {
    /// Sets the learning rate.
    pub fn alpha(mut self, v: f32) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the exploration strategy.
    pub fn strategy(mut self, v: ExplorationStrategy) -> Self {
        self.strategy = v;
        self
    }

    /// Constructs [`QLearnConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QLearnConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
