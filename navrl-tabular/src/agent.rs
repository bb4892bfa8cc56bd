//! Tabular Q-learning agent.
use crate::config::{ExplorationStrategy, QLearnConfig};
use crate::env::{NavEnv, NavObs};
use crate::qtable::QTable;
use crate::selection::{best_action, epsilon_greedy, softmax, Outcome};
use crate::sim::{GoalRespawn, RobotSimulator, StateDiscretizer};
use crate::state_space::{create_actions, Action, N_ACTIONS, N_STATES};
use anyhow::Result;
use log::warn;
use navrl_core::{Configurable, Policy};
use rand::{rngs::SmallRng, SeedableRng};
use std::path::Path;

/// A policy over the discretized navigation states, backed by a [`QTable`].
///
/// The agent owns its table exclusively; `opt` mutates it in place with the
/// Bellman update after each observed transition.
pub struct QLearnAgent {
    q: QTable,
    config: QLearnConfig,
    actions: [Action; N_ACTIONS],
    rng: SmallRng,
}

impl QLearnAgent {
    /// Creates an agent with a zero-initialized table and entropy-seeded
    /// randomness.
    pub fn new(config: QLearnConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Creates an agent with a fixed random seed.
    pub fn with_seed(config: QLearnConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: QLearnConfig, rng: SmallRng) -> Self {
        Self {
            // The state space is fixed; a zero table of the full shape
            // always exists.
            q: QTable::zeros(N_STATES, N_ACTIONS).expect("state space is non-empty"),
            config,
            actions: create_actions(),
            rng,
        }
    }

    /// Replaces the table with one persisted by [`QLearnAgent::save_table`].
    pub fn load_table(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.q = QTable::load(path)?;
        Ok(())
    }

    /// Persists the table.
    pub fn save_table(&self, path: impl AsRef<Path>) -> Result<()> {
        self.q.save(path)
    }

    /// The agent's Q-table.
    pub fn q_table(&self) -> &QTable {
        &self.q
    }

    /// Selects an action for a state index according to the configured
    /// exploration strategy, reporting the selection outcome.
    pub fn select(&mut self, state_ind: i64) -> (Action, Outcome) {
        match self.config.strategy {
            ExplorationStrategy::Greedy => {
                best_action(&self.q, state_ind, &self.actions, &mut self.rng)
            }
            ExplorationStrategy::EpsilonGreedy { epsilon } => {
                epsilon_greedy(&self.q, state_ind, &self.actions, epsilon, &mut self.rng)
            }
            ExplorationStrategy::Softmax { temperature } => {
                softmax(&self.q, state_ind, &self.actions, temperature, &mut self.rng)
            }
        }
    }

    /// Applies the Bellman update for an observed transition.
    pub fn opt(
        &mut self,
        state_ind: i64,
        action: Action,
        reward: f32,
        next_state_ind: i64,
    ) -> Outcome {
        self.q.update(
            state_ind,
            action,
            reward,
            next_state_ind,
            self.config.alpha,
            self.config.gamma,
        )
    }
}

impl Configurable for QLearnAgent {
    type Config = QLearnConfig;

    fn build(config: Self::Config) -> Self {
        Self::new(config)
    }
}

impl<S, G, D> Policy<NavEnv<S, G, D>> for QLearnAgent
where
    S: RobotSimulator + Default,
    G: GoalRespawn + Default,
    D: StateDiscretizer + Default,
{
    fn sample(&mut self, obs: &NavObs) -> Action {
        let (a, outcome) = self.select(obs.state_ind);
        if outcome != Outcome::Ok {
            warn!("action selection degraded: {}", outcome);
        }
        a
    }
}
