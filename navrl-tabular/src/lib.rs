#![warn(missing_docs)]
//! Tabular Q-learning for goal-directed, obstacle-avoiding robot navigation.
//!
//! The decision core lives in [`state_space`], [`qtable`], [`selection`]
//! and [`reward`]: a 144-state discretized space, a dense Q-table with
//! plain-text persistence, greedy/epsilon-greedy/softmax selection with a
//! soft-degrade contract on invalid state indices, and the composite
//! navigation reward. The [`env`] module adapts a simulated robot platform
//! (seen only through the traits in [`sim`]) to the
//! [`Env`](navrl_core::Env) trait, and [`agent`] wraps the table and the
//! selection policies into a [`Policy`](navrl_core::Policy).
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod qtable;
pub mod reward;
pub mod selection;
pub mod sim;
pub mod state_space;

pub use agent::QLearnAgent;
pub use config::{ExplorationStrategy, QLearnConfig};
pub use env::{NavEnv, NavEnvConfig, NavObs};
pub use qtable::QTable;
pub use selection::Outcome;
pub use state_space::Action;
