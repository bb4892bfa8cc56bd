#![warn(missing_docs)]
//! Core abstractions for reinforcement learning on mobile robots.
//!
//! This crate defines the traits through which an environment, a policy and
//! the surrounding control loop interact: [`Env`], [`Policy`], [`Obs`],
//! [`Act`] and [`Step`]. It also provides the [`record`] module for
//! collecting per-step metrics during training and evaluation.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Configurable, Env, Info, Obs, Policy, Step};
