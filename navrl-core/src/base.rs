//! Core functionalities.
mod env;
mod policy;
mod step;
use std::fmt::Debug;

pub use env::Env;
pub use policy::{Configurable, Policy};
pub use step::{Info, Step};

/// An observation of an environment.
pub trait Obs: Clone + Debug {}

/// An action applied to an environment.
pub trait Act: Clone + Debug {}
