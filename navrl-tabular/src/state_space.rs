//! Discretized state space and action set of the navigation task.
//!
//! The state space is the Cartesian product of four small categorical axes
//! with cardinalities 3, 3, 4 and 4, giving 144 states. A state index is an
//! integer position into this enumeration; indices outside `[STATE_IND_MIN,
//! STATE_IND_MAX]` are invalid and handled by soft degradation in the
//! selection policies rather than by failing.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Minimum valid state index.
pub const STATE_IND_MIN: i64 = 0;

/// Maximum valid state index.
pub const STATE_IND_MAX: i64 = 143;

/// Number of discretized states.
pub const N_STATES: usize = (STATE_IND_MAX - STATE_IND_MIN + 1) as usize;

/// Number of actions.
pub const N_ACTIONS: usize = 3;

/// Action of the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Drive straight ahead.
    Forward,
    /// Turn to the left.
    TurnLeft,
    /// Turn to the right.
    TurnRight,
}

impl Action {
    /// Column index of the action in the Q-table.
    pub fn index(&self) -> usize {
        match self {
            Action::Forward => 0,
            Action::TurnLeft => 1,
            Action::TurnRight => 2,
        }
    }

    /// Action for a given column index, if in range.
    pub fn from_index(ix: usize) -> Option<Self> {
        match ix {
            0 => Some(Action::Forward),
            1 => Some(Action::TurnLeft),
            2 => Some(Action::TurnRight),
            _ => None,
        }
    }
}

impl navrl_core::Act for Action {}

/// Returns the ordered action set.
pub fn create_actions() -> [Action; N_ACTIONS] {
    [Action::Forward, Action::TurnLeft, Action::TurnRight]
}

/// Enumerates the full state space as an ordered collection of 4-tuples.
///
/// The order is lexicographic and stable within a process run; state indices
/// used elsewhere are positions into this collection.
pub fn create_state_space() -> Vec<[u8; 4]> {
    let axes: [&[u8]; 4] = [&[0, 1, 2], &[0, 1, 2], &[0, 1, 2, 3], &[0, 1, 2, 3]];
    axes.iter()
        .map(|axis| axis.iter().copied())
        .multi_cartesian_product()
        .map(|t| [t[0], t[1], t[2], t[3]])
        .collect()
}

/// Returns `true` if the index addresses a row of the Q-table.
pub fn is_valid_state(state_ind: i64) -> bool {
    (STATE_IND_MIN..=STATE_IND_MAX).contains(&state_ind)
}
