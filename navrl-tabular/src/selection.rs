//! Action-selection policies over the Q-table.
//!
//! Every policy here obeys a soft-degrade contract: an invalid state index
//! never raises, it yields a uniformly random action together with
//! [`Outcome::InvalidStateIndex`]. The surrounding control loop always gets
//! an action to apply; halting is worse than degrading to exploration.
use crate::qtable::QTable;
use crate::state_space::{is_valid_state, Action};
use rand::Rng;
use std::fmt;

/// Minimum sampling temperature of the Boltzmann distribution.
pub const T_MIN: f32 = 0.001;

/// Result of an action selection or a table update.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The operation completed normally.
    Ok,

    /// The state index was outside the table; a random action was taken
    /// (selection) or the table was left untouched (update).
    InvalidStateIndex,

    /// The sampled value fell through the cumulative-probability ladder.
    /// Unreachable under valid probabilities; carries the raw distribution
    /// for diagnostics.
    DistributionError {
        /// Boltzmann probabilities of the three actions.
        probs: [f32; 3],
        /// Raw action values of the row.
        qvals: [f32; 3],
        /// The uniform draw that failed to match.
        rnd: f32,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "OK"),
            Outcome::InvalidStateIndex => write!(f, "INVALID STATE INDEX"),
            Outcome::DistributionError { probs, qvals, rnd } => write!(
                f,
                "Boltzmann distribution error: P = ({}, {}, {}), rnd = {}, Q = ({}, {}, {})",
                probs[0], probs[1], probs[2], rnd, qvals[0], qvals[1], qvals[2]
            ),
        }
    }
}

/// Returns a uniformly sampled action from `actions`.
pub fn random_action<R: Rng>(actions: &[Action], rng: &mut R) -> Action {
    actions[rng.gen_range(0..actions.len())]
}

/// Greedy selection: the action of the maximum value in the row of
/// `state_ind`, ties broken by lowest action index.
///
/// An invalid index degrades to a random action.
pub fn best_action<R: Rng>(
    q: &QTable,
    state_ind: i64,
    actions: &[Action],
    rng: &mut R,
) -> (Action, Outcome) {
    if is_valid_state(state_ind) {
        (actions[q.argmax_row(state_ind as usize)], Outcome::Ok)
    } else {
        (random_action(actions, rng), Outcome::InvalidStateIndex)
    }
}

/// Epsilon-greedy selection: exploit with probability `1 - epsilon`,
/// explore uniformly otherwise.
///
/// When the greedy branch is taken the outcome of [`best_action`] is
/// propagated as is.
pub fn epsilon_greedy<R: Rng>(
    q: &QTable,
    state_ind: i64,
    actions: &[Action],
    epsilon: f32,
    rng: &mut R,
) -> (Action, Outcome) {
    let u: f32 = rng.gen();
    if u > epsilon && is_valid_state(state_ind) {
        best_action(q, state_ind, actions, rng)
    } else {
        (random_action(actions, rng), Outcome::Ok)
    }
}

/// Softmax (Boltzmann) selection at temperature `t`.
///
/// Probabilities are `P[a] = exp(Q[s,a]/t) / sum_a exp(Q[s,a]/t)`. A
/// temperature below [`T_MIN`], or a distribution degenerated to NaN by
/// overflow at extreme temperatures, delegates to [`best_action`].
pub fn softmax<R: Rng>(
    q: &QTable,
    state_ind: i64,
    actions: &[Action],
    t: f32,
    rng: &mut R,
) -> (Action, Outcome) {
    if !is_valid_state(state_ind) {
        return (random_action(actions, rng), Outcome::InvalidStateIndex);
    }

    let row = q.row(state_ind as usize);
    let sum: f32 = row.iter().map(|v| (v / t).exp()).sum();
    let p: Vec<f32> = row.iter().map(|v| (v / t).exp() / sum).collect();

    if t < T_MIN || p.iter().any(|v| v.is_nan()) {
        return best_action(q, state_ind, actions, rng);
    }

    let rnd: f32 = rng.gen();
    if p[0] > rnd {
        (Action::Forward, Outcome::Ok)
    } else if p[0] <= rnd && p[0] + p[1] > rnd {
        (Action::TurnLeft, Outcome::Ok)
    } else if p[0] + p[1] <= rnd {
        (Action::TurnRight, Outcome::Ok)
    } else {
        // Not reachable with well-formed probabilities.
        let (a, _) = best_action(q, state_ind, actions, rng);
        let outcome = Outcome::DistributionError {
            probs: [p[0], p[1], p[2]],
            qvals: [row[0], row[1], row[2]],
            rnd,
        };
        (a, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_space::{create_actions, N_ACTIONS, N_STATES};
    use rand::{rngs::SmallRng, SeedableRng};

    fn table() -> QTable {
        let mut q = QTable::zeros(N_STATES, N_ACTIONS).unwrap();
        q.set(0, 0, 0.5);
        q.set(0, 1, 0.5);
        q.set(0, 2, 0.1);
        q.set(10, 2, 4.0);
        q
    }

    #[test]
    fn best_action_takes_first_max() {
        let q = table();
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(0);
        let (a, outcome) = best_action(&q, 0, &actions, &mut rng);
        assert_eq!(a, Action::Forward);
        assert_eq!(outcome, Outcome::Ok);
        let (a, _) = best_action(&q, 10, &actions, &mut rng);
        assert_eq!(a, Action::TurnRight);
    }

    #[test]
    fn invalid_index_degrades_to_random_for_all_policies() {
        let q = table();
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(1);
        for &ix in &[-1i64, 144] {
            let (a, outcome) = best_action(&q, ix, &actions, &mut rng);
            assert_eq!(outcome, Outcome::InvalidStateIndex);
            assert!(actions.contains(&a));

            let (a, _) = epsilon_greedy(&q, ix, &actions, 0.0, &mut rng);
            assert!(actions.contains(&a));

            let (a, outcome) = softmax(&q, ix, &actions, 1.0, &mut rng);
            assert_eq!(outcome, Outcome::InvalidStateIndex);
            assert!(actions.contains(&a));
        }
    }

    #[test]
    fn epsilon_zero_always_exploits() {
        let q = table();
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..100 {
            let (a, outcome) = epsilon_greedy(&q, 10, &actions, 0.0, &mut rng);
            assert_eq!(a, Action::TurnRight);
            assert_eq!(outcome, Outcome::Ok);
        }
    }

    #[test]
    fn epsilon_one_explores_roughly_uniformly() {
        let q = table();
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut counts = [0usize; 3];
        let n = 10_000;
        for _ in 0..n {
            let (a, outcome) = epsilon_greedy(&q, 10, &actions, 1.0, &mut rng);
            assert_eq!(outcome, Outcome::Ok);
            counts[a.index()] += 1;
        }
        // Each arm should be near n/3; a generous band keeps the test stable.
        for &c in &counts {
            assert!(c > n / 3 - 500 && c < n / 3 + 500, "counts = {:?}", counts);
        }
    }

    #[test]
    fn softmax_concentrates_on_dominant_action() {
        let mut q = QTable::zeros(N_STATES, N_ACTIONS).unwrap();
        q.set(3, 0, 10.0);
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..100 {
            let (a, outcome) = softmax(&q, 3, &actions, 1.0, &mut rng);
            assert_eq!(a, Action::Forward);
            assert_eq!(outcome, Outcome::Ok);
        }
    }

    #[test]
    fn softmax_below_t_min_is_greedy() {
        let q = table();
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let (a, outcome) = softmax(&q, 10, &actions, 0.0001, &mut rng);
            assert_eq!(a, Action::TurnRight);
            assert_eq!(outcome, Outcome::Ok);
        }
    }

    #[test]
    fn softmax_overflow_falls_back_to_greedy() {
        // exp(1e6) overflows to inf and the normalized probabilities are NaN.
        let mut q = QTable::zeros(N_STATES, N_ACTIONS).unwrap();
        q.set(2, 1, 1.0e6);
        q.set(2, 2, 1.0e6);
        let actions = create_actions();
        let mut rng = SmallRng::seed_from_u64(6);
        let (a, outcome) = softmax(&q, 2, &actions, 1.0, &mut rng);
        assert_eq!(a, Action::TurnLeft);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn outcome_display_is_descriptive() {
        assert_eq!(Outcome::InvalidStateIndex.to_string(), "INVALID STATE INDEX");
        let e = Outcome::DistributionError {
            probs: [0.1, 0.2, 0.3],
            qvals: [1.0, 2.0, 3.0],
            rnd: 0.5,
        };
        let s = e.to_string();
        assert!(s.contains("0.5") && s.contains("Boltzmann"));
    }
}
