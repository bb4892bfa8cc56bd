//! Composite reward of the navigation task.
//!
//! The per-step reward combines four terms: a small bonus for driving
//! forward, an obstacle term from the change of clearance in the frontal
//! arc, a penalty for reversing turn direction, and a goal-directed shaping
//! term from heading alignment and distance to goal. A crash short-circuits
//! everything to a large negative terminal reward.
use crate::sim::{GoalRespawn, Point, RobotSimulator};
use crate::state_space::Action;
use anyhow::Result;
use log::info;
use ndarray::{concatenate, Array1, Axis};
use std::f32::consts::PI;

/// Number of readings in a range scan, one per degree.
pub const SCAN_LEN: usize = 360;

/// Half-width of the frontal horizon window, in scan samples.
pub const HORIZON_WIDTH: usize = 75;

/// Replacement for infinite range readings.
pub const MAX_SCAN_RANGE: f32 = 3.5;

/// Distance to goal below which the goal counts as reached.
pub const GOAL_RADIUS: f32 = 0.2;

/// Reward on collision.
const CRASH_REWARD: f32 = -100.0;

/// Reward override when the goal is reached.
const GOAL_REWARD: f32 = 1000.0;

/// Replaces sentinel readings: infinity becomes [`MAX_SCAN_RANGE`] and NaN
/// becomes zero.
pub fn normalize_scan(ranges: &[f32]) -> Vec<f32> {
    ranges
        .iter()
        .map(|r| {
            if r.is_infinite() {
                MAX_SCAN_RANGE
            } else if r.is_nan() {
                0.0
            } else {
                *r
            }
        })
        .collect()
}

/// Per-tick goal geometry of the robot.
///
/// The surrounding event loop owns one instance and feeds odometry
/// notifications into it; the reward functions take it as an explicit
/// parameter instead of reading shared mutable state.
#[derive(Clone, Debug, Default)]
pub struct NavContext {
    goal: Point,
    position: Point,
    heading: f32,
    goal_distance: f32,
    goal_reached: bool,
}

impl NavContext {
    /// Creates a context with no goal set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new goal and rebases the spawn distance on it.
    pub fn set_goal(&mut self, goal: Point) {
        self.goal = goal;
        self.goal_reached = false;
        self.rebase_goal_distance();
    }

    /// Records the distance to the current goal as the spawn distance used
    /// by the distance-rate multiplier.
    pub fn rebase_goal_distance(&mut self) {
        self.goal_distance = self.distance_to_goal();
    }

    /// Updates position and heading from an odometry notification.
    ///
    /// The heading is the bearing of the goal relative to the robot's yaw,
    /// wrapped into `(-pi, pi]` and rounded to two decimals.
    pub fn update_odometry(&mut self, position: Point, yaw: f32) {
        self.position = position;
        let goal_angle = (self.goal.y - position.y).atan2(self.goal.x - position.x);
        let mut heading = goal_angle - yaw;
        if heading > PI {
            heading -= 2.0 * PI;
        } else if heading < -PI {
            heading += 2.0 * PI;
        }
        self.heading = round2(heading);
    }

    /// Euclidean distance from the robot to the goal, rounded to two
    /// decimals.
    pub fn distance_to_goal(&self) -> f32 {
        round2((self.goal.x - self.position.x).hypot(self.goal.y - self.position.y))
    }

    /// Current goal-relative heading.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Current goal position.
    pub fn goal(&self) -> Point {
        self.goal
    }

    /// Distance to the goal at the time it was spawned.
    pub fn goal_distance(&self) -> f32 {
        self.goal_distance
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Triangular alignment score of a heading sector: 1.0 at perfect
/// alignment, decaying linearly with angular offset, wrapping modulo 2*pi.
fn alignment_score(angle: f32) -> f32 {
    let x = 0.25 + (0.5 * angle).rem_euclid(2.0 * PI) / PI;
    1.0 - 4.0 * (0.5 - x.fract()).abs()
}

/// Goal-directed shaping reward for the chosen action.
///
/// Scores three candidate heading sectors around the current heading with
/// [`alignment_score`] and scales the chosen sector's score by
/// `2^(distance / spawn_distance)`, amplifying the alignment reward when
/// the robot has strayed from the original goal distance. Reaching the
/// goal overrides the reward with a large bonus, stops the robot and
/// requests a respawned goal.
pub fn goal_reward<S, G>(
    ctx: &mut NavContext,
    action: Action,
    sim: &mut S,
    respawn: &mut G,
) -> Result<f32>
where
    S: RobotSimulator,
    G: GoalRespawn,
{
    let current_distance = ctx.distance_to_goal();
    if current_distance < GOAL_RADIUS {
        ctx.goal_reached = true;
    }

    let mut yaw_reward = [0.0f32; 3];
    for (i, r) in yaw_reward.iter_mut().enumerate() {
        let angle = -PI / 4.0 + ctx.heading + (PI / 8.0) * i as f32 + PI / 2.0;
        *r = alignment_score(angle);
    }

    let distance_rate = 2f32.powf(current_distance / ctx.goal_distance);
    let mut reward = round2(yaw_reward[action.index()] * 5.0) * distance_rate;

    if ctx.goal_reached {
        info!("Goal reached, respawning");
        reward = GOAL_REWARD;
        sim.send_velocity(0.0, 0.0)?;
        let (gx, gy) = respawn.next_goal(true)?;
        ctx.set_goal(Point { x: gx, y: gy });
    }

    Ok(reward)
}

/// Composite step reward; returns the reward and the terminal flag.
///
/// A crash yields `(-100, true)` unconditionally. Otherwise the reward is
/// the sum of the action term (+0.2 forward, -0.1 turn), the obstacle term
/// (+-0.2 from the edge-weighted change of frontal clearance), the
/// turn-reversal penalty (-0.8) and the invoked [`goal_reward`].
#[allow(clippy::too_many_arguments)]
pub fn step_reward<S, G>(
    ctx: &mut NavContext,
    action: Action,
    prev_action: Action,
    scan: &[f32],
    prev_scan: &[f32],
    crash: bool,
    sim: &mut S,
    respawn: &mut G,
) -> Result<(f32, bool)>
where
    S: RobotSimulator,
    G: GoalRespawn,
{
    if crash {
        info!("Collision");
        return Ok((CRASH_REWARD, true));
    }

    let horizon = horizon_window(scan);
    let prev_horizon = horizon_window(prev_scan);

    let r_action = if action == Action::Forward { 0.2 } else { -0.1 };

    let w = edge_weights(horizon.len());
    let clearance_shift = (&w * &(horizon - prev_horizon)).sum();
    let r_obstacle = if clearance_shift >= 0.0 { 0.2 } else { -0.2 };

    let r_change = if (prev_action == Action::TurnLeft && action == Action::TurnRight)
        || (prev_action == Action::TurnRight && action == Action::TurnLeft)
    {
        -0.8
    } else {
        0.0
    };

    let r_goal = goal_reward(ctx, action, sim, respawn)?;

    Ok((r_action + r_obstacle + r_change + r_goal, false))
}

/// Frontal arc of the scan, spanning the 0/360 degree wrap seam.
///
/// Two reversed slices of [`HORIZON_WIDTH`] samples are taken from the two
/// ends of the array adjacent to the seam, so the window reads the frontal
/// arc continuously from left to right.
fn horizon_window(scan: &[f32]) -> Array1<f32> {
    let mut w: Vec<f32> = scan[1..=HORIZON_WIDTH].iter().rev().copied().collect();
    w.extend(scan[SCAN_LEN - HORIZON_WIDTH..SCAN_LEN].iter().rev());
    Array1::from(w)
}

/// Symmetric weights emphasizing the edges of the horizon window,
/// ramping 0.9 -> 1.1 over the first half and 1.1 -> 0.9 over the second.
fn edge_weights(len: usize) -> Array1<f32> {
    let half = len / 2;
    concatenate![
        Axis(0),
        Array1::linspace(0.9, 1.1, half),
        Array1::linspace(1.1, 0.9, half)
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GoalRespawn, Point, RobotSimulator};
    use anyhow::Result;

    #[derive(Default)]
    struct RecordingSim {
        sent: Vec<(f32, f32)>,
    }

    impl RobotSimulator for RecordingSim {
        fn scan(&mut self) -> Result<Vec<f32>> {
            Ok(vec![MAX_SCAN_RANGE; SCAN_LEN])
        }
        fn odometry(&mut self) -> Result<(Point, f32)> {
            Ok((Point::default(), 0.0))
        }
        fn crashed(&self) -> bool {
            false
        }
        fn send_velocity(&mut self, linear: f32, angular: f32) -> Result<()> {
            self.sent.push((linear, angular));
            Ok(())
        }
        fn reset_simulation(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FixedRespawn {
        calls: usize,
    }

    impl GoalRespawn for FixedRespawn {
        fn next_goal(&mut self, _delete_previous: bool) -> Result<(f32, f32)> {
            self.calls += 1;
            Ok((2.0, 0.0))
        }
    }

    fn far_ctx() -> NavContext {
        let mut ctx = NavContext::new();
        ctx.set_goal(Point { x: 2.0, y: 0.0 });
        ctx.update_odometry(Point::default(), 0.0);
        ctx
    }

    #[test]
    fn normalize_scan_replaces_sentinels() {
        let scan = vec![1.0, f32::INFINITY, f32::NAN, 0.5];
        assert_eq!(normalize_scan(&scan), vec![1.0, MAX_SCAN_RANGE, 0.0, 0.5]);
    }

    #[test]
    fn crash_is_terminal_with_fixed_reward() {
        let mut ctx = far_ctx();
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();
        let scan = vec![1.0; SCAN_LEN];
        let (r, terminal) = step_reward(
            &mut ctx,
            Action::Forward,
            Action::Forward,
            &scan,
            &scan,
            true,
            &mut sim,
            &mut respawn,
        )
        .unwrap();
        assert_eq!(r, -100.0);
        assert!(terminal);
    }

    #[test]
    fn composite_sums_action_obstacle_and_goal_terms() {
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();
        let scan = vec![2.0; SCAN_LEN];

        // Stable clearance: +0.2 obstacle term; forward: +0.2 action term.
        let mut ctx = far_ctx();
        let r_goal = goal_reward(&mut ctx, Action::Forward, &mut sim, &mut respawn).unwrap();
        let mut ctx = far_ctx();
        let (r, terminal) = step_reward(
            &mut ctx,
            Action::Forward,
            Action::Forward,
            &scan,
            &scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();
        assert!(!terminal);
        assert!((r - (0.2 + 0.2 + r_goal)).abs() < 1e-5);

        // Turning costs -0.1 instead.
        let mut ctx = far_ctx();
        let r_goal = goal_reward(&mut ctx, Action::TurnLeft, &mut sim, &mut respawn).unwrap();
        let mut ctx = far_ctx();
        let (r, _) = step_reward(
            &mut ctx,
            Action::TurnLeft,
            Action::Forward,
            &scan,
            &scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();
        assert!((r - (-0.1 + 0.2 + r_goal)).abs() < 1e-5);
    }

    #[test]
    fn shrinking_clearance_is_penalized() {
        let mut ctx = far_ctx();
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();
        let prev_scan = vec![2.0; SCAN_LEN];
        let scan = vec![1.0; SCAN_LEN];
        let (r_closing, _) = step_reward(
            &mut ctx,
            Action::Forward,
            Action::Forward,
            &scan,
            &prev_scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();

        let mut ctx = far_ctx();
        let (r_stable, _) = step_reward(
            &mut ctx,
            Action::Forward,
            Action::Forward,
            &prev_scan,
            &prev_scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();

        assert!((r_stable - r_closing - 0.4).abs() < 1e-5);
    }

    #[test]
    fn reversing_turn_direction_is_penalized() {
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();
        let scan = vec![2.0; SCAN_LEN];

        let mut ctx = far_ctx();
        let (r_reversal, _) = step_reward(
            &mut ctx,
            Action::TurnRight,
            Action::TurnLeft,
            &scan,
            &scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();

        let mut ctx = far_ctx();
        let (r_keep, _) = step_reward(
            &mut ctx,
            Action::TurnRight,
            Action::TurnRight,
            &scan,
            &scan,
            false,
            &mut sim,
            &mut respawn,
        )
        .unwrap();

        assert!((r_keep - r_reversal - 0.8).abs() < 1e-5);
    }

    #[test]
    fn reaching_goal_overrides_reward_and_respawns() {
        let mut ctx = NavContext::new();
        ctx.set_goal(Point { x: 0.1, y: 0.0 });
        ctx.update_odometry(Point::default(), 0.0);
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();

        let r = goal_reward(&mut ctx, Action::Forward, &mut sim, &mut respawn).unwrap();
        assert_eq!(r, 1000.0);
        // Robot stopped and a new goal installed.
        assert_eq!(sim.sent, vec![(0.0, 0.0)]);
        assert_eq!(respawn.calls, 1);
        assert_eq!(ctx.goal(), Point { x: 2.0, y: 0.0 });
        assert_eq!(ctx.goal_distance(), 2.0);
    }

    #[test]
    fn facing_the_goal_scores_higher_than_facing_away() {
        let mut sim = RecordingSim::default();
        let mut respawn = FixedRespawn::default();

        let mut towards = far_ctx();
        let r_towards = goal_reward(&mut towards, Action::Forward, &mut sim, &mut respawn).unwrap();

        let mut away = NavContext::new();
        away.set_goal(Point { x: 2.0, y: 0.0 });
        away.update_odometry(Point::default(), PI);
        let r_away = goal_reward(&mut away, Action::Forward, &mut sim, &mut respawn).unwrap();

        assert!(r_towards > r_away);
    }

    #[test]
    fn heading_is_wrapped_and_rounded() {
        let mut ctx = NavContext::new();
        ctx.set_goal(Point { x: -1.0, y: 0.0 });
        // Goal behind the robot while yawed -3pi/4: raw difference exceeds pi.
        ctx.update_odometry(Point::default(), -3.0 * PI / 4.0);
        assert!(ctx.heading() > -PI && ctx.heading() <= PI);
        assert_eq!(ctx.heading(), round2(ctx.heading()));
    }
}
