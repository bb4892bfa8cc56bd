//! Collaborator seams of the simulated robot platform.
//!
//! The Q-learning core does not talk to a simulator directly; it sees the
//! platform through these traits. Service failures behind them are hard
//! errors and propagate to the adapter layer, which owns retry policy.
use anyhow::Result;

/// 2-D position in the odometry frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// X coordinate in meters.
    pub x: f32,
    /// Y coordinate in meters.
    pub y: f32,
}

/// The simulated robot platform.
pub trait RobotSimulator {
    /// Latest range scan: 360 readings, one per degree, possibly containing
    /// infinite or NaN sentinel values.
    fn scan(&mut self) -> Result<Vec<f32>>;

    /// Robot position and yaw in the odometry frame.
    fn odometry(&mut self) -> Result<(Point, f32)>;

    /// Collision signal of the platform.
    fn crashed(&self) -> bool;

    /// Publishes a linear and angular velocity command.
    fn send_velocity(&mut self, linear: f32, angular: f32) -> Result<()>;

    /// Resets the simulation to its initial configuration.
    fn reset_simulation(&mut self) -> Result<()>;
}

/// The goal-respawn service.
pub trait GoalRespawn {
    /// Supplies the next goal position. `delete_previous` removes the
    /// visual marker of the previous goal.
    fn next_goal(&mut self, delete_previous: bool) -> Result<(f32, f32)>;
}

/// Maps per-tick sensor data to a state index.
///
/// The discretization from raw scan, heading and goal distance into one of
/// the 144 states is an external contract; implementations that return an
/// out-of-range index degrade the selection policies to random exploration
/// instead of failing.
pub trait StateDiscretizer {
    /// Returns the state index for the given normalized scan, heading and
    /// distance to goal.
    fn discretize(&self, scan: &[f32], heading: f32, distance: f32) -> i64;
}
