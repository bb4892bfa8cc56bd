//! Environment adapter over the simulated robot platform.
//!
//! [`NavEnv`] wires the collaborator seams of [`crate::sim`] into the
//! [`Env`] trait: each step publishes a velocity command for the chosen
//! action, observes the resulting scan and odometry, discretizes the state
//! and computes the composite reward.
use crate::reward::{normalize_scan, step_reward, NavContext};
use crate::sim::{GoalRespawn, Point, RobotSimulator, StateDiscretizer};
use crate::state_space::Action;
use anyhow::Result;
use navrl_core::{
    record::{Record, RecordValue},
    Env, Obs, Step,
};
use serde::{Deserialize, Serialize};

/// Configuration of [`NavEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NavEnvConfig {
    /// Constant linear velocity of the robot in m/s.
    pub linear_vel: f32,

    /// Maximum angular velocity in rad/s.
    pub max_angular_vel: f32,
}

impl Default for NavEnvConfig {
    fn default() -> Self {
        Self {
            linear_vel: 0.15,
            max_angular_vel: 1.5,
        }
    }
}

/// Observation of the environment: the discretized state index.
///
/// The index may be out of range when the discretizer degrades; the
/// selection policies handle that case by falling back to exploration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavObs {
    /// State index into the Q-table.
    pub state_ind: i64,
}

impl Obs for NavObs {}

/// Environment adapter for the navigation task.
pub struct NavEnv<S, G, D> {
    config: NavEnvConfig,
    sim: S,
    respawn: G,
    discretizer: D,
    ctx: NavContext,
    prev_scan: Vec<f32>,
    prev_action: Action,
    init_goal: bool,
}

impl<S, G, D> NavEnv<S, G, D> {
    /// Creates the adapter around the given collaborators.
    pub fn new(config: NavEnvConfig, sim: S, respawn: G, discretizer: D) -> Self {
        Self {
            config,
            sim,
            respawn,
            discretizer,
            ctx: NavContext::new(),
            prev_scan: Vec::new(),
            prev_action: Action::Forward,
            init_goal: true,
        }
    }

    /// The per-tick goal geometry.
    pub fn context(&self) -> &NavContext {
        &self.ctx
    }

    /// Angular velocity for an action: forward drives straight, the turn
    /// actions steer at half the maximum rate in either direction.
    fn angular_vel(&self, a: Action) -> f32 {
        match a {
            Action::Forward => 0.0,
            Action::TurnLeft => self.config.max_angular_vel * 0.5,
            Action::TurnRight => -self.config.max_angular_vel * 0.5,
        }
    }
}

impl<S, G, D> NavEnv<S, G, D>
where
    S: RobotSimulator + Default,
    G: GoalRespawn + Default,
    D: StateDiscretizer + Default,
{
    fn observe(&mut self) -> Result<(Vec<f32>, NavObs)> {
        let scan = normalize_scan(&self.sim.scan()?);
        let (position, yaw) = self.sim.odometry()?;
        self.ctx.update_odometry(position, yaw);
        let state_ind =
            self.discretizer
                .discretize(&scan, self.ctx.heading(), self.ctx.distance_to_goal());
        Ok((scan, NavObs { state_ind }))
    }

    fn try_step(&mut self, a: &Action) -> Result<(Step<Self>, Record)> {
        self.sim.send_velocity(self.config.linear_vel, self.angular_vel(*a))?;

        let (scan, obs) = self.observe()?;
        let crash = self.sim.crashed();
        let (reward, is_terminated) = step_reward(
            &mut self.ctx,
            *a,
            self.prev_action,
            &scan,
            &self.prev_scan,
            crash,
            &mut self.sim,
            &mut self.respawn,
        )?;

        let mut record = Record::empty();
        record.insert("state_ind", RecordValue::Scalar(obs.state_ind as f32));
        record.insert("heading", RecordValue::Scalar(self.ctx.heading()));
        record.insert(
            "goal_distance",
            RecordValue::Scalar(self.ctx.distance_to_goal()),
        );

        self.prev_scan = scan;
        self.prev_action = *a;

        Ok((Step::new(obs, *a, reward, is_terminated, ()), record))
    }

    fn try_reset(&mut self) -> Result<NavObs> {
        self.sim.reset_simulation()?;

        if self.init_goal {
            let (gx, gy) = self.respawn.next_goal(false)?;
            self.ctx.set_goal(Point { x: gx, y: gy });
            self.init_goal = false;
        }

        let (scan, obs) = self.observe()?;
        self.ctx.rebase_goal_distance();
        self.prev_scan = scan;
        self.prev_action = Action::Forward;
        Ok(obs)
    }
}

impl<S, G, D> Env for NavEnv<S, G, D>
where
    S: RobotSimulator + Default,
    G: GoalRespawn + Default,
    D: StateDiscretizer + Default,
{
    type Config = NavEnvConfig;
    type Obs = NavObs;
    type Act = Action;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self::new(
            config.clone(),
            S::default(),
            G::default(),
            D::default(),
        ))
    }

    /// Simulator service failures are fatal here; the core performs no
    /// retries (they belong to the adapter layer above).
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.try_step(a).expect("robot platform failure during step")
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.try_reset()
    }
}
