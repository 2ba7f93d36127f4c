//! Frame-driven playback of a waypoint path through the IK solver.
//!
//! An [`ArmSession`] owns one [`Chain`] together with the solver and path
//! state that drive it. Each [`step`](ArmSession::step) ticks the path,
//! solves towards the smoothed target and rebuilds the trail from where the
//! end effector actually ended up.

use nalgebra::{Isometry3, Vector3};

use toolarm_ik::{CcdSolver, Chain, SolveResult, SolverConfig};
use toolarm_path::{PathConfig, PathError, PathState, PlaybackState};

use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::stats::PlaybackStats;

/// Pose of one joint for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPose {
    pub name: String,
    pub angle: f32,
    pub world: Isometry3<f32>,
}

/// What happened during one [`ArmSession::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// `None` when no waypoints are loaded and the solver did not run.
    pub solve: Option<SolveResult>,
    pub path_target: Vector3<f32>,
    pub solver_target: Vector3<f32>,
    /// End-effector position after the solve.
    pub effector: Vector3<f32>,
    pub progress: f32,
    pub state: PlaybackState,
}

/// A chain paired with the solver and path state that animate it.
#[derive(Debug, Clone)]
pub struct ArmSession {
    chain: Chain,
    solver: CcdSolver,
    path: PathState,
    stats: PlaybackStats,
}

impl ArmSession {
    /// # Errors
    ///
    /// Returns an error if either config fails validation.
    pub fn new(
        chain: Chain,
        solver_config: SolverConfig,
        path_config: PathConfig,
    ) -> Result<Self, ConfigError> {
        path_config.validate()?;
        Ok(Self {
            chain,
            solver: CcdSolver::new(solver_config)?,
            path: PathState::new(path_config),
            stats: PlaybackStats::new(),
        })
    }

    /// Session from the solver and path sections of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either section fails validation.
    pub fn from_config(chain: Chain, config: &SessionConfig) -> Result<Self, ConfigError> {
        Self::new(chain, config.solver, config.path)
    }

    pub const fn chain(&self) -> &Chain {
        &self.chain
    }

    pub const fn path(&self) -> &PathState {
        &self.path
    }

    /// Direct access to playback controls (seek, speed, index).
    pub fn path_mut(&mut self) -> &mut PathState {
        &mut self.path
    }

    pub const fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    pub const fn solver_config(&self) -> &SolverConfig {
        self.solver.config()
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Vector3<f32>>) {
        self.path.set_waypoints(waypoints);
    }

    pub fn play(&mut self) -> Result<(), PathError> {
        self.path.play()
    }

    pub fn pause(&mut self) {
        self.path.pause();
    }

    /// Rewind playback. The arm keeps its pose.
    pub fn reset(&mut self) {
        self.path.reset();
    }

    /// Advance one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> FrameReport {
        let path_target = self.path.tick(dt);
        let solver_target = *self.path.solver_target();

        let solve = if self.path.waypoints().is_empty() {
            None
        } else {
            Some(self.solver.solve(&mut self.chain, &solver_target))
        };

        let effector = self.chain.end_effector_position();
        self.path.update_trail(&effector);
        self.stats.record(solve.as_ref());

        FrameReport {
            solve,
            path_target,
            solver_target,
            effector,
            progress: self.path.progress(),
            state: self.path.state(),
        }
    }

    /// Swap in a freshly built chain, keeping waypoints, playback position
    /// and statistics.
    pub fn reload(&mut self, chain: Chain) {
        tracing::info!(
            joints = chain.len(),
            dof = chain.dof(),
            "reloaded kinematic chain"
        );
        self.chain = chain;
    }

    /// Name, angle and world transform of every joint, base to tip.
    pub fn joint_poses(&self) -> Vec<JointPose> {
        self.chain
            .joints()
            .iter()
            .map(|joint| JointPose {
                name: joint.name().to_owned(),
                angle: joint.angle(),
                world: *joint.world_transform(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
