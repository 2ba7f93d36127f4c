//! Cyclic Coordinate Descent (CCD) IK solver.
//!
//! Each iteration sweeps the chain from the joint nearest the end effector
//! down to the base, turning (or sliding) one joint at a time so the end
//! effector moves towards the target. Only the end-effector position is
//! solved for.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::chain::{Chain, ChainJoint};
use crate::error::SolverConfigError;

/// Joint-frame vectors shorter than this carry no direction.
pub const VECTOR_EPSILON: f32 = 1e-6;
/// Per-joint corrections below this (rad) are skipped.
pub const ANGLE_EPSILON: f32 = 1e-5;
/// A sweep whose largest joint change is at most this has stalled.
pub const STALL_EPSILON: f32 = 1e-6;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the CCD solver. Every field is required when
/// deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of sweeps per solve.
    pub max_iterations: u32,
    /// End-effector distance (m) below which the solve has converged.
    pub tolerance: f32,
    /// Fraction of each per-joint correction that is applied.
    pub damping_factor: f32,
    /// When false, `solve` leaves the chain untouched.
    pub enabled: bool,
}

impl SolverConfig {
    /// Enabled configuration.
    pub const fn new(max_iterations: u32, tolerance: f32, damping_factor: f32) -> Self {
        Self {
            max_iterations,
            tolerance,
            damping_factor,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        if self.max_iterations == 0 {
            return Err(SolverConfigError::InvalidMaxIterations);
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolverConfigError::InvalidTolerance(self.tolerance));
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(SolverConfigError::InvalidDamping(self.damping_factor));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-solve event counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Corrections cut short by a joint limit.
    pub clamped: u32,
    /// Times a locked joint was held at its locked value.
    pub locked_holds: u32,
    /// Joint visits skipped for a degenerate direction or negligible delta.
    pub skipped: u32,
}

/// Outcome of one solve. Not converging is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub converged: bool,
    /// Sweeps performed.
    pub iterations: u32,
    /// End-effector distance to the target when the solve stopped (m).
    pub final_error: f32,
    pub stats: SolveStats,
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// CCD solver holding a validated [`SolverConfig`].
#[derive(Debug, Clone)]
pub struct CcdSolver {
    config: SolverConfig,
}

impl CcdSolver {
    /// # Errors
    ///
    /// Returns an error if `config` fails [`SolverConfig::validate`].
    pub fn new(config: SolverConfig) -> Result<Self, SolverConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Move `chain` so its end effector approaches `target`.
    pub fn solve(&self, chain: &mut Chain, target: &Vector3<f32>) -> SolveResult {
        solve(chain, target, &self.config)
    }
}

enum Step {
    Hold(f32),
    Move(f32),
    Skip,
}

/// Move `chain` so its end effector approaches `target`.
///
/// The config is used as given; use [`CcdSolver`] to have it validated.
pub fn solve(chain: &mut Chain, target: &Vector3<f32>, config: &SolverConfig) -> SolveResult {
    let mut stats = SolveStats::default();
    let mut error = (chain.end_effector_position() - target).norm();

    if !config.enabled {
        return SolveResult {
            converged: false,
            iterations: 0,
            final_error: error,
            stats,
        };
    }

    let tip = chain.end_effector();
    for iteration in 0..config.max_iterations {
        if error < config.tolerance {
            return finish(true, iteration, error, stats);
        }

        let mut max_change = 0.0_f32;
        for index in (0..tip).rev() {
            let joint = &chain.joints()[index];
            if joint.is_fixed() {
                continue;
            }
            let before = joint.angle();

            match plan_step(joint, &chain.end_effector_position(), target) {
                Step::Skip => stats.skipped += 1,
                Step::Hold(value) => {
                    chain.set_angle(index, value);
                    stats.locked_holds += 1;
                    max_change = max_change.max((value - before).abs());
                    tracing::trace!(
                        joint = chain.joints()[index].name(),
                        value,
                        "holding locked joint"
                    );
                }
                Step::Move(delta) => {
                    let requested = before + delta * config.damping_factor;
                    let Some(applied) = chain.set_angle(index, requested) else {
                        continue;
                    };
                    if applied != requested {
                        stats.clamped += 1;
                        tracing::trace!(
                            joint = chain.joints()[index].name(),
                            requested,
                            applied,
                            "joint limit clamp"
                        );
                    }
                    max_change = max_change.max((applied - before).abs());
                }
            }
        }

        error = (chain.end_effector_position() - target).norm();
        if error < config.tolerance {
            return finish(true, iteration + 1, error, stats);
        }
        if max_change <= STALL_EPSILON {
            return finish(false, iteration + 1, error, stats);
        }
    }

    finish(false, config.max_iterations, error, stats)
}

fn finish(converged: bool, iterations: u32, final_error: f32, stats: SolveStats) -> SolveResult {
    tracing::trace!(
        converged,
        iterations,
        final_error,
        clamped = stats.clamped,
        locked_holds = stats.locked_holds,
        "ccd solve finished"
    );
    SolveResult {
        converged,
        iterations,
        final_error,
        stats,
    }
}

fn plan_step(joint: &ChainJoint, effector: &Vector3<f32>, target: &Vector3<f32>) -> Step {
    if let Some(limits) = joint.limits().filter(|l| l.is_locked()) {
        return Step::Hold(limits.lower);
    }
    let delta = if joint.is_prismatic() {
        slide_delta(joint, effector, target)
    } else {
        hinge_delta(joint, effector, target)
    };
    delta.map_or(Step::Skip, Step::Move)
}

/// Signed rotation about the joint axis that swings the end effector
/// towards the target, both taken in the joint frame.
fn hinge_delta(joint: &ChainJoint, effector: &Vector3<f32>, target: &Vector3<f32>) -> Option<f32> {
    let frame = joint.world_transform();
    let to_effector = frame.inverse_transform_point(&Point3::from(*effector)).coords;
    let to_target = frame.inverse_transform_point(&Point3::from(*target)).coords;
    if to_effector.norm() < VECTOR_EPSILON || to_target.norm() < VECTOR_EPSILON {
        return None;
    }

    // Keep only the part of each direction that the hinge can rotate.
    let axis = joint.axis().into_inner();
    let from = to_effector.normalize();
    let to = to_target.normalize();
    let from = from - axis * axis.dot(&from);
    let to = to - axis * axis.dot(&to);
    if from.norm() < VECTOR_EPSILON || to.norm() < VECTOR_EPSILON {
        return None;
    }

    let angle = axis.dot(&from.cross(&to)).atan2(from.dot(&to));
    (angle.abs() >= ANGLE_EPSILON).then_some(angle)
}

/// Displacement along the joint axis equal to the projection of the
/// remaining error.
fn slide_delta(joint: &ChainJoint, effector: &Vector3<f32>, target: &Vector3<f32>) -> Option<f32> {
    let axis = joint.world_transform().rotation * joint.axis().into_inner();
    let delta = (target - effector).dot(&axis);
    (delta.abs() >= VECTOR_EPSILON).then_some(delta)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
