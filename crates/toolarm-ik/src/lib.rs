//! Kinematic chain and CCD inverse kinematics for toolarm.
//!
//! - [`Chain`] traces the serial chain of a [`RobotDescription`](toolarm_urdf::RobotDescription)
//!   and owns joint angles and world transforms
//! - [`merge_limits`] combines description limits with external overrides
//! - [`solve`] / [`CcdSolver`] move the end effector towards a target point

pub mod chain;
pub mod error;
pub mod limits;
pub mod solver;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use chain::{Chain, ChainJoint, origin_to_isometry};
pub use error::{BuildError, SolverConfigError};
pub use limits::{EffectiveLimits, merge_limits};
pub use solver::{
    ANGLE_EPSILON, CcdSolver, STALL_EPSILON, SolveResult, SolveStats, SolverConfig, VECTOR_EPSILON,
    solve,
};
