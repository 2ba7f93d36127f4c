//! Robot description model for toolarm.
//!
//! Provides the typed link/joint graph of a serial arm, a URDF reader that
//! produces it, and the external joint-limit override document consumed by
//! the chain builder.

pub mod error;
pub mod limits;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::{LimitsError, ParseError};
pub use limits::{ExternalLimit, ExternalLimits, LimitBound, load_limits_file, parse_limits_str};
pub use parser::{parse_file, parse_string};
pub use types::{
    Inertial, JointKind, JointLimits, JointSpec, Link, MeshRef, Origin, RobotDescription, Visual,
};
