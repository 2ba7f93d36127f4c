//! Error types for chain construction and solver configuration.

/// Errors raised while building a [`Chain`](crate::Chain).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// The root link has no joints, so there is nothing to place an end
    /// effector on.
    #[error("root link {root} has no joints")]
    EmptyChain { root: String },

    /// No joint before the end effector can move.
    #[error("chain has no movable joint before the end effector")]
    NoActuatedJoints,

    /// Description and override ranges do not overlap.
    #[error("joint {joint}: merged limits are disjoint ({lower} > {upper})")]
    DisjointLimits {
        joint: String,
        lower: f32,
        upper: f32,
    },

    /// A movable joint declares a zero-length axis.
    #[error("joint {joint} has a zero-length axis")]
    DegenerateAxis { joint: String },
}

/// Invalid [`SolverConfig`](crate::SolverConfig) values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SolverConfigError {
    #[error("max_iterations must be > 0")]
    InvalidMaxIterations,

    #[error("tolerance must be a positive finite distance, got {0}")]
    InvalidTolerance(f32),

    #[error("damping_factor must be in (0, 1], got {0}")]
    InvalidDamping(f32),
}
