/// Errors from [`PathState`](crate::PathState) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("no waypoints loaded")]
    NoWaypoints,
}

/// Invalid [`PathConfig`](crate::PathConfig) values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PathConfigError {
    #[error("speed must be finite and >= 0, got {0}")]
    InvalidSpeed(f32),

    #[error("smoothing_rate must be finite and > 0, got {0}")]
    InvalidSmoothingRate(f32),

    #[error("snap_distance must be finite and >= 0, got {0}")]
    InvalidSnapDistance(f32),

    #[error("trail_threshold must be finite and > 0, got {0}")]
    InvalidTrailThreshold(f32),
}
