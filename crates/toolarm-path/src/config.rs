use serde::{Deserialize, Serialize};

use crate::error::PathConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_speed() -> f32 {
    1.0
}
const fn default_smoothing_rate() -> f32 {
    8.0
}
const fn default_snap_distance() -> f32 {
    0.1
}
const fn default_trail_threshold() -> f32 {
    1.0
}

// ---------------------------------------------------------------------------
// PathConfig
// ---------------------------------------------------------------------------

/// Playback tuning for a [`PathState`](crate::PathState).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Waypoint segments traversed per second (default: 1.0).
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Rate (1/s) at which the solver target chases the path target
    /// (default: 8.0).
    #[serde(default = "default_smoothing_rate")]
    pub smoothing_rate: f32,

    /// Below this distance the solver target jumps onto the path target
    /// (default: 0.1).
    #[serde(default = "default_snap_distance")]
    pub snap_distance: f32,

    /// A waypoint counts as passed once the effector is closer than this
    /// (default: 1.0).
    #[serde(default = "default_trail_threshold")]
    pub trail_threshold: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            smoothing_rate: default_smoothing_rate(),
            snap_distance: default_snap_distance(),
            trail_threshold: default_trail_threshold(),
        }
    }
}

impl PathConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), PathConfigError> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(PathConfigError::InvalidSpeed(self.speed));
        }
        if !self.smoothing_rate.is_finite() || self.smoothing_rate <= 0.0 {
            return Err(PathConfigError::InvalidSmoothingRate(self.smoothing_rate));
        }
        if !self.snap_distance.is_finite() || self.snap_distance < 0.0 {
            return Err(PathConfigError::InvalidSnapDistance(self.snap_distance));
        }
        if !self.trail_threshold.is_finite() || self.trail_threshold <= 0.0 {
            return Err(PathConfigError::InvalidTrailThreshold(self.trail_threshold));
        }
        Ok(())
    }
}
