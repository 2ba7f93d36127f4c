//! Waypoint playback.
//!
//! [`PathState`] turns an ordered waypoint list and a playback clock into a
//! target point for the solver. Progress runs over the whole path in [0, 1];
//! the solver target chases the interpolated path target with exponential
//! smoothing so the solver never sees a discontinuous jump.

use nalgebra::Vector3;

use crate::config::PathConfig;
use crate::error::PathError;

/// Playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Animating,
}

// ---------------------------------------------------------------------------
// PathState
// ---------------------------------------------------------------------------

/// Playback position along a waypoint list.
#[derive(Debug, Clone)]
pub struct PathState {
    waypoints: Vec<Vector3<f32>>,
    config: PathConfig,
    state: PlaybackState,
    progress: f32,
    current_index: usize,
    local_progress: f32,
    path_target: Vector3<f32>,
    solver_target: Vector3<f32>,
    trail: Vec<Vector3<f32>>,
}

impl Default for PathState {
    fn default() -> Self {
        Self::new(PathConfig::default())
    }
}

impl PathState {
    pub fn new(config: PathConfig) -> Self {
        Self {
            waypoints: Vec::new(),
            config,
            state: PlaybackState::Idle,
            progress: 0.0,
            current_index: 0,
            local_progress: 0.0,
            path_target: Vector3::zeros(),
            solver_target: Vector3::zeros(),
            trail: Vec::new(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn waypoints(&self) -> &[Vector3<f32>] {
        &self.waypoints
    }

    pub const fn config(&self) -> &PathConfig {
        &self.config
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == PlaybackState::Animating
    }

    /// Fraction of the whole path covered, in [0, 1].
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Index of the waypoint starting the current segment.
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Position within the current segment, in [0, 1).
    pub const fn local_progress(&self) -> f32 {
        self.local_progress
    }

    pub const fn speed(&self) -> f32 {
        self.config.speed
    }

    /// Interpolated point on the path at the current progress.
    pub const fn path_target(&self) -> &Vector3<f32> {
        &self.path_target
    }

    /// Smoothed point the solver should aim for.
    pub const fn solver_target(&self) -> &Vector3<f32> {
        &self.solver_target
    }

    /// Waypoints already passed, followed by the last effector position
    /// given to [`update_trail`](Self::update_trail).
    pub fn trail(&self) -> &[Vector3<f32>] {
        &self.trail
    }

    // -- control ------------------------------------------------------------

    /// Replace the waypoint list. Playback stops and rewinds, and both
    /// targets jump to the first waypoint.
    pub fn set_waypoints(&mut self, waypoints: Vec<Vector3<f32>>) {
        self.waypoints = waypoints;
        self.state = PlaybackState::Idle;
        self.progress = 0.0;
        self.trail.clear();
        self.resample();
        self.solver_target = self.path_target;
        tracing::debug!(waypoints = self.waypoints.len(), "waypoints loaded");
    }

    /// Start or resume playback. A finished path restarts from the
    /// beginning.
    pub fn play(&mut self) -> Result<(), PathError> {
        if self.waypoints.is_empty() {
            return Err(PathError::NoWaypoints);
        }
        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.resample();
        }
        self.state = PlaybackState::Animating;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Idle;
    }

    /// [`play`](Self::play) when idle, [`pause`](Self::pause) when animating.
    pub fn toggle(&mut self) -> Result<(), PathError> {
        match self.state {
            PlaybackState::Idle => self.play(),
            PlaybackState::Animating => {
                self.pause();
                Ok(())
            }
        }
    }

    /// Stop and rewind to the first waypoint. The solver target keeps its
    /// position and glides back on the next ticks.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.progress = 0.0;
        self.trail.clear();
        self.resample();
    }

    /// Set the playback speed in segments per second. Negative or
    /// non-finite values become 0.
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed >= 0.0 {
            self.config.speed = speed;
        } else {
            tracing::warn!(speed, "invalid playback speed, using 0");
            self.config.speed = 0.0;
        }
    }

    /// Jump to `progress` (clamped to [0, 1]) without changing the playback
    /// state.
    pub fn seek(&mut self, progress: f32) {
        self.progress = clamp_progress(progress);
        self.resample();
    }

    /// Jump to the start of segment `index` (clamped to the last waypoint).
    #[allow(clippy::cast_precision_loss)]
    pub fn set_current_index(&mut self, index: usize) -> Result<(), PathError> {
        let last = self
            .waypoints
            .len()
            .checked_sub(1)
            .ok_or(PathError::NoWaypoints)?;
        let index = index.min(last);
        self.progress = if last == 0 {
            0.0
        } else {
            index as f32 / last as f32
        };
        self.resample();
        Ok(())
    }

    // -- per frame ----------------------------------------------------------

    /// Advance playback by `dt` seconds and return the interpolated path
    /// target.
    ///
    /// Progress only moves while animating; the solver target is smoothed
    /// towards the path target on every call. Reaching the end of the path
    /// stops playback.
    #[allow(clippy::cast_precision_loss)]
    pub fn tick(&mut self, dt: f32) -> Vector3<f32> {
        if self.waypoints.is_empty() {
            return self.path_target;
        }
        let dt = dt.max(0.0);

        if self.is_animating() {
            let segments = self.segment_count().max(1) as f32;
            self.progress = clamp_progress(self.progress + self.config.speed * dt / segments);
            if self.progress >= 1.0 {
                self.state = PlaybackState::Idle;
                tracing::debug!("path playback finished");
            }
        }
        self.resample();

        let gap = (self.path_target - self.solver_target).norm();
        if gap < self.config.snap_distance {
            self.solver_target = self.path_target;
        } else {
            let factor = (dt * self.config.smoothing_rate).min(1.0);
            self.solver_target = self.solver_target.lerp(&self.path_target, factor);
        }
        self.path_target
    }

    /// Rebuild the trail from the actual effector position.
    ///
    /// Searches backwards from the current segment for the furthest
    /// waypoint within `trail_threshold` of `effector`. Falls back to the
    /// first waypoint.
    pub fn update_trail(&mut self, effector: &Vector3<f32>) {
        self.trail.clear();
        if self.waypoints.len() < 2 {
            return;
        }
        let start = self.current_index.min(self.waypoints.len() - 1);
        let passed = (0..=start)
            .rev()
            .find(|&i| (self.waypoints[i] - effector).norm() < self.config.trail_threshold)
            .unwrap_or(0);
        self.trail.extend_from_slice(&self.waypoints[..=passed]);
        self.trail.push(*effector);
    }

    fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn resample(&mut self) {
        let segments = self.segment_count();
        let Some(first) = self.waypoints.first() else {
            self.current_index = 0;
            self.local_progress = 0.0;
            return;
        };
        if segments == 0 {
            self.current_index = 0;
            self.local_progress = 0.0;
            self.path_target = *first;
            return;
        }

        let scaled = self.progress * segments as f32;
        let index = (scaled.floor() as usize).min(segments);
        let local = if index == segments {
            0.0
        } else {
            scaled - index as f32
        };
        let next = (index + 1).min(segments);

        self.current_index = index;
        self.local_progress = local;
        self.path_target = self.waypoints[index].lerp(&self.waypoints[next], local);
    }
}

fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
