//! Playback statistics.
//!
//! [`PlaybackStats`] accumulates per-frame solver outcomes over a session:
//! frame counts, convergence, iteration totals, error extremes and joint
//! limit events.

use bevy::prelude::*;

use toolarm_ik::SolveResult;

// ---------------------------------------------------------------------------
// PlaybackStats
// ---------------------------------------------------------------------------

/// Cumulative solver statistics. Also a Bevy resource mirrored from the
/// running session.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackStats {
    /// Frames stepped.
    pub frames: u64,
    /// Frames that ran the solver.
    pub solved_frames: u64,
    /// Solved frames that converged.
    pub converged_frames: u64,
    /// Solver sweeps across all frames.
    pub total_iterations: u64,
    /// Largest final error seen (m).
    pub max_error: f32,
    /// Joint limit clamps across all frames.
    pub clamped: u64,
    /// Locked-joint holds across all frames.
    pub locked_holds: u64,
    error_sum: f64,
}

impl PlaybackStats {
    /// Create empty stats.
    pub const fn new() -> Self {
        Self {
            frames: 0,
            solved_frames: 0,
            converged_frames: 0,
            total_iterations: 0,
            max_error: 0.0,
            clamped: 0,
            locked_holds: 0,
            error_sum: 0.0,
        }
    }

    /// Count one frame, with its solve result if the solver ran.
    pub fn record(&mut self, solve: Option<&SolveResult>) {
        self.frames += 1;
        let Some(solve) = solve else {
            return;
        };
        self.solved_frames += 1;
        if solve.converged {
            self.converged_frames += 1;
        }
        self.total_iterations += u64::from(solve.iterations);
        self.max_error = self.max_error.max(solve.final_error);
        self.error_sum += f64::from(solve.final_error);
        self.clamped += u64::from(solve.stats.clamped);
        self.locked_holds += u64::from(solve.stats.locked_holds);
    }

    /// Mean final error over solved frames.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn mean_error(&self) -> Option<f32> {
        if self.solved_frames == 0 {
            return None;
        }
        Some((self.error_sum / self.solved_frames as f64) as f32)
    }

    /// Fraction of solved frames that converged.
    #[allow(clippy::cast_precision_loss)]
    pub fn convergence_rate(&self) -> Option<f32> {
        if self.solved_frames == 0 {
            return None;
        }
        Some(self.converged_frames as f32 / self.solved_frames as f32)
    }

    /// Reset all statistics.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
