//! Bevy ECS integration for arm playback.
//!
//! Provides [`ToolarmPlaybackPlugin`], which steps a [`PlaybackSession`]
//! once per `App::update` and publishes the outcome as resources.
//!
//! # Usage
//!
//! 1. Add [`ToolarmPlaybackPlugin`] to your app.
//! 2. Insert a [`PlaybackSession`] wrapping an [`ArmSession`].
//! 3. Read [`LatestFrame`] and [`PlaybackStats`] after each update.

use bevy::prelude::*;

use crate::session::{ArmSession, FrameReport, JointPose};
use crate::stats::PlaybackStats;

/// Bevy plugin that advances arm playback each frame.
pub struct ToolarmPlaybackPlugin;

impl Plugin for ToolarmPlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlaybackClock>()
            .init_resource::<LatestFrame>()
            .init_resource::<PlaybackStats>()
            .add_systems(Update, playback_step_system);
    }
}

/// The session being played back.
#[derive(Resource, Debug)]
pub struct PlaybackSession(pub ArmSession);

/// Fixed playback step, in seconds.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    pub dt: f32,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self { dt: 1.0 / 60.0 }
    }
}

/// Outcome of the most recent step.
#[derive(Resource, Debug, Clone, Default)]
pub struct LatestFrame {
    pub report: Option<FrameReport>,
    pub poses: Vec<JointPose>,
}

/// System that steps the [`PlaybackSession`], if one is present.
#[allow(clippy::needless_pass_by_value)]
pub fn playback_step_system(
    clock: Res<PlaybackClock>,
    session: Option<ResMut<PlaybackSession>>,
    mut latest: ResMut<LatestFrame>,
    mut stats: ResMut<PlaybackStats>,
) {
    let Some(mut session) = session else {
        return;
    };

    let report = session.0.step(clock.dt);
    latest.report = Some(report);
    latest.poses = session.0.joint_poses();
    *stats = *session.0.stats();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
