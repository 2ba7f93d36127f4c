//! Playback session for toolarm.
//!
//! [`ArmSession`] ties a [`Chain`](toolarm_ik::Chain), the CCD solver and a
//! [`PathState`](toolarm_path::PathState) together and advances them one
//! frame at a time. [`ToolarmPlaybackPlugin`] runs a session inside a Bevy
//! app.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use toolarm_sim::{ArmSession, PlaybackSession, SessionConfig, ToolarmPlaybackPlugin};
//!
//! # fn run(chain: toolarm_ik::Chain, config: SessionConfig) -> Result<(), toolarm_sim::ConfigError> {
//! let session = ArmSession::from_config(chain, &config)?;
//! App::new()
//!     .add_plugins(ToolarmPlaybackPlugin)
//!     .insert_resource(PlaybackSession(session))
//!     .run();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod plugin;
pub mod session;
pub mod stats;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::SessionConfig;
pub use error::ConfigError;
pub use plugin::{
    LatestFrame, PlaybackClock, PlaybackSession, ToolarmPlaybackPlugin, playback_step_system,
};
pub use session::{ArmSession, FrameReport, JointPose};
pub use stats::PlaybackStats;
