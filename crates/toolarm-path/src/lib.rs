//! Waypoint playback for toolarm.
//!
//! [`PathState`] advances along an ordered list of 3-D waypoints and yields
//! the point the IK solver should aim for each frame.

pub mod config;
pub mod error;
pub mod path;

pub use config::PathConfig;
pub use error::{PathConfigError, PathError};
pub use path::{PathState, PlaybackState};
