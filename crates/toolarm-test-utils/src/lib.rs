//! Shared test fixtures for toolarm crates.
//!
//! Provides small programmatic arms for solver tests, a six-axis URDF with
//! a matching limit document, and waypoint helpers.

pub mod robots;
pub mod urdf;
pub mod waypoints;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use robots::{planar_arm_with_tool, planar_chain, six_axis_arm, slider_arm};
pub use urdf::{SIX_AXIS_LIMITS_JSON, SIX_AXIS_URDF, WAYPOINTS_JSON};
pub use waypoints::{line_waypoints, square_waypoints};
