//! Waypoint lists.

use nalgebra::Vector3;

/// `[(0,0,0), (length,0,0)]`.
pub fn line_waypoints(length: f32) -> Vec<Vector3<f32>> {
    vec![Vector3::zeros(), Vector3::new(length, 0.0, 0.0)]
}

/// Closed square of side `side` in the XY plane at height `z`, centered on
/// `(cx, cy)`. The first corner is repeated at the end.
pub fn square_waypoints(cx: f32, cy: f32, z: f32, side: f32) -> Vec<Vector3<f32>> {
    let h = side / 2.0;
    let corners = [(-h, -h), (h, -h), (h, h), (-h, h), (-h, -h)];
    corners
        .iter()
        .map(|&(dx, dy)| Vector3::new(cx + dx, cy + dy, z))
        .collect()
}
