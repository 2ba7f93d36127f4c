//! Programmatic robot descriptions.

use std::f32::consts::PI;

use toolarm_urdf::{JointKind, JointLimits, JointSpec, Link, Origin, RobotDescription};

use crate::urdf::SIX_AXIS_URDF;

/// `joints` revolute Z joints named `j0..`, one unit apart along X starting
/// at the origin, limited to [-π, π]. The last joint is the end effector,
/// so the arm reaches `joints - 1`.
///
/// # Panics
///
/// Panics if `joints == 0`.
pub fn planar_chain(joints: usize) -> RobotDescription {
    assert!(joints > 0, "planar chain needs at least one joint");
    let (links, specs) = planar_parts(joints);
    RobotDescription::from_parts("planar", links, specs).expect("valid planar chain")
}

/// [`planar_chain`] plus a fixed `tool` joint one unit past the last
/// revolute joint, so the arm reaches `joints`.
pub fn planar_arm_with_tool(joints: usize) -> RobotDescription {
    let (mut links, mut specs) = planar_parts(joints);
    let last = format!("l{joints}");
    links.push(Link::new("tool_link"));
    specs.push(
        JointSpec::new("tool", JointKind::Fixed, last, "tool_link")
            .with_origin(Origin::from_xyz(1.0, 0.0, 0.0)),
    );
    RobotDescription::from_parts("planar_tool", links, specs).expect("valid planar arm")
}

/// One prismatic Z joint (`slide`, limits [0, 0.5]) with a fixed tip one
/// unit along X.
pub fn slider_arm() -> RobotDescription {
    let links = vec![Link::new("base"), Link::new("carriage"), Link::new("tip")];
    let joints = vec![
        JointSpec::new("slide", JointKind::Prismatic, "base", "carriage")
            .with_limits(JointLimits::position(0.0, 0.5)),
        JointSpec::new("tip_joint", JointKind::Fixed, "carriage", "tip")
            .with_origin(Origin::from_xyz(1.0, 0.0, 0.0)),
    ];
    RobotDescription::from_parts("slider", links, joints).expect("valid slider arm")
}

/// [`SIX_AXIS_URDF`] parsed.
pub fn six_axis_arm() -> RobotDescription {
    toolarm_urdf::parse_string(SIX_AXIS_URDF).expect("valid six-axis URDF")
}

fn planar_parts(joints: usize) -> (Vec<Link>, Vec<JointSpec>) {
    let links = std::iter::once(Link::new("base"))
        .chain((1..=joints).map(|i| Link::new(format!("l{i}"))))
        .collect();
    let specs = (0..joints)
        .map(|i| {
            let parent = if i == 0 {
                "base".to_owned()
            } else {
                format!("l{i}")
            };
            let x = if i == 0 { 0.0 } else { 1.0 };
            JointSpec::new(format!("j{i}"), JointKind::Revolute, parent, format!("l{}", i + 1))
                .with_origin(Origin::from_xyz(x, 0.0, 0.0))
                .with_limits(JointLimits::position(-PI, PI))
        })
        .collect();
    (links, specs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
