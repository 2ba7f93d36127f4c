//! URDF XML reading using `roxmltree`.
//!
//! Only the kinematic content is read: links (with visual origin, mesh
//! reference and inertial data) and the direct `<joint>` children of
//! `<robot>`. Joints nested in other wrappers such as `<transmission>` are
//! not kinematic and are never visited.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::ParseError;
use crate::types::{
    Inertial, JointKind, JointLimits, JointSpec, Link, MeshRef, Origin, RobotDescription, Visual,
};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a URDF file from disk into a [`RobotDescription`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<RobotDescription, ParseError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_string(&content)
}

/// Parse a URDF XML string into a [`RobotDescription`].
pub fn parse_string(xml: &str) -> Result<RobotDescription, ParseError> {
    let doc = Document::parse(xml).map_err(|e| ParseError::Xml(e.to_string()))?;
    let robot = doc.root_element();
    if !robot.has_tag_name("robot") {
        return Err(ParseError::MissingRootElement);
    }

    let name = robot.attribute("name").unwrap_or("unknown");

    let links = elements(robot, "link")
        .map(parse_link)
        .collect::<Result<Vec<_>, _>>()?;
    let joints = elements(robot, "joint")
        .map(parse_joint)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        robot = name,
        links = links.len(),
        joints = joints.len(),
        "parsed robot description"
    );
    RobotDescription::from_parts(name, links, joints)
}

// ---------------------------------------------------------------------------
// Element helpers
// ---------------------------------------------------------------------------

/// Direct element children of `node` with the given tag.
fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.is_element() && n.has_tag_name(tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    elements(node, tag).next()
}

fn required_attr<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ParseError> {
    node.attribute(attribute)
        .ok_or(ParseError::MissingAttribute { element, attribute })
}

fn parse_f32(raw: &str, attribute: &'static str) -> Result<f32, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
        attribute,
        value: raw.to_owned(),
    })
}

fn parse_vec3(raw: &str, attribute: &'static str) -> Result<[f32; 3], ParseError> {
    let mut out = [0.0; 3];
    let mut parts = raw.split_whitespace();
    for slot in &mut out {
        let part = parts.next().ok_or_else(|| ParseError::InvalidNumber {
            attribute,
            value: raw.to_owned(),
        })?;
        *slot = parse_f32(part, attribute)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::InvalidNumber {
            attribute,
            value: raw.to_owned(),
        });
    }
    Ok(out)
}

fn optional_f32(node: Node, attribute: &'static str) -> Result<f32, ParseError> {
    node.attribute(attribute)
        .map_or(Ok(0.0), |raw| parse_f32(raw, attribute))
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn parse_origin(node: Option<Node>) -> Result<Origin, ParseError> {
    let Some(node) = node else {
        return Ok(Origin::default());
    };
    Ok(Origin {
        xyz: node
            .attribute("xyz")
            .map_or(Ok([0.0; 3]), |raw| parse_vec3(raw, "xyz"))?,
        rpy: node
            .attribute("rpy")
            .map_or(Ok([0.0; 3]), |raw| parse_vec3(raw, "rpy"))?,
    })
}

fn parse_link(node: Node) -> Result<Link, ParseError> {
    let name = required_attr(node, "link", "name")?;

    let visual = child(node, "visual")
        .map(|visual| -> Result<Visual, ParseError> {
            let mesh = child(visual, "geometry")
                .and_then(|g| child(g, "mesh"))
                .map(|mesh| -> Result<MeshRef, ParseError> {
                    Ok(MeshRef {
                        filename: mesh.attribute("filename").unwrap_or_default().to_owned(),
                        scale: mesh
                            .attribute("scale")
                            .map_or(Ok([1.0; 3]), |raw| parse_vec3(raw, "scale"))?,
                    })
                })
                .transpose()?;
            Ok(Visual {
                origin: parse_origin(child(visual, "origin"))?,
                mesh,
            })
        })
        .transpose()?;

    let inertial = child(node, "inertial")
        .map(|inertial| -> Result<Inertial, ParseError> {
            let mass = child(inertial, "mass").map_or(Ok(0.0), |m| optional_f32(m, "value"))?;
            let mut tensor = [0.0; 6];
            if let Some(i) = child(inertial, "inertia") {
                for (slot, attr) in tensor
                    .iter_mut()
                    .zip(["ixx", "ixy", "ixz", "iyy", "iyz", "izz"])
                {
                    *slot = optional_f32(i, attr)?;
                }
            }
            Ok(Inertial {
                origin: parse_origin(child(inertial, "origin"))?,
                mass,
                inertia: tensor,
            })
        })
        .transpose()?;

    Ok(Link {
        name: name.to_owned(),
        visual,
        inertial,
    })
}

fn parse_kind(raw: &str) -> Result<(JointKind, bool), ParseError> {
    // The flag reports whether `<limit>` applies to this joint type.
    match raw {
        "revolute" => Ok((JointKind::Revolute, true)),
        "continuous" => Ok((JointKind::Revolute, false)),
        "prismatic" => Ok((JointKind::Prismatic, true)),
        "fixed" => Ok((JointKind::Fixed, false)),
        other => Err(ParseError::UnsupportedJointType(other.to_owned())),
    }
}

fn parse_joint(node: Node) -> Result<JointSpec, ParseError> {
    let name = required_attr(node, "joint", "name")?;
    let (kind, takes_limits) = parse_kind(node.attribute("type").unwrap_or("revolute"))?;

    let link_of = |element: &'static str| -> Result<String, ParseError> {
        let el = child(node, element).ok_or_else(|| ParseError::MissingElement {
            joint: name.to_owned(),
            element,
        })?;
        required_attr(el, element, "link").map(str::to_owned)
    };
    let parent = link_of("parent")?;
    let child_link = link_of("child")?;

    let axis = child(node, "axis")
        .and_then(|a| a.attribute("xyz"))
        .map_or(Ok([0.0, 0.0, 1.0]), |raw| parse_vec3(raw, "axis"))?;

    let limits = match child(node, "limit") {
        Some(limit) if takes_limits => Some(JointLimits {
            lower: optional_f32(limit, "lower")?,
            upper: optional_f32(limit, "upper")?,
            effort: optional_f32(limit, "effort")?,
            velocity: optional_f32(limit, "velocity")?,
        }),
        _ => None,
    };

    Ok(JointSpec {
        name: name.to_owned(),
        kind,
        parent,
        child: child_link,
        origin: parse_origin(child(node, "origin"))?,
        axis,
        limits,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL_URDF: &str = r#"
        <robot name="test_robot">
            <link name="base_link"/>
        </robot>
    "#;

    const ARM_URDF: &str = r#"<?xml version="1.0"?>
        <robot name="arm">
            <link name="base">
                <inertial>
                    <origin xyz="0 0 0.1"/>
                    <mass value="4.0"/>
                    <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.02" iyz="0" izz="0.03"/>
                </inertial>
                <visual>
                    <origin xyz="0 0 0.05" rpy="0 0 1.57"/>
                    <geometry><mesh filename="../meshes/stl/base.stl"/></geometry>
                </visual>
            </link>
            <link name="upper"/>
            <link name="fore"/>
            <link name="tool"/>
            <joint name="shoulder" type="revolute">
                <parent link="base"/>
                <child link="upper"/>
                <origin xyz="0 0 0.3" rpy="0 0 0"/>
                <axis xyz="0 1 0"/>
                <limit lower="-1.5" upper="1.5" effort="100" velocity="2"/>
            </joint>
            <joint name="wrist" type="continuous">
                <parent link="upper"/>
                <child link="fore"/>
                <limit lower="-3" upper="3" effort="10" velocity="1"/>
            </joint>
            <joint name="tool_mount" type="fixed">
                <parent link="fore"/>
                <child link="tool"/>
                <origin xyz="0 0 0.1"/>
                <limit lower="-1" upper="1"/>
            </joint>
            <transmission name="shoulder_trans">
                <type>transmission_interface/SimpleTransmission</type>
                <joint name="shoulder"><hardwareInterface>EffortJointInterface</hardwareInterface></joint>
                <actuator name="shoulder_motor"/>
            </transmission>
        </robot>
    "#;

    #[test]
    fn parse_minimal() {
        let desc = parse_string(MINIMAL_URDF).unwrap();
        assert_eq!(desc.name(), "test_robot");
        assert_eq!(desc.link_count(), 1);
        assert_eq!(desc.joint_count(), 0);
        assert_eq!(desc.root_link(), "base_link");
    }

    #[test]
    fn parse_arm_structure() {
        let desc = parse_string(ARM_URDF).unwrap();
        assert_eq!(desc.name(), "arm");
        assert_eq!(desc.link_count(), 4);
        assert_eq!(desc.joint_count(), 3);
        assert_eq!(desc.root_link(), "base");
        let order: Vec<&str> = desc.joints_in_order().map(|j| j.name.as_str()).collect();
        assert_eq!(order, vec!["shoulder", "wrist", "tool_mount"]);
    }

    #[test]
    fn transmission_joints_are_ignored() {
        // A second "shoulder" inside <transmission> would otherwise be a duplicate.
        let desc = parse_string(ARM_URDF).unwrap();
        let shoulder = desc.joint("shoulder").unwrap();
        assert_eq!(shoulder.parent, "base");
    }

    #[test]
    fn revolute_joint_fields() {
        let desc = parse_string(ARM_URDF).unwrap();
        let j = desc.joint("shoulder").unwrap();
        assert_eq!(j.kind, JointKind::Revolute);
        assert_eq!(j.child, "upper");
        assert!((j.origin.xyz[2] - 0.3).abs() < f32::EPSILON);
        assert_eq!(j.axis, [0.0, 1.0, 0.0]);
        let lim = j.limits.unwrap();
        assert!((lim.lower + 1.5).abs() < f32::EPSILON);
        assert!((lim.upper - 1.5).abs() < f32::EPSILON);
        assert!((lim.effort - 100.0).abs() < f32::EPSILON);
        assert!((lim.velocity - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn continuous_is_unlimited_revolute() {
        let desc = parse_string(ARM_URDF).unwrap();
        let j = desc.joint("wrist").unwrap();
        assert_eq!(j.kind, JointKind::Revolute);
        assert!(j.limits.is_none());
        assert_eq!(j.axis, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn fixed_joint_has_no_limits() {
        let desc = parse_string(ARM_URDF).unwrap();
        let j = desc.joint("tool_mount").unwrap();
        assert_eq!(j.kind, JointKind::Fixed);
        assert!(j.limits.is_none());
    }

    #[test]
    fn link_visual_and_inertial() {
        let desc = parse_string(ARM_URDF).unwrap();
        let base = desc.link("base").unwrap();
        let visual = base.visual.as_ref().unwrap();
        assert!((visual.origin.rpy[2] - 1.57).abs() < f32::EPSILON);
        let mesh = visual.mesh.as_ref().unwrap();
        assert_eq!(mesh.filename, "../meshes/stl/base.stl");
        assert_eq!(mesh.scale, [1.0; 3]);

        let inertial = base.inertial.as_ref().unwrap();
        assert!((inertial.mass - 4.0).abs() < f32::EPSILON);
        assert!((inertial.inertia[5] - 0.03).abs() < f32::EPSILON);
        assert!((inertial.origin.xyz[2] - 0.1).abs() < f32::EPSILON);

        assert!(desc.link("upper").unwrap().visual.is_none());
    }

    #[test]
    fn missing_robot_element() {
        let err = parse_string("<model><link name=\"a\"/></model>").unwrap_err();
        assert!(matches!(err, ParseError::MissingRootElement));
    }

    #[test]
    fn nested_robot_element_is_rejected() {
        let xml = r#"<foo><bar><robot name="x"><link name="a"/></robot></bar></foo>"#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingRootElement));
    }

    #[test]
    fn malformed_xml() {
        let err = parse_string("<robot name=\"x\"><link></robot>").unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn dangling_child_link() {
        let xml = r#"
            <robot name="r">
                <link name="base"/>
                <joint name="j" type="revolute">
                    <parent link="base"/><child link="missing"/>
                </joint>
            </robot>
        "#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::DanglingJointReference { ref link, .. } if link == "missing"));
    }

    #[test]
    fn joint_without_child_element() {
        let xml = r#"
            <robot name="r">
                <link name="base"/>
                <joint name="j" type="revolute"><parent link="base"/></joint>
            </robot>
        "#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { element: "child", .. }));
    }

    #[test]
    fn unsupported_joint_type() {
        let xml = r#"
            <robot name="r">
                <link name="a"/><link name="b"/>
                <joint name="j" type="planar"><parent link="a"/><child link="b"/></joint>
            </robot>
        "#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedJointType(ref t) if t == "planar"));
    }

    #[test]
    fn bad_number_is_reported() {
        let xml = r#"
            <robot name="r">
                <link name="a"/><link name="b"/>
                <joint name="j" type="revolute">
                    <parent link="a"/><child link="b"/>
                    <origin xyz="0 zero 1"/>
                </joint>
            </robot>
        "#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { attribute: "xyz", .. }));
    }

    #[test]
    fn ambiguous_root() {
        let xml = r#"<robot name="r"><link name="a"/><link name="b"/></robot>"#;
        let err = parse_string(xml).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousRoot { .. }));
    }

    #[test]
    fn parse_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARM_URDF.as_bytes()).unwrap();
        let desc = parse_file(file.path()).unwrap();
        assert_eq!(desc.dof(), 2);
    }

    #[test]
    fn parse_file_not_found() {
        let err = parse_file("/nonexistent/robot.urdf").unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
