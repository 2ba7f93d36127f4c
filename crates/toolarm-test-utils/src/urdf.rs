//! URDF and limit document strings.

/// Six-axis arm with a fixed tool flange, visuals and a transmission block.
///
/// At rest the arm points straight up and `tool_joint` sits at z = 1.706.
pub const SIX_AXIS_URDF: &str = r#"<?xml version="1.0"?>
<robot name="six_axis">
  <link name="base_link">
    <visual>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <geometry><mesh filename="package://six_axis/meshes/base.stl" scale="0.001 0.001 0.001"/></geometry>
    </visual>
    <inertial>
      <origin xyz="0 0 0.05"/>
      <mass value="4.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
  </link>
  <link name="link_1"/>
  <link name="link_2"/>
  <link name="link_3"/>
  <link name="link_4"/>
  <link name="link_5"/>
  <link name="link_6"/>
  <link name="tool0"/>

  <joint name="a1" type="revolute">
    <parent link="base_link"/>
    <child link="link_1"/>
    <origin xyz="0 0 0.34" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-2.967" upper="2.967" effort="320" velocity="1.71"/>
  </joint>
  <joint name="a2" type="revolute">
    <parent link="link_1"/>
    <child link="link_2"/>
    <origin xyz="0 0 0.26" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2.094" upper="2.094" effort="320" velocity="1.71"/>
  </joint>
  <joint name="a3" type="revolute">
    <parent link="link_2"/>
    <child link="link_3"/>
    <origin xyz="0 0 0.48" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2.094" upper="2.094" effort="176" velocity="1.75"/>
  </joint>
  <joint name="a4" type="revolute">
    <parent link="link_3"/>
    <child link="link_4"/>
    <origin xyz="0 0 0.2" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-2.967" upper="2.967" effort="176" velocity="2.27"/>
  </joint>
  <joint name="a5" type="revolute">
    <parent link="link_4"/>
    <child link="link_5"/>
    <origin xyz="0 0 0.2" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-2.094" upper="2.094" effort="110" velocity="2.44"/>
  </joint>
  <joint name="a6" type="revolute">
    <parent link="link_5"/>
    <child link="link_6"/>
    <origin xyz="0 0 0.126" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-3.054" upper="3.054" effort="40" velocity="3.14"/>
  </joint>
  <joint name="tool_joint" type="fixed">
    <parent link="link_6"/>
    <child link="tool0"/>
    <origin xyz="0 0 0.1" rpy="0 0 0"/>
  </joint>

  <transmission name="a1_trans">
    <type>transmission_interface/SimpleTransmission</type>
    <joint name="a1"><hardwareInterface>PositionJointInterface</hardwareInterface></joint>
    <actuator name="a1_motor"><mechanicalReduction>1</mechanicalReduction></actuator>
  </transmission>
</robot>
"#;

/// Stricter limits for [`SIX_AXIS_URDF`]; `a6` is locked at 0.
pub const SIX_AXIS_LIMITS_JSON: &str = r#"{
  "limits": {
    "names": ["a1", "a2", "a3", "a6"],
    "elements": [
      { "min": { "position": -2.5 }, "max": { "position": 2.5, "velocity": 1.5 } },
      { "min": { "position": -1.8 }, "max": { "position": 1.8 } },
      { "min": { "position": -1.8 }, "max": { "position": 1.8 } },
      { "min": { "position": 0.0 }, "max": { "position": 0.0 } }
    ]
  }
}"#;

/// Straight-line waypoint list as JSON, reachable by the six-axis arm.
pub const WAYPOINTS_JSON: &str = "[[0.6, 0.0, 0.9], [0.6, 0.3, 0.9], [0.4, 0.3, 1.1]]";
