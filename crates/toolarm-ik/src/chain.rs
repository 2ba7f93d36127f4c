//! Serial kinematic chain traced from a [`RobotDescription`].
//!
//! A [`Chain`] is an arena of [`ChainJoint`]s ordered base to tip, each
//! holding the index of its parent. Joint angles live on the chain and the
//! cached world transforms are refreshed whenever an angle changes, so the
//! chain is the only thing that mutates its joints.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3};

use toolarm_urdf::{ExternalLimits, JointKind, JointSpec, Origin, RobotDescription};

use crate::error::BuildError;
use crate::limits::{EffectiveLimits, merge_limits};

/// Axes shorter than this are treated as zero.
const AXIS_EPSILON: f32 = 1e-9;

// ---------------------------------------------------------------------------
// ChainJoint
// ---------------------------------------------------------------------------

/// One joint of a [`Chain`] with its current state.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    name: String,
    kind: JointKind,
    parent: Option<usize>,
    /// Static transform from the parent frame, taken from the description.
    origin: Isometry3<f32>,
    /// `origin` followed by the joint motion at `angle`.
    local: Isometry3<f32>,
    world: Isometry3<f32>,
    axis: UnitVector3<f32>,
    /// Rotation (rad) or displacement (m), depending on `kind`.
    angle: f32,
    /// Angle the joint returns to on [`Chain::reset`].
    rest: f32,
    limits: Option<EffectiveLimits>,
}

impl ChainJoint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> JointKind {
        self.kind
    }

    /// Index of the parent joint, `None` for the base joint.
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub const fn origin(&self) -> &Isometry3<f32> {
        &self.origin
    }

    pub const fn local_transform(&self) -> &Isometry3<f32> {
        &self.local
    }

    pub const fn world_transform(&self) -> &Isometry3<f32> {
        &self.world
    }

    /// Normalized axis in the joint frame.
    pub const fn axis(&self) -> &UnitVector3<f32> {
        &self.axis
    }

    pub const fn angle(&self) -> f32 {
        self.angle
    }

    pub const fn limits(&self) -> Option<&EffectiveLimits> {
        self.limits.as_ref()
    }

    pub const fn is_fixed(&self) -> bool {
        matches!(self.kind, JointKind::Fixed)
    }

    pub const fn is_hinge(&self) -> bool {
        matches!(self.kind, JointKind::Revolute)
    }

    pub const fn is_prismatic(&self) -> bool {
        matches!(self.kind, JointKind::Prismatic)
    }

    /// Whether merged limits pin this joint to one value.
    pub fn is_locked(&self) -> bool {
        self.limits.is_some_and(|l| l.is_locked())
    }

    /// World-space position of the joint frame.
    pub fn position(&self) -> Vector3<f32> {
        self.world.translation.vector
    }

    /// Clamp `value` into the joint limits. Fixed joints always report 0.
    pub fn clamp(&self, value: f32) -> f32 {
        if self.is_fixed() {
            return 0.0;
        }
        self.limits.map_or(value, |l| l.clamp(value))
    }

    fn set_angle_local(&mut self, value: f32) -> f32 {
        let applied = self.clamp(value);
        self.angle = applied;
        self.local = self.origin * joint_motion(self.kind, &self.axis, applied);
        applied
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Serial chain from the base joint to the end-effector joint.
#[derive(Debug, Clone)]
pub struct Chain {
    joints: Vec<ChainJoint>,
    base: Isometry3<f32>,
}

impl Chain {
    /// Trace the serial chain of `description` from its root link.
    ///
    /// Traversal stops at the first fixed joint after the base joint, or at
    /// the last joint reached. That joint is the end effector. When a link
    /// has several child joints, the first one whose child link continues
    /// the chain is followed.
    ///
    /// # Errors
    ///
    /// See [`BuildError`].
    pub fn build(
        description: &RobotDescription,
        overrides: Option<&ExternalLimits>,
    ) -> Result<Self, BuildError> {
        let path = trace_serial_path(description);
        if path.is_empty() {
            return Err(BuildError::EmptyChain {
                root: description.root_link().to_owned(),
            });
        }

        if let Some(overrides) = overrides {
            let mut unknown: Vec<&str> = overrides
                .keys()
                .filter(|name| description.joint(name).is_err())
                .map(String::as_str)
                .collect();
            unknown.sort_unstable();
            for name in unknown {
                tracing::warn!(joint = name, "ignoring limit override for unknown joint");
            }
        }

        let mut joints = Vec::with_capacity(path.len());
        for (index, spec) in path.iter().enumerate() {
            joints.push(chain_joint(spec, index, overrides)?);
        }

        let tip = joints.len() - 1;
        if !joints[..tip].iter().any(|j| !j.is_fixed()) {
            return Err(BuildError::NoActuatedJoints);
        }

        let mut chain = Self {
            joints,
            base: Isometry3::identity(),
        };
        chain.update_world_from(0);

        tracing::debug!(
            robot = description.name(),
            joints = chain.len(),
            dof = chain.dof(),
            end_effector = chain.joints[tip].name(),
            "built kinematic chain"
        );
        Ok(chain)
    }

    /// Number of joints, end effector included.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Number of movable joints.
    pub fn dof(&self) -> usize {
        self.joints.iter().filter(|j| !j.is_fixed()).count()
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&ChainJoint> {
        self.joints.get(index)
    }

    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Index of the end-effector joint (always the last one).
    pub fn end_effector(&self) -> usize {
        self.joints.len() - 1
    }

    pub fn end_effector_position(&self) -> Vector3<f32> {
        self.joints[self.end_effector()].position()
    }

    pub fn world_transform(&self, index: usize) -> Option<&Isometry3<f32>> {
        self.joints.get(index).map(|j| &j.world)
    }

    /// World position of every joint, base to tip.
    pub fn joint_positions(&self) -> Vec<Vector3<f32>> {
        self.joints.iter().map(ChainJoint::position).collect()
    }

    /// Current angle of every joint, base to tip.
    pub fn angles(&self) -> Vec<f32> {
        self.joints.iter().map(|j| j.angle).collect()
    }

    /// Set one joint angle, clamped to its limits, and refresh the world
    /// transforms downstream of it. Returns the applied value.
    pub fn set_angle(&mut self, index: usize, value: f32) -> Option<f32> {
        let applied = self.joints.get_mut(index)?.set_angle_local(value);
        self.update_world_from(index);
        Some(applied)
    }

    /// Set angles base to tip. Extra values are ignored and missing ones
    /// leave their joints untouched.
    pub fn set_angles(&mut self, values: &[f32]) {
        for (joint, &value) in self.joints.iter_mut().zip(values) {
            joint.set_angle_local(value);
        }
        self.update_world_from(0);
    }

    /// Return every joint to its rest angle.
    pub fn reset(&mut self) {
        for joint in &mut self.joints {
            let rest = joint.rest;
            joint.set_angle_local(rest);
        }
        self.update_world_from(0);
    }

    pub const fn base_transform(&self) -> &Isometry3<f32> {
        &self.base
    }

    /// Place the chain base in the world.
    pub fn set_base_transform(&mut self, base: Isometry3<f32>) {
        self.base = base;
        self.update_world_from(0);
    }

    fn update_world_from(&mut self, start: usize) {
        for index in start..self.joints.len() {
            let parent_world = match self.joints[index].parent {
                Some(parent) => self.joints[parent].world,
                None => self.base,
            };
            let joint = &mut self.joints[index];
            joint.world = parent_world * joint.local;
        }
    }
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

/// Joints from the root link to the end effector, in order.
fn trace_serial_path(description: &RobotDescription) -> Vec<&JointSpec> {
    let mut path: Vec<&JointSpec> = Vec::new();
    let mut link = description.root_link();

    loop {
        let children: Vec<&JointSpec> = description.child_joints(link).collect();
        let next = children
            .iter()
            .copied()
            .find(|j| description.child_joints(&j.child).next().is_some())
            .or_else(|| children.first().copied());
        let Some(next) = next else {
            break;
        };

        for skipped in children.iter().filter(|j| j.name != next.name) {
            tracing::debug!(
                link,
                followed = next.name.as_str(),
                skipped = skipped.name.as_str(),
                "skipping side branch"
            );
        }

        path.push(next);
        if next.kind == JointKind::Fixed && path.len() > 1 {
            break;
        }
        link = &next.child;
    }
    path
}

fn chain_joint(
    spec: &JointSpec,
    index: usize,
    overrides: Option<&ExternalLimits>,
) -> Result<ChainJoint, BuildError> {
    let movable = spec.kind.is_movable();

    let axis = if movable {
        UnitVector3::try_new(Vector3::from(spec.axis), AXIS_EPSILON).ok_or_else(|| {
            BuildError::DegenerateAxis {
                joint: spec.name.clone(),
            }
        })?
    } else {
        Vector3::z_axis()
    };

    let limits = if movable {
        let external = overrides.and_then(|o| o.get(&spec.name));
        merge_limits(&spec.name, spec.limits.as_ref(), external)?
    } else {
        None
    };

    let rest = limits.map_or(0.0, |l| l.clamp(0.0));

    let origin = origin_to_isometry(&spec.origin);
    let mut joint = ChainJoint {
        name: spec.name.clone(),
        kind: spec.kind,
        parent: index.checked_sub(1),
        origin,
        local: origin,
        world: Isometry3::identity(),
        axis,
        angle: 0.0,
        rest,
        limits,
    };
    joint.set_angle_local(rest);
    Ok(joint)
}

/// Convert an [`Origin`] (xyz + rpy) to an [`Isometry3`].
///
/// URDF rpy is extrinsic X, then Y, then Z, which is what
/// `UnitQuaternion::from_euler_angles` builds.
pub fn origin_to_isometry(origin: &Origin) -> Isometry3<f32> {
    let [x, y, z] = origin.xyz;
    let [roll, pitch, yaw] = origin.rpy;
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

/// Motion of a joint at `value` in its own frame.
fn joint_motion(kind: JointKind, axis: &UnitVector3<f32>, value: f32) -> Isometry3<f32> {
    match kind {
        JointKind::Revolute => Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, value),
        ),
        JointKind::Prismatic => Isometry3::translation(axis.x * value, axis.y * value, axis.z * value),
        JointKind::Fixed => Isometry3::identity(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;
    use toolarm_test_utils::{planar_arm_with_tool, planar_chain, six_axis_arm};
    use toolarm_urdf::{ExternalLimit, JointLimits, Link};

    use super::*;

    #[test]
    fn planar_chain_rest_pose() {
        let chain = Chain::build(&planar_chain(3), None).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.dof(), 3);
        assert_eq!(chain.end_effector(), 2);

        let positions = chain.joint_positions();
        assert_relative_eq!(positions[0], Vector3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(positions[1], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn parents_link_back_to_base() {
        let chain = Chain::build(&six_axis_arm(), None).unwrap();
        let mut index = chain.end_effector();
        let mut hops = 0;
        while let Some(parent) = chain.joint(index).unwrap().parent() {
            assert_eq!(parent + 1, index);
            index = parent;
            hops += 1;
        }
        assert_eq!(index, 0);
        assert_eq!(hops, chain.len() - 1);
    }

    #[test]
    fn six_axis_arm_stops_at_tool() {
        let chain = Chain::build(&six_axis_arm(), None).unwrap();
        assert_eq!(chain.dof(), 6);
        let tip = chain.joint(chain.end_effector()).unwrap();
        assert!(tip.is_fixed());
        assert_eq!(tip.name(), "tool_joint");
    }

    #[test]
    fn forward_kinematics_quarter_turn() {
        let mut chain = Chain::build(&planar_arm_with_tool(2), None).unwrap();
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-6
        );

        chain.set_angle(0, FRAC_PI_2).unwrap();
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(0.0, 2.0, 0.0),
            epsilon = 1e-5
        );

        chain.set_angles(&[FRAC_PI_2, -FRAC_PI_2]);
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(1.0, 1.0, 0.0),
            epsilon = 1e-5
        );

        chain.reset();
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn set_angle_clamps_and_reports() {
        let mut chain = Chain::build(&planar_chain(3), None).unwrap();
        let applied = chain.set_angle(1, 10.0).unwrap();
        assert_relative_eq!(applied, PI);
        assert_relative_eq!(chain.joint(1).unwrap().angle(), PI);
        assert!(chain.set_angle(7, 0.0).is_none());
    }

    #[test]
    fn base_transform_moves_everything() {
        let mut chain = Chain::build(&planar_chain(3), None).unwrap();
        chain.set_base_transform(Isometry3::translation(0.0, 0.0, 5.0));
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(2.0, 0.0, 5.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn prismatic_joint_translates() {
        let links = vec![Link::new("base"), Link::new("slider"), Link::new("tip")];
        let joints = vec![
            JointSpec::new("slide", JointKind::Prismatic, "base", "slider")
                .with_axis([0.0, 0.0, 2.0])
                .with_limits(JointLimits::position(0.0, 0.5)),
            JointSpec::new("tip_joint", JointKind::Fixed, "slider", "tip")
                .with_origin(Origin::from_xyz(1.0, 0.0, 0.0)),
        ];
        let desc = RobotDescription::from_parts("slider", links, joints).unwrap();
        let mut chain = Chain::build(&desc, None).unwrap();

        let applied = chain.set_angle(0, 0.8).unwrap();
        assert_relative_eq!(applied, 0.5);
        assert_relative_eq!(
            chain.end_effector_position(),
            Vector3::new(1.0, 0.0, 0.5),
            epsilon = 1e-6
        );
    }

    #[test]
    fn overrides_merge_and_lock() {
        let mut overrides = HashMap::new();
        overrides.insert("j1".to_owned(), ExternalLimit::position(0.0, 0.0));
        overrides.insert("j0".to_owned(), ExternalLimit::position(-0.5, 4.0));
        overrides.insert("nonexistent".to_owned(), ExternalLimit::position(-1.0, 1.0));

        let chain = Chain::build(&planar_chain(3), Some(&overrides)).unwrap();
        let j0 = chain.joint(0).unwrap().limits().unwrap();
        assert_relative_eq!(j0.lower, -0.5);
        assert_relative_eq!(j0.upper, PI);
        assert!(chain.joint(1).unwrap().is_locked());
        assert!(!chain.joint(2).unwrap().is_locked());
    }

    #[test]
    fn disjoint_override_fails_build() {
        let mut overrides = HashMap::new();
        overrides.insert("j2".to_owned(), ExternalLimit::position(4.0, 5.0));
        let err = Chain::build(&planar_chain(3), Some(&overrides)).unwrap_err();
        assert!(matches!(err, BuildError::DisjointLimits { ref joint, .. } if joint == "j2"));
    }

    #[test]
    fn rest_angle_is_clamped_into_limits() {
        let links = vec![Link::new("base"), Link::new("a"), Link::new("b")];
        let joints = vec![
            JointSpec::new("offset", JointKind::Revolute, "base", "a")
                .with_limits(JointLimits::position(0.5, 1.0)),
            JointSpec::new("tip", JointKind::Fixed, "a", "b")
                .with_origin(Origin::from_xyz(1.0, 0.0, 0.0)),
        ];
        let desc = RobotDescription::from_parts("offset", links, joints).unwrap();
        let chain = Chain::build(&desc, None).unwrap();
        assert_relative_eq!(chain.joint(0).unwrap().angle(), 0.5);
    }

    #[test]
    fn zero_axis_is_rejected() {
        let links = vec![Link::new("base"), Link::new("a"), Link::new("b")];
        let joints = vec![
            JointSpec::new("bad", JointKind::Revolute, "base", "a").with_axis([0.0; 3]),
            JointSpec::new("tip", JointKind::Fixed, "a", "b"),
        ];
        let desc = RobotDescription::from_parts("bad", links, joints).unwrap();
        let err = Chain::build(&desc, None).unwrap_err();
        assert_eq!(err, BuildError::DegenerateAxis { joint: "bad".into() });
    }

    #[test]
    fn lone_link_is_empty_chain() {
        let desc = RobotDescription::from_parts("lone", vec![Link::new("base")], vec![]).unwrap();
        let err = Chain::build(&desc, None).unwrap_err();
        assert_eq!(err, BuildError::EmptyChain { root: "base".into() });
    }

    #[test]
    fn all_fixed_has_no_actuated_joints() {
        let links = vec![Link::new("base"), Link::new("a"), Link::new("b")];
        let joints = vec![
            JointSpec::new("mount", JointKind::Fixed, "base", "a"),
            JointSpec::new("tool", JointKind::Fixed, "a", "b"),
        ];
        let desc = RobotDescription::from_parts("rigid", links, joints).unwrap();
        assert_eq!(
            Chain::build(&desc, None).unwrap_err(),
            BuildError::NoActuatedJoints
        );
    }

    #[test]
    fn branch_with_continuation_is_followed() {
        // base -> stub (dead end) and base -> arm -> hand
        let links = vec![
            Link::new("base"),
            Link::new("stub"),
            Link::new("arm"),
            Link::new("hand"),
        ];
        let joints = vec![
            JointSpec::new("to_stub", JointKind::Revolute, "base", "stub"),
            JointSpec::new("shoulder", JointKind::Revolute, "base", "arm"),
            JointSpec::new("wrist", JointKind::Fixed, "arm", "hand")
                .with_origin(Origin::from_xyz(1.0, 0.0, 0.0)),
        ];
        let desc = RobotDescription::from_parts("branchy", links, joints).unwrap();
        let chain = Chain::build(&desc, None).unwrap();
        let names: Vec<&str> = chain.joints().iter().map(ChainJoint::name).collect();
        assert_eq!(names, ["shoulder", "wrist"]);
    }

    #[test]
    fn origin_rpy_yaw() {
        let iso = origin_to_isometry(&Origin {
            xyz: [1.0, 2.0, 3.0],
            rpy: [0.0, 0.0, FRAC_PI_2],
        });
        let rotated = iso.rotation * Vector3::x();
        assert_relative_eq!(rotated, Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0));
    }
}
