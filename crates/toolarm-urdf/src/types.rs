//! Core data types for the in-memory robot description.
//!
//! These types are the canonical representation of an arm, independent of
//! the XML layer. [`RobotDescription::from_parts`] is the single place where
//! the structural invariants (existing links, a single root, a tree) are
//! checked, so descriptions built by hand and descriptions read from URDF go
//! through the same validation.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// JointKind
// ---------------------------------------------------------------------------

/// Kinematic joint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    /// Rotation about a single axis.
    Revolute,
    /// Translation along a single axis.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
}

impl JointKind {
    /// Whether the joint contributes a degree of freedom.
    pub const fn is_movable(self) -> bool {
        matches!(self, Self::Revolute | Self::Prismatic)
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Motion, effort and velocity limits of a revolute or prismatic joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointLimits {
    /// Lower position limit (rad or m).
    pub lower: f32,
    /// Upper position limit (rad or m).
    pub upper: f32,
    /// Maximum effort (Nm or N).
    pub effort: f32,
    /// Maximum velocity (rad/s or m/s).
    pub velocity: f32,
}

impl JointLimits {
    /// Position-only limits with zero effort and velocity.
    pub const fn position(lower: f32, upper: f32) -> Self {
        Self {
            lower,
            upper,
            effort: 0.0,
            velocity: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A pose given as translation + roll-pitch-yaw, relative to the parent link.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Origin {
    /// Translation `[x, y, z]`.
    pub xyz: [f32; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f32; 3],
}

impl Origin {
    /// Pure translation.
    pub const fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            xyz: [x, y, z],
            rpy: [0.0; 3],
        }
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Reference to an external mesh; opaque to the kinematics.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRef {
    pub filename: String,
    pub scale: [f32; 3],
}

/// Visual element of a link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visual {
    pub origin: Origin,
    pub mesh: Option<MeshRef>,
}

/// Inertial properties of a link. Carried through, unused by IK.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inertial {
    /// Origin of the inertial frame relative to the link frame.
    pub origin: Origin,
    /// Mass in kilograms.
    pub mass: f32,
    /// Inertia tensor elements `[ixx, ixy, ixz, iyy, iyz, izz]`.
    pub inertia: [f32; 6],
}

/// A rigid body of the arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    pub visual: Option<Visual>,
    pub inertial: Option<Inertial>,
}

impl Link {
    /// Create a link with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual: None,
            inertial: None,
        }
    }
}

// ---------------------------------------------------------------------------
// JointSpec
// ---------------------------------------------------------------------------

/// A joint as declared in the robot description.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    pub kind: JointKind,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint frame relative to the parent link.
    pub origin: Origin,
    /// Rotation or translation axis in the joint frame.
    pub axis: [f32; 3],
    /// Position limits. Always `None` for fixed joints.
    pub limits: Option<JointLimits>,
}

impl JointSpec {
    /// Joint at the parent origin, Z axis, no limits.
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            origin: Origin::default(),
            axis: [0.0, 0.0, 1.0],
            limits: None,
        }
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub const fn with_axis(mut self, axis: [f32; 3]) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = Some(limits);
        self
    }
}

// ---------------------------------------------------------------------------
// RobotDescription
// ---------------------------------------------------------------------------

/// Validated link/joint graph of a serial arm.
#[derive(Debug, Clone)]
pub struct RobotDescription {
    name: String,
    links: HashMap<String, Link>,
    joints: HashMap<String, JointSpec>,
    /// Joint names in order of discovery.
    joint_order: Vec<String>,
    root_link: String,
}

impl RobotDescription {
    /// Assemble and validate a description.
    ///
    /// `joints` keeps its order; that order decides which branch the chain
    /// builder follows when a link has several children.
    pub fn from_parts(
        name: impl Into<String>,
        links: Vec<Link>,
        joints: Vec<JointSpec>,
    ) -> Result<Self, ParseError> {
        let mut link_map = HashMap::with_capacity(links.len());
        for link in links {
            if link_map.contains_key(&link.name) {
                return Err(ParseError::DuplicateLink(link.name));
            }
            link_map.insert(link.name.clone(), link);
        }

        let mut joint_map = HashMap::with_capacity(joints.len());
        let mut joint_order = Vec::with_capacity(joints.len());
        let mut children: HashSet<String> = HashSet::new();
        for mut joint in joints {
            if joint_map.contains_key(&joint.name) {
                return Err(ParseError::DuplicateJoint(joint.name));
            }
            for link in [&joint.parent, &joint.child] {
                if !link_map.contains_key(link) {
                    return Err(ParseError::DanglingJointReference {
                        joint: joint.name.clone(),
                        link: link.clone(),
                    });
                }
            }
            if !children.insert(joint.child.clone()) {
                return Err(ParseError::MultipleParents { link: joint.child });
            }
            if joint.kind == JointKind::Fixed {
                joint.limits = None;
            }
            joint_order.push(joint.name.clone());
            joint_map.insert(joint.name.clone(), joint);
        }

        let mut candidates: Vec<String> = link_map
            .keys()
            .filter(|name| !children.contains(*name))
            .cloned()
            .collect();
        candidates.sort_unstable();
        if candidates.len() != 1 {
            return Err(ParseError::AmbiguousRoot { candidates });
        }
        let root_link = candidates.remove(0);

        let description = Self {
            name: name.into(),
            links: link_map,
            joints: joint_map,
            joint_order,
            root_link,
        };
        description.check_reachable()?;
        Ok(description)
    }

    /// Every link must hang off the root.
    fn check_reachable(&self) -> Result<(), ParseError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.links.len());
        let mut queue = VecDeque::from([self.root_link.as_str()]);
        while let Some(link) = queue.pop_front() {
            if !seen.insert(link) {
                continue;
            }
            queue.extend(self.child_joints(link).map(|j| j.child.as_str()));
        }

        let mut missing: Vec<&str> = self
            .links
            .keys()
            .map(String::as_str)
            .filter(|name| !seen.contains(name))
            .collect();
        missing.sort_unstable();
        match missing.first() {
            Some(name) => Err(ParseError::UnreachableLink((*name).to_owned())),
            None => Ok(()),
        }
    }

    /// Robot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the root link.
    pub fn root_link(&self) -> &str {
        &self.root_link
    }

    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&Link, ParseError> {
        self.links
            .get(name)
            .ok_or_else(|| ParseError::MissingLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&JointSpec, ParseError> {
        self.joints
            .get(name)
            .ok_or_else(|| ParseError::MissingJoint(name.into()))
    }

    /// All links, unordered.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Joints in order of discovery.
    pub fn joints_in_order(&self) -> impl Iterator<Item = &JointSpec> {
        self.joint_order.iter().filter_map(|name| self.joints.get(name))
    }

    /// Joints whose parent is `link`, in order of discovery.
    pub fn child_joints<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a JointSpec> + 'a {
        self.joints_in_order().filter(move |j| j.parent == link)
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of joints.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of movable (revolute or prismatic) joints.
    pub fn dof(&self) -> usize {
        self.joints.values().filter(|j| j.kind.is_movable()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
