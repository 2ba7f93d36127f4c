//! Merging description limits with external overrides.

use toolarm_urdf::{ExternalLimit, JointLimits};

use crate::error::BuildError;

/// Limits the solver actually enforces for one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveLimits {
    pub lower: f32,
    pub upper: f32,
    pub effort: Option<f32>,
    pub velocity: Option<f32>,
}

impl EffectiveLimits {
    /// A collapsed range pins the joint to a single value.
    pub fn is_locked(&self) -> bool {
        self.lower >= self.upper
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.lower, self.upper)
    }
}

/// Intersect the description limits of `joint` with an optional override.
///
/// The stricter bound wins on each side. Without an override the description
/// limits pass through unchanged; without description limits the override
/// range is taken as is.
pub fn merge_limits(
    joint: &str,
    spec: Option<&JointLimits>,
    external: Option<&ExternalLimit>,
) -> Result<Option<EffectiveLimits>, BuildError> {
    let merged = match (spec, external) {
        (None, None) => return Ok(None),
        (Some(spec), None) => EffectiveLimits {
            lower: spec.lower,
            upper: spec.upper,
            effort: Some(spec.effort),
            velocity: Some(spec.velocity),
        },
        (None, Some(ext)) => EffectiveLimits {
            lower: ext.min.position,
            upper: ext.max.position,
            effort: ext.max.effort,
            velocity: ext.max.velocity,
        },
        (Some(spec), Some(ext)) => EffectiveLimits {
            lower: spec.lower.max(ext.min.position),
            upper: spec.upper.min(ext.max.position),
            effort: ext.max.effort.or(Some(spec.effort)),
            velocity: ext.max.velocity.or(Some(spec.velocity)),
        },
    };

    if merged.lower > merged.upper || merged.lower.is_nan() || merged.upper.is_nan() {
        return Err(BuildError::DisjointLimits {
            joint: joint.to_owned(),
            lower: merged.lower,
            upper: merged.upper,
        });
    }

    if let (Some(spec), Some(_)) = (spec, external) {
        tracing::debug!(
            joint,
            urdf_lower = spec.lower,
            urdf_upper = spec.upper,
            lower = merged.lower,
            upper = merged.upper,
            "merged external joint limits"
        );
    }
    Ok(Some(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use toolarm_urdf::LimitBound;

    const SPEC: JointLimits = JointLimits {
        lower: -2.0,
        upper: 2.0,
        effort: 100.0,
        velocity: 3.0,
    };

    #[test]
    fn no_override_passes_through() {
        let merged = merge_limits("j", Some(&SPEC), None).unwrap().unwrap();
        assert!((merged.lower + 2.0).abs() < f32::EPSILON);
        assert!((merged.upper - 2.0).abs() < f32::EPSILON);
        assert_eq!(merged.effort, Some(100.0));
        assert!(!merged.is_locked());
    }

    #[test]
    fn stricter_side_wins() {
        let ext = ExternalLimit::position(-1.0, 3.0);
        let merged = merge_limits("j", Some(&SPEC), Some(&ext)).unwrap().unwrap();
        assert!((merged.lower + 1.0).abs() < f32::EPSILON);
        assert!((merged.upper - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn override_effort_and_velocity_take_precedence() {
        let ext = ExternalLimit {
            min: LimitBound::position(-1.0),
            max: LimitBound {
                position: 1.0,
                effort: Some(20.0),
                velocity: None,
            },
        };
        let merged = merge_limits("j", Some(&SPEC), Some(&ext)).unwrap().unwrap();
        assert_eq!(merged.effort, Some(20.0));
        assert_eq!(merged.velocity, Some(3.0));
    }

    #[test]
    fn zero_width_override_locks() {
        let ext = ExternalLimit::position(0.0, 0.0);
        let merged = merge_limits("j", Some(&SPEC), Some(&ext)).unwrap().unwrap();
        assert!(merged.is_locked());
        assert!((merged.clamp(1.3)).abs() < f32::EPSILON);
    }

    #[test]
    fn disjoint_ranges_fail() {
        let ext = ExternalLimit::position(2.5, 3.0);
        let err = merge_limits("a3", Some(&SPEC), Some(&ext)).unwrap_err();
        assert!(matches!(err, BuildError::DisjointLimits { ref joint, .. } if joint == "a3"));
    }

    #[test]
    fn unlimited_joint_takes_override() {
        assert!(merge_limits("j", None, None).unwrap().is_none());
        let ext = ExternalLimit::position(-0.5, 0.5);
        let merged = merge_limits("j", None, Some(&ext)).unwrap().unwrap();
        assert!((merged.upper - 0.5).abs() < f32::EPSILON);
        assert_eq!(merged.effort, None);
    }

    proptest! {
        #[test]
        fn merged_range_is_ordered_or_rejected(
            a in -4.0f32..4.0, b in -4.0f32..4.0,
            c in -4.0f32..4.0, d in -4.0f32..4.0,
        ) {
            let spec = JointLimits::position(a.min(b), a.max(b));
            let ext = ExternalLimit::position(c.min(d), c.max(d));
            let overlap = spec.lower.max(ext.min.position) <= spec.upper.min(ext.max.position);
            match merge_limits("j", Some(&spec), Some(&ext)) {
                Ok(Some(merged)) => {
                    prop_assert!(overlap);
                    prop_assert!(merged.lower <= merged.upper);
                    prop_assert!(merged.lower >= spec.lower && merged.lower >= ext.min.position);
                    prop_assert!(merged.upper <= spec.upper && merged.upper <= ext.max.position);
                }
                Ok(None) => prop_assert!(false, "limits were dropped"),
                Err(_) => prop_assert!(!overlap),
            }
        }
    }
}
