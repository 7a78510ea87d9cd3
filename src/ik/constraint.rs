use crate::math::rotation_angle;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Limits the rotation a bone may accumulate through IK.
///
/// `apply` receives the bone's animation offset right after a CCD update and
/// returns the offset that is actually stored.
pub trait Constraint: Send + Sync + Debug {
    fn apply(&self, offset: Quat) -> Quat;
    fn clone_box(&self) -> Box<dyn Constraint>;
}

impl Clone for Box<dyn Constraint> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Caps the total offset rotation, whatever its axis.
#[derive(Debug, Clone, Copy)]
pub struct BallSocketConstraint {
    pub max_angle: f32,
}

impl BallSocketConstraint {
    pub fn new(max_angle_degrees: f32) -> Self {
        Self {
            max_angle: max_angle_degrees.to_radians(),
        }
    }

    pub fn from_radians(max_angle: f32) -> Self {
        Self { max_angle }
    }
}

impl Constraint for BallSocketConstraint {
    fn apply(&self, offset: Quat) -> Quat {
        // shortest arc representation
        let offset = if offset.w < 0.0 { -offset } else { offset };
        let angle = rotation_angle(offset);

        if angle <= self.max_angle {
            return offset;
        }

        let axis = Vec3::new(offset.x, offset.y, offset.z);
        if axis.length_squared() < 1e-12 {
            return offset;
        }
        Quat::from_axis_angle(axis.normalize(), self.max_angle)
    }

    fn clone_box(&self) -> Box<dyn Constraint> {
        Box::new(*self)
    }
}

/// Keeps only the twist of the offset about `axis` and clamps it to
/// `[min_angle, max_angle]` (radians, right handed about `axis`).
#[derive(Debug, Clone, Copy)]
pub struct HingeConstraint {
    pub axis: Vec3,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl HingeConstraint {
    pub fn new(axis: Vec3, min_angle_degrees: f32, max_angle_degrees: f32) -> Self {
        Self::from_radians(
            axis,
            min_angle_degrees.to_radians(),
            max_angle_degrees.to_radians(),
        )
    }

    pub fn from_radians(axis: Vec3, min_angle: f32, max_angle: f32) -> Self {
        Self {
            axis: axis.normalize_or(Vec3::Z),
            min_angle: min_angle.min(max_angle),
            max_angle: max_angle.max(min_angle),
        }
    }

    /// Signed twist angle of `offset` about the hinge axis.
    pub fn twist_angle(&self, offset: Quat) -> f32 {
        let projected = Vec3::new(offset.x, offset.y, offset.z).dot(self.axis);
        crate::math::wrap_angle(2.0 * projected.atan2(offset.w))
    }
}

impl Constraint for HingeConstraint {
    fn apply(&self, offset: Quat) -> Quat {
        let angle = self
            .twist_angle(offset)
            .clamp(self.min_angle, self.max_angle);
        Quat::from_axis_angle(self.axis, angle)
    }

    fn clone_box(&self) -> Box<dyn Constraint> {
        Box::new(*self)
    }
}

/// Serializable form of the built-in constraints, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintDesc {
    BallSocket {
        max_angle: f32,
    },
    Hinge {
        axis: Vec3,
        min_angle: f32,
        max_angle: f32,
    },
}

impl ConstraintDesc {
    pub fn build(&self) -> Box<dyn Constraint> {
        match *self {
            ConstraintDesc::BallSocket { max_angle } => Box::new(BallSocketConstraint::new(max_angle)),
            ConstraintDesc::Hinge {
                axis,
                min_angle,
                max_angle,
            } => Box::new(HingeConstraint::new(axis, min_angle, max_angle)),
        }
    }
}
