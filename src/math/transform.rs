use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Translation, rotation and scale of a bind pose or rig placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}

/// Origin of the frame described by `m`.
#[inline]
pub fn translation(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Wraps an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Rotation angle of a unit quaternion, in `[0, PI]`.
pub fn rotation_angle(q: Quat) -> f32 {
    2.0 * q.w.abs().min(1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn wrap_angle_keeps_half_open_range() {
        assert!((wrap_angle(PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(-PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(0.5) - 0.5).abs() < EPSILON);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < EPSILON);
        assert!((wrap_angle(-TAU - 0.25) + 0.25).abs() < EPSILON);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn to_matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_z(PI / 2.0),
            Vec3::splat(2.0),
        );
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 4.0, 3.0), EPSILON));
        assert!(translation(&t.to_matrix()).abs_diff_eq(t.translation, EPSILON));
    }

    #[test]
    fn rotation_angle_ignores_quaternion_sign() {
        let q = Quat::from_rotation_y(0.75);
        assert!((rotation_angle(q) - 0.75).abs() < EPSILON);
        assert!((rotation_angle(-q) - 0.75).abs() < EPSILON);
    }
}
