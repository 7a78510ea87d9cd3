use crate::ik::Rig;
use glam::Mat4;

/// Bytes per palette entry, one column-major 4x4 `f32` matrix.
pub const MATRIX_STRIDE: usize = std::mem::size_of::<Mat4>();

/// Raw bytes of a matrix slice, ready for a uniform or storage buffer.
pub fn palette_bytes(matrices: &[Mat4]) -> &[u8] {
    bytemuck::cast_slice(matrices)
}

/// Skinning matrices of a rig, refreshed by the host once per tick.
#[derive(Debug, Clone, Default)]
pub struct SkinningPalette {
    matrices: Vec<Mat4>,
}

impl SkinningPalette {
    pub fn from_rig(rig: &Rig) -> Self {
        Self {
            matrices: rig.skinning_matrices(),
        }
    }

    pub fn update(&mut self, rig: &Rig) {
        self.matrices.clear();
        self.matrices.extend(rig.skinning_matrices());
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn as_bytes(&self) -> &[u8] {
        palette_bytes(&self.matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn bytes_cover_every_matrix() {
        let rig = Rig::cylinder_chain(4, 0.5).unwrap();
        let palette = SkinningPalette::from_rig(&rig);
        assert_eq!(MATRIX_STRIDE, 64);
        assert_eq!(palette.as_bytes().len(), 4 * MATRIX_STRIDE);
    }

    #[test]
    fn update_tracks_pose() {
        let mut rig = Rig::cylinder_chain(2, 1.0).unwrap();
        let mut palette = SkinningPalette::from_rig(&rig);
        rig.set_animation_offset(0, Quat::from_rotation_z(0.5)).unwrap();
        palette.update(&rig);

        // a vertex bound at the tip follows the rotated bone
        let tip = palette.matrices()[1].transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!(tip.abs_diff_eq(rig.bone_position(1).unwrap(), 1e-5));
    }
}
