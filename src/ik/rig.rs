use super::bone::Bone;
use super::chain::IkChain;
use super::constraint::Constraint;
use super::solver::CcdSolver;
use crate::error::{check_index, IkError, Result};
use crate::math::translation;
use glam::{Mat4, Quat, Vec3};
use std::collections::HashSet;

/// A bone hierarchy laid out as parallel arrays, parents before children.
///
/// Bind poses and parent links are fixed at construction. Animation offsets
/// are the rotations accumulated by IK; local and world transforms are a cache
/// rebuilt by [`Rig::propagate`] after every offset change.
#[derive(Debug, Clone)]
pub struct Rig {
    pub(crate) names: Vec<Option<String>>,
    pub(crate) parents: Vec<Option<usize>>,
    pub(crate) bind_poses: Vec<Mat4>,
    pub(crate) offsets: Vec<Quat>,
    pub(crate) constraints: Vec<Option<Box<dyn Constraint>>>,
    pub(crate) local: Vec<Mat4>,
    pub(crate) world: Vec<Mat4>,
    pub(crate) inverse_bind_world: Vec<Mat4>,
    pub(crate) root_world: Mat4,
}

impl Rig {
    pub fn builder() -> RigBuilder {
        RigBuilder::new()
    }

    /// Straight chain of `count` bones along +Y, each `spacing` above its
    /// parent; bone 0 sits `spacing` above the rig origin.
    pub fn cylinder_chain(count: usize, spacing: f32) -> Result<Self> {
        (0..count)
            .fold(Self::builder(), |builder, i| {
                let bone = Bone::from_translation(Vec3::new(0.0, spacing, 0.0));
                let bone = if i == 0 { bone } else { bone.with_parent(i - 1) };
                builder.add_bone(bone.with_name(format!("segment{i}")))
            })
            .build()
    }

    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    pub fn parent(&self, bone: usize) -> Result<Option<usize>> {
        check_index("bone", bone, self.bone_count())?;
        Ok(self.parents[bone])
    }

    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    pub fn name(&self, bone: usize) -> Option<&str> {
        self.names.get(bone).and_then(|n| n.as_deref())
    }

    pub fn find_bone(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .ok_or_else(|| IkError::UnknownBone(name.to_string()))
    }

    pub fn bind_poses(&self) -> &[Mat4] {
        &self.bind_poses
    }

    pub fn animation_offsets(&self) -> &[Quat] {
        &self.offsets
    }

    pub fn animation_offset(&self, bone: usize) -> Result<Quat> {
        check_index("bone", bone, self.bone_count())?;
        Ok(self.offsets[bone])
    }

    /// Animation offset of `bone` as the matrix composed into its local transform.
    pub fn animation_offset_matrix(&self, bone: usize) -> Result<Mat4> {
        self.animation_offset(bone).map(Mat4::from_quat)
    }

    /// Overrides the offset of one bone and re-propagates the rig.
    pub fn set_animation_offset(&mut self, bone: usize, offset: Quat) -> Result<()> {
        check_index("bone", bone, self.bone_count())?;
        self.offsets[bone] = offset.normalize();
        self.propagate();
        Ok(())
    }

    pub fn constraint(&self, bone: usize) -> Option<&dyn Constraint> {
        self.constraints.get(bone).and_then(|c| c.as_deref())
    }

    pub fn local_transforms(&self) -> &[Mat4] {
        &self.local
    }

    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world
    }

    pub fn world_transform(&self, bone: usize) -> Result<Mat4> {
        check_index("bone", bone, self.bone_count())?;
        Ok(self.world[bone])
    }

    /// World-space origin of `bone`.
    pub fn bone_position(&self, bone: usize) -> Result<Vec3> {
        self.world_transform(bone).map(|m| translation(&m))
    }

    pub fn bone_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.world.iter().map(translation)
    }

    pub fn root_world(&self) -> Mat4 {
        self.root_world
    }

    /// Places the rig in the world and re-propagates.
    pub fn set_root_world(&mut self, root_world: Mat4) {
        self.root_world = root_world;
        self.propagate();
    }

    pub fn end_effector_position(&self, chain: &IkChain) -> Result<Vec3> {
        self.bone_position(chain.end_effector())
    }

    pub fn distance_to_goal(&self, chain: &IkChain, goal: Vec3) -> Result<f32> {
        self.end_effector_position(chain).map(|p| p.distance(goal))
    }

    /// Sets every animation offset back to identity.
    pub fn reset_pose(&mut self) {
        self.offsets.fill(Quat::IDENTITY);
        self.propagate();
        log::debug!("rig pose reset ({} bones)", self.bone_count());
    }

    /// Recomputes local and world transforms of every bone, parents first.
    pub fn propagate(&mut self) {
        CcdSolver::propagate_unchecked(
            &mut self.world,
            &mut self.local,
            self.root_world,
            &self.bind_poses,
            &self.offsets,
            &self.parents,
        );
    }

    /// Skinning palette: current world transform times inverse bind world.
    pub fn skinning_matrices(&self) -> Vec<Mat4> {
        self.world
            .iter()
            .zip(&self.inverse_bind_world)
            .map(|(world, inverse_bind)| *world * *inverse_bind)
            .collect()
    }
}

pub struct RigBuilder {
    bones: Vec<Bone>,
    root_world: Mat4,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            root_world: Mat4::IDENTITY,
        }
    }

    pub fn add_bone(mut self, bone: Bone) -> Self {
        self.bones.push(bone);
        self
    }

    pub fn root_world(mut self, root_world: Mat4) -> Self {
        self.root_world = root_world;
        self
    }

    pub fn build(self) -> Result<Rig> {
        if self.bones.is_empty() {
            return Err(IkError::EmptyRig);
        }

        let mut seen = HashSet::new();
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= i {
                    return Err(IkError::ParentOrder { bone: i, parent });
                }
            }
            if let Some(name) = bone.name.as_deref() {
                if !seen.insert(name) {
                    return Err(IkError::DuplicateBone(name.to_string()));
                }
            }
        }

        let count = self.bones.len();
        let mut names = Vec::with_capacity(count);
        let mut parents = Vec::with_capacity(count);
        let mut bind_poses = Vec::with_capacity(count);
        let mut constraints = Vec::with_capacity(count);
        for bone in self.bones {
            names.push(bone.name);
            parents.push(bone.parent);
            bind_poses.push(bone.bind_pose.to_matrix());
            constraints.push(bone.constraint);
        }

        let mut rig = Rig {
            names,
            parents,
            bind_poses,
            offsets: vec![Quat::IDENTITY; count],
            constraints,
            local: vec![Mat4::IDENTITY; count],
            world: vec![Mat4::IDENTITY; count],
            inverse_bind_world: Vec::new(),
            root_world: self.root_world,
        };
        rig.propagate();
        rig.inverse_bind_world = rig.world.iter().map(Mat4::inverse).collect();

        log::debug!("built rig with {count} bones");
        Ok(rig)
    }
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
