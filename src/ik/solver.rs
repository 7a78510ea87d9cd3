use super::chain::IkChain;
use super::rig::Rig;
use crate::config::SolverConfig;
use crate::error::{check_index, IkError, Result};
use crate::math::{translation, wrap_angle};
use glam::{Mat4, Quat, Vec3};

/// Lengths below this are treated as zero when normalizing directions.
pub const DEFAULT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The end effector or the goal sits on the bone's origin, or the bone's
    /// world transform cannot be inverted.
    Degenerate,
    /// The bone already points the end effector at the goal.
    Aligned,
}

/// Outcome of a single [`CcdSolver::update_bone`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoneUpdate {
    Rotated { bone: usize, angle: f32 },
    Skipped { bone: usize, reason: SkipReason },
}

impl BoneUpdate {
    pub fn bone(&self) -> usize {
        match *self {
            BoneUpdate::Rotated { bone, .. } | BoneUpdate::Skipped { bone, .. } => bone,
        }
    }

    pub fn is_rotated(&self) -> bool {
        matches!(self, BoneUpdate::Rotated { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveResult {
    pub converged: bool,
    pub iterations: u32,
    pub final_distance: f32,
}

/// Cyclic Coordinate Descent over a [`Rig`].
pub struct CcdSolver;

impl CcdSolver {
    /// Rotates bone `chain[current]` so the end effector `chain[end_effector]`
    /// swings toward `goal`.
    ///
    /// Only the animation offset of the current bone changes; the caller must
    /// [`Rig::propagate`] before the next update reads world transforms.
    /// Updates that cannot pick a direction leave the offset untouched.
    pub fn update_bone(
        rig: &mut Rig,
        chain: &IkChain,
        current: usize,
        end_effector: usize,
        goal: Vec3,
        epsilon: f32,
    ) -> Result<BoneUpdate> {
        chain.check_rig(rig)?;
        let bone = chain.bone(current)?;
        let effector = chain.bone(end_effector)?;

        let skip = |reason: SkipReason| {
            log::trace!("bone {bone}: skipped ({reason:?})");
            Ok(BoneUpdate::Skipped { bone, reason })
        };

        let inverse_world = rig.world[bone].inverse();
        if !inverse_world.is_finite() || !goal.is_finite() {
            return skip(SkipReason::Degenerate);
        }

        let goal_local = inverse_world.transform_point3(goal);
        let effector_local = inverse_world.transform_point3(translation(&rig.world[effector]));

        let goal_length = goal_local.length();
        let effector_length = effector_local.length();
        if goal_length <= epsilon || effector_length <= epsilon {
            return skip(SkipReason::Degenerate);
        }
        let goal_local = goal_local / goal_length;
        let effector_local = effector_local / effector_length;

        let cosine = goal_local.dot(effector_local).clamp(-1.0, 1.0);
        let angle = wrap_angle(cosine.acos());

        let cross = effector_local.cross(goal_local);
        let axis_local = if cross.length() > epsilon {
            cross
        } else if cosine < 0.0 {
            // pointing directly away, any perpendicular axis works
            effector_local.any_orthonormal_vector()
        } else {
            return skip(SkipReason::Aligned);
        };

        let axis = rig.local[bone].transform_vector3(axis_local);
        let axis_length = axis.length();
        if axis_length <= epsilon {
            return skip(SkipReason::Degenerate);
        }
        let rotation = Quat::from_axis_angle(axis / axis_length, angle);

        let mut offset = (rotation * rig.offsets[bone]).normalize();
        if let Some(constraint) = rig.constraint(bone) {
            offset = constraint.apply(offset).normalize();
        }
        if !offset.is_finite() {
            return skip(SkipReason::Degenerate);
        }

        rig.offsets[bone] = offset;
        log::trace!("bone {bone}: rotated {angle:.5} rad");
        Ok(BoneUpdate::Rotated { bone, angle })
    }

    /// Rebuilds local and world transforms of every bone from bind poses and
    /// animation offsets.
    ///
    /// Bone `i` must have its parent at an index below `i`; bones without a
    /// parent hang off `root_world`.
    pub fn propagate_transforms(
        world: &mut [Mat4],
        local: &mut [Mat4],
        root_world: Mat4,
        bind_pose: &[Mat4],
        offsets: &[Quat],
        parents: &[Option<usize>],
    ) -> Result<()> {
        let Some(last) = parents.len().checked_sub(1) else {
            return Ok(());
        };
        check_index("world transform", last, world.len())?;
        check_index("local transform", last, local.len())?;
        check_index("bind pose", last, bind_pose.len())?;
        check_index("animation offset", last, offsets.len())?;
        for (bone, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                if parent >= bone {
                    return Err(IkError::ParentOrder { bone, parent });
                }
            }
        }

        Self::propagate_unchecked(world, local, root_world, bind_pose, offsets, parents);
        Ok(())
    }

    pub(crate) fn propagate_unchecked(
        world: &mut [Mat4],
        local: &mut [Mat4],
        root_world: Mat4,
        bind_pose: &[Mat4],
        offsets: &[Quat],
        parents: &[Option<usize>],
    ) {
        for bone in 0..parents.len() {
            Self::propagate_bone(bone, world, local, root_world, bind_pose, offsets, parents);
        }
    }

    #[inline]
    fn propagate_bone(
        bone: usize,
        world: &mut [Mat4],
        local: &mut [Mat4],
        root_world: Mat4,
        bind_pose: &[Mat4],
        offsets: &[Quat],
        parents: &[Option<usize>],
    ) {
        local[bone] = bind_pose[bone] * Mat4::from_quat(offsets[bone]);
        let parent_world = match parents[bone] {
            Some(parent) => world[parent],
            None => root_world,
        };
        world[bone] = parent_world * local[bone];
    }

    /// One CCD pass from `chain[1]` to the last chain entry, propagating after
    /// every bone. Returns how many bones actually rotated.
    pub fn sweep(rig: &mut Rig, chain: &IkChain, goal: Vec3, epsilon: f32) -> Result<usize> {
        let mut rotated = 0;
        for current in 1..chain.len() {
            if Self::update_bone(rig, chain, current, 0, goal, epsilon)?.is_rotated() {
                rotated += 1;
            }
            rig.propagate();
        }
        Ok(rotated)
    }

    /// Sweeps until the end effector is within `config.tolerance` of `goal` or
    /// `config.max_iterations` sweeps have run.
    pub fn solve(
        rig: &mut Rig,
        chain: &IkChain,
        goal: Vec3,
        config: &SolverConfig,
    ) -> Result<SolveResult> {
        let mut distance = rig.distance_to_goal(chain, goal)?;
        if distance <= config.tolerance {
            return Ok(SolveResult {
                converged: true,
                iterations: 0,
                final_distance: distance,
            });
        }

        for iteration in 0..config.max_iterations {
            let rotated = Self::sweep(rig, chain, goal, config.epsilon)?;
            distance = rig.distance_to_goal(chain, goal)?;
            log::debug!("sweep {iteration}: {rotated} bones rotated, distance {distance:.5}");

            if distance <= config.tolerance {
                return Ok(SolveResult {
                    converged: true,
                    iterations: iteration + 1,
                    final_distance: distance,
                });
            }
            if rotated == 0 {
                // nothing left to turn, further sweeps would be identical
                return Ok(SolveResult {
                    converged: false,
                    iterations: iteration + 1,
                    final_distance: distance,
                });
            }
        }

        Ok(SolveResult {
            converged: false,
            iterations: config.max_iterations,
            final_distance: distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::{BallSocketConstraint, Bone};
    use crate::math::Transform;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;

    /// Pivot at the origin with a unit-length child as end effector.
    fn single_bone() -> (Rig, IkChain) {
        let rig = Rig::builder()
            .add_bone(Bone::new(Transform::IDENTITY))
            .add_bone(Bone::from_translation(Vec3::Y).with_parent(0))
            .build()
            .unwrap();
        let chain = IkChain::new(&rig, vec![1, 0]).unwrap();
        (rig, chain)
    }

    #[test]
    fn single_update_points_effector_at_goal() {
        let (mut rig, chain) = single_bone();
        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::X, DEFAULT_EPSILON).unwrap();
        rig.propagate();

        match update {
            BoneUpdate::Rotated { bone, angle } => {
                assert_eq!(bone, 0);
                assert!((angle - FRAC_PI_2).abs() < EPSILON);
            }
            other => panic!("expected rotation, got {other:?}"),
        }
        assert!(rig.bone_position(1).unwrap().abs_diff_eq(Vec3::X, EPSILON));
    }

    #[test]
    fn opposite_goal_still_rotates() {
        let (mut rig, chain) = single_bone();
        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, -Vec3::Y, DEFAULT_EPSILON).unwrap();
        rig.propagate();

        assert!(update.is_rotated());
        assert!(rig.bone_position(1).unwrap().abs_diff_eq(-Vec3::Y, EPSILON));
    }

    #[test]
    fn aligned_bone_is_skipped() {
        let (mut rig, chain) = single_bone();
        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::new(0.0, 3.0, 0.0), DEFAULT_EPSILON).unwrap();
        assert_eq!(
            update,
            BoneUpdate::Skipped {
                bone: 0,
                reason: SkipReason::Aligned
            }
        );
        assert_eq!(rig.animation_offset(0).unwrap(), Quat::IDENTITY);
    }

    #[test]
    fn goal_on_bone_origin_is_skipped() {
        let (mut rig, chain) = single_bone();
        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::ZERO, DEFAULT_EPSILON).unwrap();
        assert_eq!(
            update,
            BoneUpdate::Skipped {
                bone: 0,
                reason: SkipReason::Degenerate
            }
        );
        assert!(rig.animation_offset(0).unwrap().is_finite());
    }

    #[test]
    fn effector_as_current_bone_is_skipped() {
        let (mut rig, chain) = single_bone();
        let update = CcdSolver::update_bone(&mut rig, &chain, 0, 0, Vec3::X, DEFAULT_EPSILON).unwrap();
        assert!(!update.is_rotated());
        assert_eq!(rig.animation_offset(1).unwrap(), Quat::IDENTITY);
    }

    #[test]
    fn chain_position_out_of_range_fails_fast() {
        let (mut rig, chain) = single_bone();
        let err = CcdSolver::update_bone(&mut rig, &chain, 2, 0, Vec3::X, DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, IkError::IndexOutOfRange { index: 2, len: 2, .. }));
    }

    #[test]
    fn parents_must_come_first() {
        let (mut rig, _) = single_bone();
        let parents = [None, Some(1)];
        let bind = rig.bind_poses().to_vec();
        let offsets = rig.animation_offsets().to_vec();
        let err = CcdSolver::propagate_transforms(
            &mut rig.world,
            &mut rig.local,
            Mat4::IDENTITY,
            &bind,
            &offsets,
            &parents,
        )
        .unwrap_err();
        assert!(matches!(err, IkError::ParentOrder { bone: 1, parent: 1 }));
    }

    #[test]
    fn descending_visit_reads_stale_parents() {
        let mut rig = Rig::cylinder_chain(3, 1.0).unwrap();
        rig.offsets[0] = Quat::from_rotation_z(FRAC_PI_2);

        let mut reversed = rig.clone();
        for bone in (0..3).rev() {
            let Rig {
                world,
                local,
                root_world,
                bind_poses,
                offsets,
                parents,
                ..
            } = &mut reversed;
            CcdSolver::propagate_bone(bone, world, local, *root_world, bind_poses, offsets, parents);
        }

        rig.propagate();
        let ascending = rig.world_transforms().to_vec();
        rig.propagate();

        assert!(!reversed.world[2].abs_diff_eq(ascending[2], EPSILON));
        for (a, b) in rig.world_transforms().iter().zip(&ascending) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn constraint_caps_accumulated_rotation() {
        let mut rig = Rig::builder()
            .add_bone(Bone::new(Transform::IDENTITY).with_constraint(BallSocketConstraint::new(30.0)))
            .add_bone(Bone::from_translation(Vec3::Y).with_parent(0))
            .build()
            .unwrap();
        let chain = IkChain::new(&rig, vec![1, 0]).unwrap();

        CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::X, DEFAULT_EPSILON).unwrap();
        let angle = crate::math::rotation_angle(rig.animation_offset(0).unwrap());
        assert!((angle - 30f32.to_radians()).abs() < EPSILON);
    }

    #[test]
    fn tiny_rig_still_rotates() {
        let (mut rig, chain) = single_bone();
        rig.set_root_world(Mat4::from_scale(Vec3::splat(0.004)));
        let goal = Vec3::new(0.004, 0.0, 0.0);

        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, goal, DEFAULT_EPSILON).unwrap();
        rig.propagate();

        assert!(update.is_rotated(), "{update:?}");
        assert!(rig.bone_position(1).unwrap().abs_diff_eq(goal, 1e-6));
    }

    #[test]
    fn singular_bone_frame_is_skipped() {
        let (mut rig, chain) = single_bone();
        rig.set_root_world(Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0)));

        let update = CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::X, DEFAULT_EPSILON).unwrap();
        assert_eq!(
            update,
            BoneUpdate::Skipped {
                bone: 0,
                reason: SkipReason::Degenerate
            }
        );
        assert_eq!(rig.animation_offset(0).unwrap(), Quat::IDENTITY);
    }

    #[test]
    fn chain_from_another_hierarchy_is_rejected() {
        let (_, chain) = single_bone();
        let mut rig = Rig::builder()
            .add_bone(Bone::new(Transform::IDENTITY))
            .add_bone(Bone::from_translation(Vec3::Y))
            .build()
            .unwrap();

        let err = CcdSolver::update_bone(&mut rig, &chain, 1, 0, Vec3::X, DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, IkError::RigMismatch { expected: 2, found: 2 }));
        assert_eq!(rig.animation_offset(0).unwrap(), Quat::IDENTITY);
    }

    #[test]
    fn solve_reports_convergence() {
        let mut rig = Rig::cylinder_chain(6, 0.5).unwrap();
        let chain = IkChain::from_end_effector(&rig, 5, 6).unwrap();
        let result = CcdSolver::solve(&mut rig, &chain, Vec3::new(1.0, 1.5, 0.5), &SolverConfig::default()).unwrap();

        assert!(result.converged, "{result:?}");
        assert!(result.final_distance <= SolverConfig::default().tolerance);
        assert!(result.iterations >= 1);
    }
}
