use super::rig::Rig;
use crate::error::{check_index, IkError, Result};

/// Bones driven by IK, end effector first.
///
/// `bones[0]` is the end effector; the last entry is the bone nearest the
/// root that may still rotate. Every entry is an ancestor of the one before.
///
/// A chain remembers the parent links of the rig it was built from and may
/// only drive rigs with the same hierarchy; see [`IkChain::check_rig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IkChain {
    bones: Vec<usize>,
    parents: Vec<Option<usize>>,
}

impl IkChain {
    pub fn new(rig: &Rig, bones: Vec<usize>) -> Result<Self> {
        if bones.is_empty() {
            return Err(IkError::EmptyChain);
        }
        for &bone in &bones {
            check_index("bone", bone, rig.bone_count())?;
        }
        for pair in bones.windows(2) {
            if !is_ancestor(rig, pair[1], pair[0]) {
                return Err(IkError::BrokenChain {
                    bone: pair[0],
                    ancestor: pair[1],
                });
            }
        }
        Ok(Self {
            bones,
            parents: rig.parents.clone(),
        })
    }

    /// Walks parent links up from `end_effector`, taking at most `length`
    /// bones (the end effector included).
    pub fn from_end_effector(rig: &Rig, end_effector: usize, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(IkError::EmptyChain);
        }
        check_index("bone", end_effector, rig.bone_count())?;

        let mut bones = Vec::with_capacity(length);
        let mut current = Some(end_effector);
        while let Some(bone) = current {
            bones.push(bone);
            if bones.len() >= length {
                break;
            }
            current = rig.parents[bone];
        }
        Ok(Self {
            bones,
            parents: rig.parents.clone(),
        })
    }

    /// Fails unless `rig` has the bone count and parent links this chain was
    /// validated against.
    pub fn check_rig(&self, rig: &Rig) -> Result<()> {
        if rig.parents.as_slice() == self.parents.as_slice() {
            Ok(())
        } else {
            Err(IkError::RigMismatch {
                expected: self.parents.len(),
                found: rig.bone_count(),
            })
        }
    }

    pub fn bones(&self) -> &[usize] {
        &self.bones
    }

    /// Bone at `position` in the chain.
    pub fn bone(&self, position: usize) -> Result<usize> {
        self.bones
            .get(position)
            .copied()
            .ok_or(IkError::IndexOutOfRange {
                what: "chain position",
                index: position,
                len: self.bones.len(),
            })
    }

    pub fn end_effector(&self) -> usize {
        self.bones[0]
    }

    /// Bone nearest the root that IK may rotate.
    pub fn base(&self) -> usize {
        self.bones[self.bones.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Number of bones a full sweep rotates.
    pub fn rotatable(&self) -> usize {
        self.bones.len() - 1
    }
}

fn is_ancestor(rig: &Rig, ancestor: usize, bone: usize) -> bool {
    let mut current = rig.parents[bone];
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = rig.parents[parent];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::Bone;
    use glam::Vec3;

    /// Spine with two arms branching from bone 1.
    fn branching_rig() -> Rig {
        Rig::builder()
            .add_bone(Bone::from_translation(Vec3::ZERO))
            .add_bone(Bone::from_translation(Vec3::Y).with_parent(0))
            .add_bone(Bone::from_translation(Vec3::X).with_parent(1))
            .add_bone(Bone::from_translation(Vec3::X).with_parent(2))
            .add_bone(Bone::from_translation(-Vec3::X).with_parent(1))
            .add_bone(Bone::from_translation(-Vec3::X).with_parent(4))
            .build()
            .unwrap()
    }

    #[test]
    fn walks_parents_from_end_effector() {
        let rig = branching_rig();
        let chain = IkChain::from_end_effector(&rig, 5, 3).unwrap();
        assert_eq!(chain.bones(), &[5, 4, 1]);
        assert_eq!(chain.end_effector(), 5);
        assert_eq!(chain.base(), 1);
        assert_eq!(chain.rotatable(), 2);
    }

    #[test]
    fn stops_at_rig_root() {
        let rig = branching_rig();
        let chain = IkChain::from_end_effector(&rig, 3, 10).unwrap();
        assert_eq!(chain.bones(), &[3, 2, 1, 0]);
    }

    #[test]
    fn accepts_skipped_ancestors() {
        let rig = branching_rig();
        assert!(IkChain::new(&rig, vec![3, 1]).is_ok());
    }

    #[test]
    fn rejects_bones_from_other_branch() {
        let rig = branching_rig();
        let err = IkChain::new(&rig, vec![3, 4]).unwrap_err();
        assert!(matches!(err, IkError::BrokenChain { bone: 3, ancestor: 4 }));
    }

    #[test]
    fn only_drives_rigs_with_the_same_hierarchy() {
        let rig = branching_rig();
        let chain = IkChain::from_end_effector(&rig, 3, 3).unwrap();
        assert!(chain.check_rig(&rig).is_ok());
        assert!(chain.check_rig(&branching_rig()).is_ok());

        // same bone count, bone 4 hangs off bone 3 instead of bone 1
        let straight = Rig::cylinder_chain(6, 1.0).unwrap();
        assert!(matches!(
            chain.check_rig(&straight),
            Err(IkError::RigMismatch { expected: 6, found: 6 })
        ));

        let shorter = Rig::cylinder_chain(4, 1.0).unwrap();
        assert!(matches!(
            chain.check_rig(&shorter),
            Err(IkError::RigMismatch { expected: 6, found: 4 })
        ));
    }

    #[test]
    fn rejects_empty_and_unknown() {
        let rig = branching_rig();
        assert!(matches!(IkChain::new(&rig, vec![]), Err(IkError::EmptyChain)));
        assert!(matches!(
            IkChain::new(&rig, vec![9]),
            Err(IkError::IndexOutOfRange { index: 9, .. })
        ));
    }
}
