//! Hand-authored rig descriptions in JSON.
//!
//! ```json
//! {
//!   "root": { "translation": [0.0, 0.0, 0.0] },
//!   "bones": [
//!     { "name": "hip" },
//!     { "name": "knee", "parent": "hip", "translation": [0.0, -0.5, 0.0] },
//!     { "name": "ankle", "parent": "knee", "translation": [0.0, -0.5, 0.0],
//!       "constraint": { "type": "hinge", "axis": [1.0, 0.0, 0.0], "min_angle": 0.0, "max_angle": 150.0 } }
//!   ],
//!   "chain": { "end_effector": "ankle", "length": 3 }
//! }
//! ```

use super::bone::Bone;
use super::chain::IkChain;
use super::constraint::ConstraintDesc;
use super::rig::Rig;
use crate::config::read_json;
use crate::error::{IkError, Result};
use crate::math::Transform;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Reference to a bone by index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoneRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent: Option<BoneRef>,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub constraint: Option<ConstraintDesc>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDesc {
    pub end_effector: BoneRef,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDesc {
    #[serde(default)]
    pub root: Transform,
    pub bones: Vec<BoneDesc>,
    #[serde(default)]
    pub chain: Option<ChainDesc>,
}

impl RigDesc {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Builds the rig and, when described, its IK chain.
    pub fn build(&self) -> Result<(Rig, Option<IkChain>)> {
        let mut names: HashMap<&str, usize> = HashMap::new();
        let mut builder = Rig::builder().root_world(self.root.to_matrix());

        for (index, desc) in self.bones.iter().enumerate() {
            let parent = match &desc.parent {
                None => None,
                Some(BoneRef::Index(parent)) => Some(*parent),
                // names only resolve to earlier bones
                Some(BoneRef::Name(name)) => Some(
                    *names
                        .get(name.as_str())
                        .ok_or_else(|| IkError::UnknownBone(name.clone()))?,
                ),
            };

            let mut bone = Bone::new(Transform::new(desc.translation, desc.rotation, desc.scale))
                .with_boxed_constraint(desc.constraint.as_ref().map(ConstraintDesc::build));
            bone.parent = parent;
            if let Some(name) = &desc.name {
                bone = bone.with_name(name.clone());
                if names.insert(name, index).is_some() {
                    return Err(IkError::DuplicateBone(name.clone()));
                }
            }
            builder = builder.add_bone(bone);
        }

        let rig = builder.build()?;
        let chain = match &self.chain {
            None => None,
            Some(chain) => {
                let end_effector = match &chain.end_effector {
                    BoneRef::Index(index) => *index,
                    BoneRef::Name(name) => rig.find_bone(name)?,
                };
                Some(IkChain::from_end_effector(&rig, end_effector, chain.length)?)
            }
        };
        Ok((rig, chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEG: &str = r#"{
        "root": { "translation": [0.0, 1.0, 0.0] },
        "bones": [
            { "name": "hip" },
            { "name": "knee", "parent": "hip", "translation": [0.0, -0.5, 0.0] },
            { "name": "ankle", "parent": 1, "translation": [0.0, -0.5, 0.0],
              "constraint": { "type": "hinge", "axis": [1.0, 0.0, 0.0], "min_angle": 0.0, "max_angle": 150.0 } }
        ],
        "chain": { "end_effector": "ankle", "length": 3 }
    }"#;

    #[test]
    fn builds_rig_and_chain() {
        let (rig, chain) = RigDesc::from_json_str(LEG).unwrap().build().unwrap();
        assert_eq!(rig.bone_count(), 3);
        assert_eq!(rig.parent(2).unwrap(), Some(1));
        assert!(rig.constraint(2).is_some());
        assert!(rig.bone_position(2).unwrap().abs_diff_eq(Vec3::ZERO, 1e-5));
        assert_eq!(chain.unwrap().bones(), &[2, 1, 0]);
    }

    #[test]
    fn forward_name_reference_is_rejected() {
        let json = r#"{ "bones": [ { "name": "a", "parent": "b" }, { "name": "b" } ] }"#;
        let err = RigDesc::from_json_str(json).unwrap().build().unwrap_err();
        assert!(matches!(err, IkError::UnknownBone(name) if name == "b"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = r#"{
            "bones": [
                { "name": "arm" },
                { "name": "arm", "parent": 0 },
                { "name": "hand", "parent": "arm" }
            ],
            "chain": { "end_effector": "hand", "length": 3 }
        }"#;
        let err = RigDesc::from_json_str(json).unwrap().build().unwrap_err();
        assert!(matches!(err, IkError::DuplicateBone(name) if name == "arm"));
    }

    #[test]
    fn forward_index_reference_is_rejected() {
        let json = r#"{ "bones": [ {}, { "parent": 1 } ] }"#;
        let err = RigDesc::from_json_str(json).unwrap().build().unwrap_err();
        assert!(matches!(err, IkError::ParentOrder { bone: 1, parent: 1 }));
    }
}
