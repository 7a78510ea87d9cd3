use super::constraint::Constraint;
use crate::math::Transform;
use glam::Vec3;

/// Construction-time description of one bone of a [`super::Rig`].
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub bind_pose: Transform,
    pub constraint: Option<Box<dyn Constraint>>,
}

impl Bone {
    pub fn new(bind_pose: Transform) -> Self {
        Self {
            name: None,
            parent: None,
            bind_pose,
            constraint: None,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Transform::from_translation(translation))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_constraint<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        self.constraint = Some(Box::new(constraint));
        self
    }

    pub fn with_boxed_constraint(mut self, constraint: Option<Box<dyn Constraint>>) -> Self {
        self.constraint = constraint;
        self
    }
}
