use crate::ik::{IkChain, Rig};
use crate::math::translation;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub const ROOT_COLOR: [f32; 4] = [0.2, 0.8, 0.2, 1.0];
pub const END_COLOR: [f32; 4] = [0.8, 0.8, 0.2, 1.0];
pub const JOINT_COLOR: [f32; 4] = [0.3, 0.5, 0.9, 1.0];
pub const BONE_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
pub const CHAIN_COLOR: [f32; 4] = [0.9, 0.5, 0.2, 1.0];
pub const GOAL_COLOR: [f32; 4] = [0.9, 0.2, 0.2, 1.0];

/// One end of a debug line, laid out for a line-list vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// Line-list geometry showing a rig's bones, its joints and an IK goal.
#[derive(Debug, Clone, Default)]
pub struct DebugLines {
    vertices: Vec<LineVertex>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bones as parent-to-child segments (chain bones highlighted), a small
    /// cross on every joint and one on the goal.
    pub fn from_rig(rig: &Rig, chain: Option<&IkChain>, goal: Option<Vec3>, marker_size: f32) -> Self {
        let mut lines = Self::new();
        let in_chain = |bone: usize| chain.is_some_and(|c| c.bones().contains(&bone));
        let root_origin = translation(&rig.root_world());
        let positions: Vec<Vec3> = rig.bone_positions().collect();

        for (bone, &position) in positions.iter().enumerate() {
            let (start, parent_in_chain) = match rig.parents()[bone] {
                Some(parent) => (positions[parent], in_chain(parent)),
                None => (root_origin, false),
            };
            let color = if parent_in_chain && in_chain(bone) {
                CHAIN_COLOR
            } else {
                BONE_COLOR
            };
            lines.push_line(start, position, color);
        }

        let end_effector = chain.map(IkChain::end_effector);
        for (bone, &position) in positions.iter().enumerate() {
            let color = if Some(bone) == end_effector {
                END_COLOR
            } else if rig.parents()[bone].is_none() {
                ROOT_COLOR
            } else {
                JOINT_COLOR
            };
            lines.push_cross(position, marker_size, color);
        }

        if let Some(goal) = goal {
            lines.push_cross(goal, marker_size * 1.5, GOAL_COLOR);
        }
        lines
    }

    pub fn push_line(&mut self, start: Vec3, end: Vec3, color: [f32; 4]) {
        self.vertices.push(LineVertex::new(start, color));
        self.vertices.push(LineVertex::new(end, color));
    }

    /// Three axis-aligned segments of length `2 * size` centred on `center`.
    pub fn push_cross(&mut self, center: Vec3, size: f32, color: [f32; 4]) {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            self.push_line(center - axis * size, center + axis * size, color);
        }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}
