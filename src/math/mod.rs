//! Math utilities module
//!
//! Provides convenient re-exports from glam and the transform helpers shared by
//! the rig and the solver.

mod transform;

pub use transform::{rotation_angle, translation, wrap_angle, Transform};

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3};
