//! Host-facing render output
//!
//! GPU-agnostic buffers built from a rig's world transforms: debug line
//! geometry and skinning palettes, both `bytemuck`-castable for upload.

pub mod debug;
pub mod palette;

pub use debug::{DebugLines, LineVertex};
pub use palette::{palette_bytes, SkinningPalette, MATRIX_STRIDE};
