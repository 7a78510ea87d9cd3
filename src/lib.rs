//! # ccd-ik
//!
//! Cyclic Coordinate Descent inverse kinematics for bone hierarchies.
//!
//! ## Features
//! - Rigs as parallel bind-pose / parent / offset arrays with cached local and
//!   world transforms
//! - CCD bone update with degenerate-input guards
//! - Full-chain and single-step drivers for per-frame use
//! - Optional joint constraints (ball-socket, hinge)
//! - JSON rig descriptions and solver configuration
//! - Debug line geometry and skinning palettes for a host renderer
//!
//! ## Example
//! ```rust,no_run
//! use ccd_ik::ik::{ChainDriver, IkChain, Rig, StepMode};
//! use glam::Vec3;
//!
//! # fn main() -> ccd_ik::Result<()> {
//! let mut rig = Rig::cylinder_chain(20, 0.1)?;
//! let chain = IkChain::from_end_effector(&rig, 19, 20)?;
//! let mut driver = ChainDriver::new(StepMode::FullChain);
//!
//! let goal = Vec3::new(1.2, 0.4, 0.0);
//! for _ in 0..200 {
//!     let report = driver.tick(&mut rig, &chain, goal)?;
//!     println!("distance: {}", report.distance);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ik;
pub mod math;
pub mod render;

pub use config::SolverConfig;
pub use error::{IkError, Result};
pub use ik::{
    BallSocketConstraint, Bone, BoneUpdate, CcdSolver, ChainDriver, ChainState, Constraint,
    HingeConstraint, IkChain, Rig, RigBuilder, RigDesc, StepMode, TickReport,
};
pub use math::Transform;
pub use render::{DebugLines, SkinningPalette};
