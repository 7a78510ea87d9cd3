//! Inverse Kinematics module
//!
//! Bone hierarchies ([`Rig`]), the chains IK drives through them ([`IkChain`]),
//! the Cyclic Coordinate Descent update ([`CcdSolver`]) and the per-tick state
//! machine that sequences it ([`ChainDriver`]).

pub mod bone;
pub mod chain;
pub mod constraint;
pub mod desc;
pub mod driver;
pub mod rig;
pub mod solver;

pub use bone::Bone;
pub use chain::IkChain;
pub use constraint::{BallSocketConstraint, Constraint, ConstraintDesc, HingeConstraint};
pub use desc::{BoneDesc, BoneRef, ChainDesc, RigDesc};
pub use driver::{ChainDriver, ChainState, StepMode, TickReport};
pub use rig::{Rig, RigBuilder};
pub use solver::{BoneUpdate, CcdSolver, SkipReason, SolveResult, DEFAULT_EPSILON};
