//! Solver configuration and JSON loading helpers.

use crate::error::{IkError, Result};
use crate::ik::{StepMode, DEFAULT_EPSILON};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by [`crate::ik::ChainDriver`] and [`crate::ik::CcdSolver::solve`].
///
/// Every field is optional in JSON; missing ones take the defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub mode: StepMode,
    /// Vectors shorter than this are treated as degenerate.
    pub epsilon: f32,
    /// Distance at which [`crate::ik::CcdSolver::solve`] reports convergence.
    pub tolerance: f32,
    /// Full sweeps allowed per solve.
    pub max_iterations: u32,
    pub start_paused: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: StepMode::FullChain,
            epsilon: DEFAULT_EPSILON,
            tolerance: 1e-3,
            max_iterations: 50,
            start_paused: false,
        }
    }
}

impl SolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| IkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded {}", path.display());
    Ok(serde_json::from_str(&text)?)
}
