use super::chain::IkChain;
use super::rig::Rig;
use super::solver::CcdSolver;
use crate::config::SolverConfig;
use crate::error::Result;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How much of the chain a [`ChainDriver`] resolves per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Every rotatable bone, end effector side first, each tick.
    #[default]
    FullChain,
    /// One bone per tick; the cursor carries over to the next tick.
    SingleStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No tick processed since start or reset, cursor at 1.
    Idle,
    /// Part way through a sweep.
    Stepping,
    /// The last tick finished a sweep and the cursor wrapped back to 1.
    ChainComplete,
}

#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    /// Bones visited this tick.
    pub updated: usize,
    /// Bones whose offset actually changed.
    pub rotated: usize,
    pub wrapped: bool,
    pub state: ChainState,
    /// End effector distance to the goal after the tick.
    pub distance: f32,
}

/// Per-tick CCD state machine for one chain.
///
/// The goal may move between ticks; the chain never terminates and keeps
/// re-resolving for as long as it is ticked.
#[derive(Debug, Clone)]
pub struct ChainDriver {
    mode: StepMode,
    epsilon: f32,
    cursor: usize,
    state: ChainState,
    paused: bool,
    wraps: u64,
    ticks: u64,
}

impl ChainDriver {
    pub fn new(mode: StepMode) -> Self {
        Self::from_config(&SolverConfig {
            mode,
            ..SolverConfig::default()
        })
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            mode: config.mode,
            epsilon: config.epsilon,
            cursor: 1,
            state: ChainState::Idle,
            paused: config.start_paused,
            wraps: 0,
            ticks: 0,
        }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Switches mode and restarts the sweep from the end effector side.
    pub fn set_mode(&mut self, mode: StepMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset();
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Completed sweeps since construction.
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    /// Ticks processed while running.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn reset(&mut self) {
        self.cursor = 1;
        self.state = ChainState::Idle;
    }

    /// Advances the chain by one tick toward `goal`.
    ///
    /// Paused drivers and chains with nothing to rotate leave the rig alone.
    /// `chain` must have been built against `rig`'s hierarchy.
    pub fn tick(&mut self, rig: &mut Rig, chain: &IkChain, goal: Vec3) -> Result<TickReport> {
        chain.check_rig(rig)?;
        let len = chain.len();
        if self.paused || len < 2 {
            return Ok(TickReport {
                updated: 0,
                rotated: 0,
                wrapped: false,
                state: self.state,
                distance: rig.distance_to_goal(chain, goal)?,
            });
        }

        // the chain may have been swapped for a shorter one
        if self.cursor >= len {
            self.cursor = 1;
        }

        let first = self.cursor;
        let last = match self.mode {
            StepMode::FullChain => len - 1,
            StepMode::SingleStep => first,
        };

        let mut rotated = 0;
        for current in first..=last {
            if CcdSolver::update_bone(rig, chain, current, 0, goal, self.epsilon)?.is_rotated() {
                rotated += 1;
            }
            rig.propagate();
        }
        self.cursor = last + 1;
        self.ticks += 1;

        let wrapped = self.cursor >= len;
        if wrapped {
            self.cursor = 1;
            self.wraps += 1;
            self.state = ChainState::ChainComplete;
        } else {
            self.state = ChainState::Stepping;
        }

        let distance = rig.distance_to_goal(chain, goal)?;
        if wrapped {
            log::debug!("sweep {} complete, distance {distance:.5}", self.wraps);
        }

        Ok(TickReport {
            updated: last + 1 - first,
            rotated,
            wrapped,
            state: self.state,
            distance,
        })
    }
}

impl Default for ChainDriver {
    fn default() -> Self {
        Self::new(StepMode::default())
    }
}
