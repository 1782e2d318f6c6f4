//! Execution phases and the scheduler set that owns one scheduler per phase

use crate::scheduler::{PhaseScheduler, TickStats};
use cadence_core::{Result, Seconds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed points in a frame at which registrants can run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Once per frame
    Update,
    /// Zero or more times per frame at a fixed step
    FixedUpdate,
    /// Once per frame, after `Update`
    LateUpdate,
}

impl Phase {
    /// All phases in host execution order
    pub const ALL: [Phase; 3] = [Phase::FixedUpdate, Phase::Update, Phase::LateUpdate];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Update => "Update",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::LateUpdate => "LateUpdate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduler per phase, owned by the application.
///
/// Pass `&PhaseSet` (or a single scheduler) to whatever needs to register;
/// independent sets do not share any state.
pub struct PhaseSet {
    update: PhaseScheduler,
    fixed_update: PhaseScheduler,
    late_update: PhaseScheduler,
}

impl Default for PhaseSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseSet {
    pub fn new() -> Self {
        Self {
            update: PhaseScheduler::new(Phase::Update),
            fixed_update: PhaseScheduler::new(Phase::FixedUpdate),
            late_update: PhaseScheduler::new(Phase::LateUpdate),
        }
    }

    pub fn get(&self, phase: Phase) -> &PhaseScheduler {
        match phase {
            Phase::Update => &self.update,
            Phase::FixedUpdate => &self.fixed_update,
            Phase::LateUpdate => &self.late_update,
        }
    }

    pub fn update(&self) -> &PhaseScheduler {
        &self.update
    }

    pub fn fixed_update(&self) -> &PhaseScheduler {
        &self.fixed_update
    }

    pub fn late_update(&self) -> &PhaseScheduler {
        &self.late_update
    }

    /// Host entry point for the main update phase
    pub fn run_update(&self, now: Seconds) -> Result<TickStats> {
        self.update.tick(now)
    }

    /// Host entry point for one fixed step
    pub fn run_fixed_update(&self, now: Seconds) -> Result<TickStats> {
        self.fixed_update.tick(now)
    }

    /// Host entry point for the late phase
    pub fn run_late_update(&self, now: Seconds) -> Result<TickStats> {
        self.late_update.tick(now)
    }

    pub fn tick(&self, phase: Phase, now: Seconds) -> Result<TickStats> {
        self.get(phase).tick(now)
    }

    /// Apply pending registrations in every phase, e.g. before the first frame
    pub fn flush_all(&self) -> usize {
        Phase::ALL.iter().map(|&p| self.get(p).flush()).sum()
    }

    /// Total registrants across all phases
    pub fn len(&self) -> usize {
        Phase::ALL.iter().map(|&p| self.get(p).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
