//! Frame driver: calls each phase scheduler once per occurrence of its phase

use crate::clock::GameClock;
use crate::config::RuntimeConfig;
use cadence_core::{CadenceError, RegistrantId, Result, Seconds};
use cadence_sched::{Phase, PhaseSet, TickStats};
use serde::Serialize;
use tracing::{debug, warn};

/// A phase tick that failed during a frame
#[derive(Debug, Clone, Serialize)]
pub struct PhaseFailure {
    pub phase: Phase,
    pub registrant: Option<RegistrantId>,
    pub message: String,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub fixed_steps: u32,
    /// Leftover fraction of a fixed step after this frame's fixed updates,
    /// for interpolating between the last two fixed states
    pub alpha: f64,
    pub fixed: TickStats,
    pub update: TickStats,
    pub late: TickStats,
    pub failures: Vec<PhaseFailure>,
}

impl FrameStats {
    pub fn invoked(&self) -> usize {
        self.fixed.invoked + self.update.invoked + self.late.invoked
    }
}

/// Drives a [`PhaseSet`] from a [`GameClock`].
///
/// Each frame runs zero or more FixedUpdate steps, then Update, then
/// LateUpdate. FixedUpdate sees the fixed-step time; the other phases see the
/// clock's total time.
pub struct FrameDriver {
    phases: PhaseSet,
    clock: GameClock,
    max_fixed_steps: u32,
    stop_on_error: bool,
    frame_index: u64,
}

impl FrameDriver {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Self::with_phases(PhaseSet::new(), config)
    }

    pub fn with_phases(phases: PhaseSet, config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let mut clock = GameClock::with_fixed_timestep(config.fixed_hz);
        clock.max_frame_time = config.max_frame_time;
        Ok(Self {
            phases,
            clock,
            max_fixed_steps: config.max_fixed_steps,
            stop_on_error: config.stop_on_error,
            frame_index: 0,
        })
    }

    pub fn phases(&self) -> &PhaseSet {
        &self.phases
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Run one frame using wall-clock time
    pub fn frame(&mut self) -> Result<FrameStats> {
        self.clock.tick();
        self.run_frame()
    }

    /// Run one frame after advancing the clock by `dt` seconds
    pub fn step(&mut self, dt: Seconds) -> Result<FrameStats> {
        self.clock.advance(dt);
        self.run_frame()
    }

    fn run_frame(&mut self) -> Result<FrameStats> {
        self.frame_index += 1;
        let mut stats = FrameStats {
            frame: self.frame_index,
            ..FrameStats::default()
        };

        while self.clock.should_fixed_update() {
            if stats.fixed_steps >= self.max_fixed_steps {
                warn!(
                    frame = self.frame_index,
                    cap = self.max_fixed_steps,
                    "fixed step cap reached, dropping accumulated time"
                );
                self.clock.discard_accumulator();
                break;
            }
            self.clock.consume_fixed_step();
            stats.fixed_steps += 1;
            let now = self.clock.fixed_time;
            let result = self.phases.run_fixed_update(now);
            if let Some(tick) = self.record(Phase::FixedUpdate, result, &mut stats.failures)? {
                stats.fixed.merge(tick);
            }
        }

        stats.alpha = self.clock.interpolation_alpha();

        let now = self.clock.total_time;
        let result = self.phases.run_update(now);
        if let Some(tick) = self.record(Phase::Update, result, &mut stats.failures)? {
            stats.update = tick;
        }
        let result = self.phases.run_late_update(now);
        if let Some(tick) = self.record(Phase::LateUpdate, result, &mut stats.failures)? {
            stats.late = tick;
        }

        debug!(
            frame = stats.frame,
            fixed_steps = stats.fixed_steps,
            invoked = stats.invoked(),
            "frame complete"
        );
        Ok(stats)
    }

    /// Pass a phase failure up, or log and record it, per `stop_on_error`
    fn record(
        &self,
        phase: Phase,
        result: Result<TickStats>,
        failures: &mut Vec<PhaseFailure>,
    ) -> Result<Option<TickStats>> {
        match result {
            Ok(tick) => Ok(Some(tick)),
            Err(err) if self.stop_on_error => Err(err),
            Err(err) => {
                warn!(frame = self.frame_index, %phase, error = %err, "phase tick failed");
                failures.push(PhaseFailure {
                    phase,
                    registrant: err.aborted_by(),
                    message: failure_message(&err),
                });
                Ok(None)
            }
        }
    }
}

fn failure_message(err: &CadenceError) -> String {
    match err {
        CadenceError::TickAborted { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
