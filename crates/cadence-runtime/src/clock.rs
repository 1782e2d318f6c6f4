//! Game clock with fixed-timestep accumulator

use cadence_core::Seconds;
use std::time::Instant;

/// Tracks frame time and provides a fixed-timestep accumulator.
///
/// `total_time` feeds the Update/LateUpdate schedulers and `fixed_time` the
/// FixedUpdate scheduler; both only ever grow.
pub struct GameClock {
    /// Total elapsed time in seconds
    pub total_time: Seconds,
    /// Time since last frame in seconds (after clamping)
    pub delta_time: Seconds,
    /// Fixed timestep interval (default: 1/60 second)
    pub fixed_timestep: Seconds,
    /// Simulated time consumed by fixed steps
    pub fixed_time: Seconds,
    /// Longest frame the clock will account for
    pub max_frame_time: Seconds,
    /// Accumulated time for fixed-step consumption
    accumulator: Seconds,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first real-time tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            fixed_time: 0.0,
            max_frame_time: 0.25,
            accumulator: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    /// Create a new game clock with default 60Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game clock with a custom fixed timestep
    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::default()
        }
    }

    /// Advance the clock from the wall clock. Call once per frame.
    ///
    /// The first call only records the start instant.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by a simulated frame time.
    ///
    /// Negative or non-finite values count as zero; long frames are clamped
    /// to `max_frame_time` to avoid a spiral of death.
    pub fn advance(&mut self, elapsed: Seconds) {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.delta_time = elapsed.min(self.max_frame_time);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
        self.fixed_time += self.fixed_timestep;
    }

    /// Drop leftover accumulated time (used when the step cap is hit)
    pub fn discard_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Get the interpolation alpha for rendering between fixed steps
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_timestep
    }
}
