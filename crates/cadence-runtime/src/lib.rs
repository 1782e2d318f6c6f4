//! Cadence Runtime - Host loop for the phase schedulers
//!
//! Provides the pieces a host needs to drive a `PhaseSet`:
//! - `GameClock`: frame timing with a fixed-timestep accumulator
//! - `RuntimeConfig`: TOML-backed loop settings
//! - `FrameDriver`: runs FixedUpdate (zero or more steps), Update and
//!   LateUpdate once per frame

mod clock;
mod config;
mod driver;

pub use clock::GameClock;
pub use config::RuntimeConfig;
pub use driver::{FrameDriver, FrameStats, PhaseFailure};
