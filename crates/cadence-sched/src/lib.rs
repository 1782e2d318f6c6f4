//! Cadence Sched - Phase schedulers with deferred mutation
//!
//! Tickable objects register with a scheduler for one of three phases
//! (`Update`, `FixedUpdate`, `LateUpdate`) and are invoked when due, at most
//! once per tick and no more often than their token's interval allows.
//!
//! - `Command` / `CommandBuffer`: queued mutations replayed after a pass
//! - `UpdateToken` / `TokenConfig`: per-registrant interval, pause flag and
//!   last-invocation time
//! - `PhaseScheduler` / `PhaseSet`: the tick loop and the per-phase set
//! - `Tickable` / `Registrant` / `Updatable`: what gets ticked
//! - `Registration`: guard that queues removal when dropped

mod buffer;
mod command;
mod phase;
mod scheduler;
mod tickable;
mod token;
mod updatable;

pub use buffer::CommandBuffer;
pub use command::{Apply, Command, KeyedStore};
pub use phase::{Phase, PhaseSet};
pub use scheduler::{PhaseScheduler, Registration, TickStats};
pub use tickable::{Registrant, Tickable};
pub use token::{TokenConfig, UpdateToken};
pub use updatable::Updatable;
