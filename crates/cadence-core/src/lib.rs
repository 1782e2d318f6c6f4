//! Cadence Core - Foundational types for the Cadence scheduler
//!
//! This crate provides the types that all other Cadence crates depend on:
//! - `RegistrantId` - Identity of a tickable registrant
//! - `CommandId` - Identity of a queued deferred command
//! - `Seconds` - Time values handed to the schedulers
//! - Error types and Result alias

mod error;
mod id;

pub use error::{CadenceError, Result};
pub use id::{CommandId, RegistrantId};

/// Engine time in seconds. Monotonically non-decreasing within one phase.
pub type Seconds = f64;
