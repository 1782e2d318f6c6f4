//! Identity types for registrants and deferred commands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters for generating unique IDs
static NEXT_REGISTRANT: AtomicU64 = AtomicU64::new(1);
static NEXT_COMMAND: AtomicU64 = AtomicU64::new(1);

/// Identity of a registrant.
///
/// Schedulers key their entries by this value, so two handles to the same
/// registrant compare equal while two registrants with equal contents do not.
/// IDs are never reused within a process.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrantId(pub u64);

impl RegistrantId {
    /// Allocate a new unique RegistrantId
    pub fn new() -> Self {
        Self(NEXT_REGISTRANT.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a RegistrantId from a raw value (for reports/testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for RegistrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistrantId({})", self.0)
    }
}

impl fmt::Display for RegistrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a command queued in a command buffer.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CommandId(u64);

impl CommandId {
    pub fn new() -> Self {
        Self(NEXT_COMMAND.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}
