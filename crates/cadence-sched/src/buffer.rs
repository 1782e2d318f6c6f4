//! Ordered queue of deferred commands

use crate::command::{Apply, Command};
use cadence_core::CommandId;

/// An ordered queue of deferred commands.
///
/// Commands are replayed in insertion order by [`process`](Self::process).
/// Each queued command gets a [`CommandId`] so it can be withdrawn before the
/// flush.
pub struct CommandBuffer<C = Command> {
    queue: Vec<(CommandId, C)>,
}

impl<C> Default for CommandBuffer<C> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<C: Apply> CommandBuffer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the tail of the queue
    pub fn add(&mut self, command: C) -> CommandId {
        let id = CommandId::new();
        self.queue.push((id, command));
        id
    }

    /// Withdraw a queued command. Returns false if it was not queued.
    pub fn remove(&mut self, id: CommandId) -> bool {
        match self.queue.iter().position(|(queued, _)| *queued == id) {
            Some(pos) => {
                self.queue.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if there are queued commands
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop all queued commands without applying them
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Detach the queued commands into a new buffer, leaving this one empty.
    pub fn take(&mut self) -> Self {
        Self {
            queue: std::mem::take(&mut self.queue),
        }
    }

    /// Apply every queued command once, oldest first, and empty the queue.
    ///
    /// Returns the number of commands applied.
    pub fn process(&mut self) -> usize {
        if self.queue.is_empty() {
            return 0;
        }

        let queued = std::mem::take(&mut self.queue);
        let applied = queued.len();
        for (_, command) in queued {
            command.apply();
        }
        applied
    }
}
