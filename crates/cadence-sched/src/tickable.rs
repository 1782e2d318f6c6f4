//! Tickable registrants

use crate::scheduler::PhaseScheduler;
use cadence_core::{RegistrantId, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// An object a [`PhaseScheduler`] can invoke when it is due.
///
/// The callback receives the scheduler that invoked it, so it can register or
/// remove registrants (its own entry included). Those requests are deferred
/// until the current pass has finished. Returning an error aborts the rest of
/// the pass.
pub trait Tickable {
    fn update(&mut self, scheduler: &PhaseScheduler) -> Result<()>;
}

impl<F> Tickable for F
where
    F: FnMut(&PhaseScheduler) -> Result<()>,
{
    fn update(&mut self, scheduler: &PhaseScheduler) -> Result<()> {
        self(scheduler)
    }
}

/// Shared handle to a registrant value with a stable identity.
///
/// Clones share both the value and the [`RegistrantId`]; schedulers compare
/// registrants by that id, never by value.
pub struct Registrant<T: ?Sized> {
    id: RegistrantId,
    cell: Rc<RefCell<T>>,
}

impl<T> Registrant<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: RegistrantId::new(),
            cell: Rc::new(RefCell::new(value)),
        }
    }
}

impl<T: ?Sized> Registrant<T> {
    pub fn id(&self) -> RegistrantId {
        self.id
    }

    /// Immutably borrow the value. Panics if it is mutably borrowed, which
    /// happens while the registrant's own `update` is running.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.cell.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.cell.borrow_mut()
    }

    pub fn cell(&self) -> &Rc<RefCell<T>> {
        &self.cell
    }
}

impl<T: ?Sized> Clone for Registrant<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Registrant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrant").field("id", &self.id).finish()
    }
}
