//! Self-registering registrant wrapper

use crate::phase::Phase;
use crate::scheduler::{PhaseScheduler, Registration};
use crate::tickable::{Registrant, Tickable};
use crate::token::{TokenConfig, UpdateToken};
use cadence_core::{RegistrantId, Result};
use std::cell::{Ref, RefMut};

/// A registrant that registers itself on construction and queues its own
/// removal when dropped.
///
/// Pausing is applied to the live token immediately, not deferred.
pub struct Updatable<T> {
    registrant: Registrant<T>,
    token: UpdateToken,
    registration: Registration,
}

impl<T: Tickable + 'static> Updatable<T> {
    pub fn new(scheduler: &PhaseScheduler, value: T, config: TokenConfig) -> Result<Self> {
        Self::from_registrant(scheduler, Registrant::new(value), config)
    }

    /// Register an existing registrant, e.g. one already ticked in another
    /// phase. Each call gets its own token.
    pub fn from_registrant(
        scheduler: &PhaseScheduler,
        registrant: Registrant<T>,
        config: TokenConfig,
    ) -> Result<Self> {
        let token = UpdateToken::new(&registrant, config)?;
        let registration = scheduler.register(token.clone());
        Ok(Self {
            registrant,
            token,
            registration,
        })
    }
}

impl<T> Updatable<T> {
    pub fn id(&self) -> RegistrantId {
        self.registrant.id()
    }

    pub fn phase(&self) -> Phase {
        self.registration.phase()
    }

    pub fn token(&self) -> &UpdateToken {
        &self.token
    }

    pub fn registrant(&self) -> &Registrant<T> {
        &self.registrant
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.registrant.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.registrant.borrow_mut()
    }

    /// Whether this wrapper's token is the one the scheduler holds.
    ///
    /// False before the first flush, and for a wrapper whose registration
    /// was dropped because the registrant was already registered in that
    /// phase. Pausing such a wrapper has no effect on the scheduler, and
    /// dropping it leaves the existing entry in place.
    pub fn is_registered(&self) -> bool {
        self.registration.is_registered()
    }

    pub fn start_update(&self) {
        self.token.resume();
    }

    pub fn stop_update(&self) {
        self.token.pause();
    }

    pub fn is_updating(&self) -> bool {
        !self.token.is_paused()
    }
}
