//! Per-registrant scheduling state

use crate::scheduler::PhaseScheduler;
use crate::tickable::{Registrant, Tickable};
use cadence_core::{CadenceError, RegistrantId, Result, Seconds};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Initial scheduling parameters for an [`UpdateToken`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Minimum seconds between invocations. 0 means every tick.
    #[serde(default)]
    pub interval: Seconds,
    #[serde(default)]
    pub paused: bool,
    /// Time of the last invocation
    #[serde(default)]
    pub last_update: Seconds,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            interval: 0.0,
            paused: false,
            last_update: 0.0,
        }
    }
}

impl TokenConfig {
    /// Invoke on every tick
    pub fn every_tick() -> Self {
        Self::default()
    }

    /// Invoke at most once per `interval` seconds
    pub fn every(interval: Seconds) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn last_update(mut self, at: Seconds) -> Self {
        self.last_update = at;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_interval(self.interval)
    }
}

fn validate_interval(interval: Seconds) -> Result<()> {
    if interval.is_finite() && interval >= 0.0 {
        Ok(())
    } else {
        Err(CadenceError::InvalidInterval(interval))
    }
}

struct TokenState {
    id: RegistrantId,
    registrant: Rc<RefCell<dyn Tickable>>,
    interval: Cell<Seconds>,
    last_update: Cell<Seconds>,
    paused: Cell<bool>,
}

/// Scheduling state for one registrant in one scheduler.
///
/// Cloning yields another handle to the same state, so an owner can pause or
/// retune a token the scheduler is holding. The registrant never changes
/// after construction.
#[derive(Clone)]
pub struct UpdateToken {
    state: Rc<TokenState>,
}

impl UpdateToken {
    pub fn new<T: Tickable + 'static>(registrant: &Registrant<T>, config: TokenConfig) -> Result<Self> {
        let cell: Rc<RefCell<dyn Tickable>> = registrant.cell().clone();
        Self::from_parts(registrant.id(), cell, config)
    }

    /// Build a token for an already type-erased registrant
    pub fn from_parts(
        id: RegistrantId,
        registrant: Rc<RefCell<dyn Tickable>>,
        config: TokenConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Rc::new(TokenState {
                id,
                registrant,
                interval: Cell::new(config.interval),
                last_update: Cell::new(config.last_update),
                paused: Cell::new(config.paused),
            }),
        })
    }

    pub fn id(&self) -> RegistrantId {
        self.state.id
    }

    pub fn interval(&self) -> Seconds {
        self.state.interval.get()
    }

    pub fn set_interval(&self, interval: Seconds) -> Result<()> {
        validate_interval(interval)?;
        self.state.interval.set(interval);
        Ok(())
    }

    pub fn last_update(&self) -> Seconds {
        self.state.last_update.get()
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.get()
    }

    pub fn pause(&self) {
        self.state.paused.set(true);
    }

    pub fn resume(&self) {
        self.state.paused.set(false);
    }

    /// Due when `now - last_update >= interval`. A zero interval is always due.
    pub fn is_due(&self, now: Seconds) -> bool {
        let interval = self.interval();
        interval <= 0.0 || now - self.last_update() >= interval
    }

    /// True if both handles point at the same token state
    pub fn same_token(&self, other: &UpdateToken) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn downgrade(&self) -> TokenRef {
        TokenRef(Rc::downgrade(&self.state))
    }

    /// Snap `last_update` to `now` and run the registrant's callback.
    ///
    /// Missed intervals are not replayed.
    pub(crate) fn invoke(&self, scheduler: &PhaseScheduler, now: Seconds) -> Result<()> {
        let mut registrant = self
            .state
            .registrant
            .try_borrow_mut()
            .map_err(|_| CadenceError::RegistrantBusy(self.id()))?;
        self.state.last_update.set(now);
        registrant.update(scheduler)
    }
}

/// Non-owning handle that recognises one particular token
#[derive(Debug, Clone)]
pub(crate) struct TokenRef(Weak<TokenState>);

impl TokenRef {
    pub(crate) fn is(&self, token: &UpdateToken) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&token.state))
    }
}

impl fmt::Debug for UpdateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateToken")
            .field("id", &self.id())
            .field("interval", &self.interval())
            .field("last_update", &self.last_update())
            .field("paused", &self.is_paused())
            .finish()
    }
}
