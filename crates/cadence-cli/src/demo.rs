//! Demo registrants for `cadence simulate`

use crate::scenario::Behavior;
use cadence_core::{CadenceError, RegistrantId, Result, Seconds};
use cadence_sched::{Phase, PhaseScheduler, Registrant, Tickable, TokenConfig, UpdateToken};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Per-registrant results, keyed by name
pub type Tally = Rc<RefCell<BTreeMap<String, RegistrantReport>>>;

#[derive(Debug, Clone, Serialize)]
pub struct RegistrantReport {
    pub phase: Phase,
    pub invocations: u64,
    pub last_invoked_at: Option<Seconds>,
    pub spawned: u32,
    pub failures: u32,
    pub expired: bool,
}

impl RegistrantReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            invocations: 0,
            last_invoked_at: None,
            spawned: 0,
            failures: 0,
            expired: false,
        }
    }
}

/// A scenario registrant. Its behavior comes from the scenario file.
pub struct DemoRegistrant {
    name: String,
    id: Option<RegistrantId>,
    behavior: Behavior,
    invocations: u64,
    tally: Tally,
}

impl DemoRegistrant {
    /// Create the registrant and give it its own id, which expiring
    /// registrants need to remove themselves.
    pub fn spawn(name: String, phase: Phase, behavior: Behavior, tally: &Tally) -> Registrant<Self> {
        tally
            .borrow_mut()
            .insert(name.clone(), RegistrantReport::new(phase));
        let registrant = Registrant::new(Self {
            name,
            id: None,
            behavior,
            invocations: 0,
            tally: Rc::clone(tally),
        });
        registrant.borrow_mut().id = Some(registrant.id());
        registrant
    }

    fn report<R>(&self, f: impl FnOnce(&mut RegistrantReport) -> R) -> Option<R> {
        self.tally.borrow_mut().get_mut(&self.name).map(f)
    }

    fn spawn_child(&self, scheduler: &PhaseScheduler, interval: Seconds, lifetime: u32) -> Result<()> {
        let spawned = self
            .report(|r| {
                r.spawned += 1;
                r.spawned
            })
            .unwrap_or(0);
        let child = Self::spawn(
            format!("{}#{}", self.name, spawned),
            scheduler.phase(),
            Behavior::Expiring { lifetime },
            &self.tally,
        );
        let config = TokenConfig::every(interval).last_update(scheduler.now());
        scheduler.register_detached(UpdateToken::new(&child, config)?);
        Ok(())
    }
}

impl Tickable for DemoRegistrant {
    fn update(&mut self, scheduler: &PhaseScheduler) -> Result<()> {
        self.invocations += 1;
        let now = scheduler.now();
        self.report(|r| {
            r.invocations += 1;
            r.last_invoked_at = Some(now);
        });

        match self.behavior.clone() {
            Behavior::Counter => Ok(()),
            Behavior::Expiring { lifetime } => {
                if self.invocations >= u64::from(lifetime) {
                    if let Some(id) = self.id {
                        scheduler.remove(id);
                    }
                    self.report(|r| r.expired = true);
                }
                Ok(())
            }
            Behavior::Spawner {
                every,
                child_interval,
                child_lifetime,
            } => {
                if self.invocations % u64::from(every) == 0 {
                    self.spawn_child(scheduler, child_interval, child_lifetime)?;
                }
                Ok(())
            }
            Behavior::Failing { fail_every } => {
                if self.invocations % u64::from(fail_every) == 0 {
                    self.report(|r| r.failures += 1);
                    return Err(CadenceError::registrant(format!(
                        "{} failed on invocation {}",
                        self.name, self.invocations
                    )));
                }
                Ok(())
            }
        }
    }
}
