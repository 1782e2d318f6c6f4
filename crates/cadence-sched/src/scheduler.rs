//! Phase scheduler: throttled invocation with deferred registration
//!
//! A [`PhaseScheduler`] owns the registrant-to-token map for one phase and a
//! [`CommandBuffer`] of pending mutations. The map is only ever changed by
//! flushing that buffer, which happens after a pass over the registrants has
//! completed, so callbacks can register and remove entries (including their
//! own) without disturbing the iteration in progress.

use crate::buffer::CommandBuffer;
use crate::command::Command;
use crate::phase::Phase;
use crate::token::{TokenRef, UpdateToken};
use cadence_core::{CadenceError, CommandId, RegistrantId, Result, Seconds};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

type TokenMap = BTreeMap<RegistrantId, UpdateToken>;

struct Shared {
    entries: Rc<RefCell<TokenMap>>,
    commands: RefCell<CommandBuffer>,
}

impl Shared {
    fn queue_removal(&self, id: RegistrantId) -> CommandId {
        self.commands
            .borrow_mut()
            .add(Command::remove_key(&self.entries, id))
    }

    /// Queue removal of `id` that only happens if `mine` is still the live token
    fn queue_release(&self, id: RegistrantId, mine: TokenRef) -> CommandId {
        let entries = Rc::clone(&self.entries);
        self.commands
            .borrow_mut()
            .add(Command::labeled("unregister", move || {
                let removed = {
                    let mut map = entries.borrow_mut();
                    let ours = map.get(&id).is_some_and(|live| mine.is(live));
                    if ours {
                        map.remove(&id)
                    } else {
                        None
                    }
                };
                drop(removed);
            }))
    }

    fn holds(&self, id: RegistrantId, mine: &TokenRef) -> bool {
        self.entries
            .borrow()
            .get(&id)
            .is_some_and(|live| mine.is(live))
    }
}

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    /// Registrants whose callback ran
    pub invoked: usize,
    /// Registrants skipped because they are paused
    pub paused: usize,
    /// Registrants skipped because their interval has not elapsed
    pub throttled: usize,
    /// Deferred commands applied by the flush
    pub applied: usize,
}

impl TickStats {
    pub fn merge(&mut self, other: TickStats) {
        self.invoked += other.invoked;
        self.paused += other.paused;
        self.throttled += other.throttled;
        self.applied += other.applied;
    }
}

/// Scheduler for a single execution phase.
///
/// The host calls [`tick`](Self::tick) once per occurrence of the phase with
/// a non-decreasing time. Ticks must not overlap; a nested tick from inside a
/// callback is rejected.
pub struct PhaseScheduler {
    phase: Phase,
    shared: Rc<Shared>,
    now: Cell<Seconds>,
    in_pass: Cell<bool>,
}

impl PhaseScheduler {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            shared: Rc::new(Shared {
                entries: Rc::new(RefCell::new(TokenMap::new())),
                commands: RefCell::new(CommandBuffer::new()),
            }),
            now: Cell::new(0.0),
            in_pass: Cell::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Time passed to the most recent tick
    pub fn now(&self) -> Seconds {
        self.now.get()
    }

    /// Queue registration of `token` and return a guard that queues its
    /// removal when dropped.
    ///
    /// If a registrant with the same id is already present when the flush
    /// runs, the request is dropped and the existing token is kept.
    pub fn register(&self, token: UpdateToken) -> Registration {
        let id = token.id();
        let mine = token.downgrade();
        self.register_detached(token);
        Registration {
            id,
            phase: self.phase,
            shared: Rc::downgrade(&self.shared),
            token: mine,
            armed: true,
        }
    }

    /// Queue registration of `token` without a removal guard
    pub fn register_detached(&self, token: UpdateToken) -> CommandId {
        let id = token.id();
        let phase = self.phase.as_str();
        let entries = Rc::clone(&self.shared.entries);
        trace!(phase, %id, "registration queued");
        self.defer(Command::labeled("register", move || {
            let rejected = {
                let mut map = entries.borrow_mut();
                if map.contains_key(&id) {
                    Some(token)
                } else {
                    map.insert(id, token);
                    None
                }
            };
            if rejected.is_some() {
                debug!(phase, %id, "already registered; duplicate dropped");
            }
        }))
    }

    /// Queue removal of the registrant with `id`. No-op at flush if absent.
    pub fn remove(&self, id: RegistrantId) -> CommandId {
        trace!(phase = self.phase.as_str(), %id, "removal queued");
        self.shared.queue_removal(id)
    }

    /// Queue removal of `id` that only happens if `guard` holds at flush time
    pub fn remove_if(&self, id: RegistrantId, guard: impl FnOnce() -> bool + 'static) -> CommandId {
        self.defer(Command::remove_key_if(&self.shared.entries, id, guard))
    }

    /// Queue an arbitrary command for the next flush
    pub fn defer(&self, command: Command) -> CommandId {
        self.shared.commands.borrow_mut().add(command)
    }

    /// Withdraw a queued command before it is applied
    pub fn cancel(&self, id: CommandId) -> bool {
        self.shared.commands.borrow_mut().remove(id)
    }

    pub fn pending_commands(&self) -> usize {
        self.shared.commands.borrow().len()
    }

    /// Drop all pending commands without applying them
    pub fn discard_pending(&self) -> usize {
        let mut commands = self.shared.commands.borrow_mut();
        let discarded = commands.len();
        commands.clear();
        discarded
    }

    pub fn contains(&self, id: RegistrantId) -> bool {
        self.shared.entries.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shared.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.borrow().is_empty()
    }

    /// Registered ids in iteration order
    pub fn ids(&self) -> Vec<RegistrantId> {
        self.shared.entries.borrow().keys().copied().collect()
    }

    /// Handle to the live token registered under `id`
    pub fn token(&self, id: RegistrantId) -> Option<UpdateToken> {
        self.shared.entries.borrow().get(&id).cloned()
    }

    /// Run one pass and then flush pending commands.
    ///
    /// If a callback fails the pass stops there and the flush is skipped;
    /// pending commands stay queued for the next successful tick.
    pub fn tick(&self, now: Seconds) -> Result<TickStats> {
        let mut stats = self.run_pass(now)?;
        stats.applied = self.flush();
        Ok(stats)
    }

    /// Invoke every unpaused, due registrant once without flushing.
    pub fn run_pass(&self, now: Seconds) -> Result<TickStats> {
        if self.in_pass.replace(true) {
            return Err(CadenceError::ReentrantTick(self.phase.as_str()));
        }
        let _pass = PassGuard(&self.in_pass);
        self.invoke_due(now)
    }

    fn invoke_due(&self, now: Seconds) -> Result<TickStats> {
        self.now.set(now);

        // Iterate a snapshot so callbacks may read the live map.
        let snapshot: Vec<UpdateToken> = self.shared.entries.borrow().values().cloned().collect();

        let mut stats = TickStats::default();
        for token in &snapshot {
            if token.is_paused() {
                stats.paused += 1;
                continue;
            }
            if !token.is_due(now) {
                stats.throttled += 1;
                continue;
            }

            trace!(phase = self.phase.as_str(), id = %token.id(), now, "invoke");
            if let Err(source) = token.invoke(self, now) {
                warn!(
                    phase = self.phase.as_str(),
                    id = %token.id(),
                    error = %source,
                    pending = self.pending_commands(),
                    "tick aborted"
                );
                return Err(CadenceError::TickAborted {
                    phase: self.phase.as_str(),
                    id: token.id(),
                    source: Box::new(source),
                });
            }
            stats.invoked += 1;
        }
        Ok(stats)
    }

    /// Apply pending commands in the order they were queued.
    ///
    /// Commands queued while the flush runs wait for the next one. Calling
    /// this from inside a pass does nothing.
    pub fn flush(&self) -> usize {
        if self.in_pass.get() {
            warn!(phase = self.phase.as_str(), "flush requested mid-pass; ignored");
            return 0;
        }

        let mut batch = self.shared.commands.borrow_mut().take();
        let applied = batch.process();
        if applied > 0 {
            debug!(
                phase = self.phase.as_str(),
                applied,
                registrants = self.len(),
                "flushed deferred commands"
            );
        }
        applied
    }
}

/// Clears the in-pass flag however the pass ends, including by unwinding
struct PassGuard<'a>(&'a Cell<bool>);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Guard for a registration.
///
/// Dropping it, or calling [`unregister`](Self::unregister), queues removal of
/// the registrant from the scheduler that issued it. The removal only takes
/// effect if the entry under that id is still the token this guard registered,
/// so a guard whose registration lost to an existing entry, or whose entry was
/// replaced, leaves the live entry alone. Does nothing if the scheduler is gone.
#[must_use = "dropping a Registration queues the registrant's removal"]
#[derive(Debug)]
pub struct Registration {
    id: RegistrantId,
    phase: Phase,
    shared: Weak<Shared>,
    token: TokenRef,
    armed: bool,
}

impl Registration {
    pub fn id(&self) -> RegistrantId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once a flush has put this guard's token in the scheduler, and
    /// until it is removed. A duplicate registration never becomes live.
    pub fn is_registered(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.holds(self.id, &self.token))
    }

    /// Queue removal now
    pub fn unregister(mut self) {
        self.release();
    }

    /// Give up the guard and leave the registrant registered
    pub fn detach(mut self) -> RegistrantId {
        self.armed = false;
        self.id
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.armed, false) {
            return;
        }
        if let Some(shared) = self.shared.upgrade() {
            shared.queue_release(self.id, self.token.clone());
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickable::{Registrant, Tickable};
    use crate::token::TokenConfig;

    type Log = Rc<RefCell<Vec<(&'static str, Seconds)>>>;

    /// Records every invocation into a shared log
    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Tickable for Recorder {
        fn update(&mut self, scheduler: &PhaseScheduler) -> Result<()> {
            self.log.borrow_mut().push((self.name, scheduler.now()));
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Registrant<Recorder> {
        Registrant::new(Recorder {
            name,
            log: Rc::clone(log),
        })
    }

    fn token(reg: &Registrant<impl Tickable + 'static>, cfg: TokenConfig) -> UpdateToken {
        UpdateToken::new(reg, cfg).unwrap()
    }

    fn names(log: &Log) -> Vec<&'static str> {
        log.borrow().iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn test_register_is_deferred_until_flush() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);

        sched.register_detached(token(&a, TokenConfig::every_tick()));
        assert!(!sched.contains(a.id()));
        assert_eq!(sched.pending_commands(), 1);

        assert_eq!(sched.flush(), 1);
        assert!(sched.contains(a.id()));
        assert_eq!(sched.pending_commands(), 0);
    }

    #[test]
    fn test_zero_interval_runs_every_tick() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let _reg = sched.register(token(&a, TokenConfig::every_tick()));
        sched.flush();

        let stats = sched.tick(0.0).unwrap();
        assert_eq!(stats.invoked, 1);
        assert_eq!(sched.token(a.id()).unwrap().last_update(), 0.0);

        sched.tick(0.0).unwrap();
        assert_eq!(names(&log), vec!["a", "a"]);
    }

    #[test]
    fn test_interval_throttles_until_elapsed() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let b = recorder("b", &log);
        let _reg = sched.register(token(&b, TokenConfig::every(5.0)));
        sched.flush();

        let stats = sched.tick(3.0).unwrap();
        assert_eq!(stats.throttled, 1);
        assert!(log.borrow().is_empty());
        assert_eq!(sched.token(b.id()).unwrap().last_update(), 0.0);

        sched.tick(5.0).unwrap();
        assert_eq!(*log.borrow(), vec![("b", 5.0)]);
        assert_eq!(sched.token(b.id()).unwrap().last_update(), 5.0);
    }

    #[test]
    fn test_late_tick_snaps_without_catch_up() {
        let sched = PhaseScheduler::new(Phase::FixedUpdate);
        let log = Log::default();
        let b = recorder("b", &log);
        sched.register_detached(token(&b, TokenConfig::every(1.0)));
        sched.flush();

        // Three intervals missed; only one invocation, timestamp snapped.
        sched.tick(3.5).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(sched.token(b.id()).unwrap().last_update(), 3.5);

        sched.tick(4.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
        sched.tick(4.5).unwrap();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_paused_token_is_skipped_and_keeps_timestamp() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let c = recorder("c", &log);
        let handle = token(&c, TokenConfig::every(1.0));
        let _reg = sched.register(handle.clone());
        sched.flush();

        sched.tick(1.0).unwrap();
        handle.pause();
        let stats = sched.tick(5.0).unwrap();
        assert_eq!(stats.paused, 1);
        assert_eq!(handle.last_update(), 1.0);
        assert_eq!(log.borrow().len(), 1);

        handle.resume();
        sched.tick(6.0).unwrap();
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(handle.last_update(), 6.0);
    }

    #[test]
    fn test_duplicate_registration_keeps_original_token() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let original = token(&a, TokenConfig::every(2.0));
        sched.register_detached(original.clone());
        sched.flush();
        sched.tick(2.0).unwrap();

        sched.register_detached(token(&a, TokenConfig::every(0.0).last_update(99.0)));
        sched.flush();

        let live = sched.token(a.id()).unwrap();
        assert!(live.same_token(&original));
        assert_eq!(live.last_update(), 2.0);
        assert_eq!(live.interval(), 2.0);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let sched = PhaseScheduler::new(Phase::LateUpdate);
        sched.remove(RegistrantId::new());
        assert_eq!(sched.tick(0.0).unwrap().applied, 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_additions_during_pass_wait_for_next_tick() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let child = recorder("child", &log);
        let child_token = RefCell::new(Some(token(&child, TokenConfig::every_tick())));
        let log2 = Rc::clone(&log);
        let parent = Registrant::new(move |s: &PhaseScheduler| -> Result<()> {
            log2.borrow_mut().push(("parent", s.now()));
            if let Some(t) = child_token.borrow_mut().take() {
                s.register_detached(t);
            }
            Ok(())
        });
        sched.register_detached(token(&parent, TokenConfig::every_tick()));
        sched.flush();

        sched.tick(0.0).unwrap();
        assert_eq!(names(&log), vec!["parent"]);
        assert!(sched.contains(child.id()));

        // The child was created first, so it sorts ahead of the parent.
        sched.tick(1.0).unwrap();
        assert_eq!(names(&log), vec!["parent", "child", "parent"]);
    }

    #[test]
    fn test_removal_during_pass_still_invokes_this_tick() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let target = Rc::new(Cell::new(None));
        let t = Rc::clone(&target);
        let killer = Registrant::new(move |s: &PhaseScheduler| -> Result<()> {
            if let Some(id) = t.get() {
                s.remove(id);
            }
            Ok(())
        });
        // Created after the killer, so it is iterated after it.
        let victim = recorder("victim", &log);
        let victim_id = victim.id();
        target.set(Some(victim_id));
        sched.register_detached(token(&killer, TokenConfig::every_tick()));
        sched.register_detached(token(&victim, TokenConfig::every_tick()));
        sched.flush();
        assert!(killer.id() < victim.id());

        sched.tick(0.0).unwrap();
        assert_eq!(names(&log), vec!["victim"]);
        assert!(!sched.contains(victim_id));

        sched.tick(1.0).unwrap();
        assert_eq!(names(&log), vec!["victim"]);
    }

    #[test]
    fn test_self_removal_applies_after_pass() {
        let sched = PhaseScheduler::new(Phase::Update);
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let id_slot = Rc::new(Cell::new(None));
        let slot = Rc::clone(&id_slot);
        let a = Registrant::new(move |s: &PhaseScheduler| -> Result<()> {
            c.set(c.get() + 1);
            if let Some(id) = slot.get() {
                s.remove(id);
            }
            Ok(())
        });
        id_slot.set(Some(a.id()));
        sched.register_detached(token(&a, TokenConfig::every_tick()));
        sched.flush();

        let stats = sched.tick(0.0).unwrap();
        assert_eq!(stats.invoked, 1);
        assert_eq!(stats.applied, 1);
        assert!(!sched.contains(a.id()));

        sched.tick(1.0).unwrap();
        sched.tick(2.0).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failure_aborts_pass_and_defers_flush() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let newcomer = recorder("newcomer", &log);
        let pending = RefCell::new(Some(token(&newcomer, TokenConfig::every_tick())));
        let fail = Rc::new(Cell::new(true));
        let f = Rc::clone(&fail);

        let first = Registrant::new(move |s: &PhaseScheduler| -> Result<()> {
            if let Some(t) = pending.borrow_mut().take() {
                s.register_detached(t);
            }
            Ok(())
        });
        let failing = Registrant::new(move |_: &PhaseScheduler| -> Result<()> {
            if f.get() {
                return Err(CadenceError::registrant("boom"));
            }
            Ok(())
        });
        let last = recorder("last", &log);

        sched.register_detached(token(&first, TokenConfig::every_tick()));
        sched.register_detached(token(&failing, TokenConfig::every_tick()));
        sched.register_detached(token(&last, TokenConfig::every_tick()));
        sched.flush();

        let err = sched.tick(0.0).unwrap_err();
        assert_eq!(err.aborted_by(), Some(failing.id()));
        // "last" was never reached and the newcomer is still queued.
        assert!(log.borrow().is_empty());
        assert!(!sched.contains(newcomer.id()));
        assert_eq!(sched.pending_commands(), 1);

        fail.set(false);
        let stats = sched.tick(1.0).unwrap();
        assert_eq!(stats.applied, 1);
        assert!(sched.contains(newcomer.id()));
        assert_eq!(names(&log), vec!["last"]);
    }

    #[test]
    fn test_registration_guard_removes_on_drop() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let reg = sched.register(token(&a, TokenConfig::every_tick()));
        assert_eq!(reg.id(), a.id());
        assert_eq!(reg.phase(), Phase::Update);
        sched.flush();

        drop(reg);
        assert!(sched.contains(a.id()));
        sched.tick(0.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert!(!sched.contains(a.id()));
    }

    #[test]
    fn test_stale_guard_leaves_replacement() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let reg = sched.register(token(&a, TokenConfig::every_tick()));
        sched.flush();
        assert!(reg.is_registered());

        // Swap in a fresh token under the same id.
        sched.remove(a.id());
        let replacement = token(&a, TokenConfig::every(2.0));
        sched.register_detached(replacement.clone());
        sched.flush();
        assert!(!reg.is_registered());

        drop(reg);
        sched.flush();
        let live = sched.token(a.id()).unwrap();
        assert!(live.same_token(&replacement));
    }

    #[test]
    fn test_duplicate_guard_does_not_remove_original() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let original = sched.register(token(&a, TokenConfig::every_tick()));
        sched.flush();
        let duplicate = sched.register(token(&a, TokenConfig::every_tick()));
        sched.flush();
        assert!(original.is_registered());
        assert!(!duplicate.is_registered());

        duplicate.unregister();
        sched.tick(0.0).unwrap();
        assert!(sched.contains(a.id()));

        original.unregister();
        sched.flush();
        assert!(!sched.contains(a.id()));
    }

    #[test]
    fn test_panicking_callback_leaves_scheduler_usable() {
        let sched = PhaseScheduler::new(Phase::Update);
        let explode = Rc::new(Cell::new(true));
        let hits = Rc::new(Cell::new(0u32));
        let (e, h) = (Rc::clone(&explode), Rc::clone(&hits));
        let a = Registrant::new(move |_: &PhaseScheduler| -> Result<()> {
            if e.get() {
                panic!("callback blew up");
            }
            h.set(h.get() + 1);
            Ok(())
        });
        sched.register_detached(token(&a, TokenConfig::every_tick()));
        sched.flush();

        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sched.tick(0.0)));
        assert!(caught.is_err());

        explode.set(false);
        sched.remove(a.id());
        let stats = sched.tick(1.0).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(stats.applied, 1);
        assert!(!sched.contains(a.id()));
    }

    #[test]
    fn test_detached_guard_leaves_entry() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        let id = sched.register(token(&a, TokenConfig::every_tick())).detach();
        assert_eq!(id, a.id());
        sched.flush();
        assert_eq!(sched.pending_commands(), 0);
        assert!(sched.contains(id));

        sched.remove(id);
        sched.flush();
        assert!(!sched.contains(id));
    }

    #[test]
    fn test_guard_outliving_scheduler_is_harmless() {
        let log = Log::default();
        let a = recorder("a", &log);
        let reg = {
            let sched = PhaseScheduler::new(Phase::Update);
            sched.register(token(&a, TokenConfig::every_tick()))
        };
        reg.unregister();
    }

    #[test]
    fn test_guarded_remove_and_cancel() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let a = recorder("a", &log);
        sched.register_detached(token(&a, TokenConfig::every_tick()));
        sched.flush();

        sched.remove_if(a.id(), || false);
        sched.flush();
        assert!(sched.contains(a.id()));

        let queued = sched.remove(a.id());
        assert!(sched.cancel(queued));
        sched.flush();
        assert!(sched.contains(a.id()));

        sched.remove(a.id());
        assert_eq!(sched.discard_pending(), 1);
        sched.flush();
        assert!(sched.contains(a.id()));
    }

    #[test]
    fn test_nested_tick_is_rejected() {
        let sched = PhaseScheduler::new(Phase::Update);
        let nested = Rc::new(RefCell::new(None));
        let n = Rc::clone(&nested);
        let a = Registrant::new(move |s: &PhaseScheduler| -> Result<()> {
            let inner = s.tick(s.now());
            *n.borrow_mut() = Some(matches!(inner, Err(CadenceError::ReentrantTick(_))));
            assert_eq!(s.flush(), 0);
            Ok(())
        });
        sched.register_detached(token(&a, TokenConfig::every_tick()));
        sched.flush();

        sched.tick(0.0).unwrap();
        assert_eq!(*nested.borrow(), Some(true));
    }

    #[test]
    fn test_iteration_order_is_stable_by_id() {
        let sched = PhaseScheduler::new(Phase::Update);
        let log = Log::default();
        let x = recorder("x", &log);
        let y = recorder("y", &log);
        let z = recorder("z", &log);
        // Registration order differs from identity order.
        for reg in [&z, &x, &y] {
            sched.register_detached(token(reg, TokenConfig::every_tick()));
        }
        sched.flush();
        assert_eq!(sched.ids(), vec![x.id(), y.id(), z.id()]);

        sched.tick(0.0).unwrap();
        sched.tick(1.0).unwrap();
        assert_eq!(names(&log), vec!["x", "y", "z", "x", "y", "z"]);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = TickStats::default();
        total.merge(TickStats { invoked: 2, paused: 1, throttled: 0, applied: 3 });
        total.merge(TickStats { invoked: 1, paused: 0, throttled: 4, applied: 0 });
        assert_eq!(total, TickStats { invoked: 3, paused: 1, throttled: 4, applied: 3 });
    }
}
