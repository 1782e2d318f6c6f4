//! Deferred commands
//!
//! A [`Command`] captures a mutation and applies it later, when the
//! [`CommandBuffer`](crate::CommandBuffer) holding it is flushed. The
//! constructors below cover the container shapes the schedulers need:
//! sequences shared as `Rc<RefCell<Vec<T>>>` and keyed stores shared as
//! `Rc<RefCell<M>>` where `M: KeyedStore`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

/// Anything a command buffer can replay.
pub trait Apply {
    /// Consume the command and perform its mutation.
    fn apply(self);
}

/// A deferred mutation: a captured action applied exactly once.
pub struct Command {
    label: &'static str,
    action: Box<dyn FnOnce()>,
}

impl Command {
    /// Wrap an arbitrary closure
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self::labeled("closure", action)
    }

    /// Wrap a closure with a label shown in `Debug` output
    pub fn labeled(label: &'static str, action: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            action: Box::new(action),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Append `value` to the end of `target`
    pub fn push<T: 'static>(target: &Rc<RefCell<Vec<T>>>, value: T) -> Self {
        let target = Rc::clone(target);
        Self::labeled("push", move || target.borrow_mut().push(value))
    }

    /// Insert `value` at `index`. An index past the end appends.
    pub fn insert_at<T: 'static>(target: &Rc<RefCell<Vec<T>>>, index: usize, value: T) -> Self {
        let target = Rc::clone(target);
        Self::labeled("insert_at", move || {
            let mut items = target.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, value);
        })
    }

    /// Remove the first element equal to `value`, if any
    pub fn remove_item<T: PartialEq + 'static>(target: &Rc<RefCell<Vec<T>>>, value: T) -> Self {
        let target = Rc::clone(target);
        Self::labeled("remove_item", move || {
            let removed = {
                let mut items = target.borrow_mut();
                let pos = items.iter().position(|item| *item == value);
                pos.map(|pos| items.remove(pos))
            };
            drop(removed);
        })
    }

    /// Associate `value` with `key`. No-op if the key is already present.
    pub fn insert_key<M>(target: &Rc<RefCell<M>>, key: M::Key, value: M::Value) -> Self
    where
        M: KeyedStore + 'static,
        M::Key: 'static,
        M::Value: 'static,
    {
        let target = Rc::clone(target);
        Self::labeled("insert_key", move || {
            let mut store = target.borrow_mut();
            if !store.has_key(&key) {
                store.put(key, value);
            }
        })
    }

    /// Remove the entry under `key`. No-op if absent.
    pub fn remove_key<M>(target: &Rc<RefCell<M>>, key: M::Key) -> Self
    where
        M: KeyedStore + 'static,
        M::Key: 'static,
    {
        let target = Rc::clone(target);
        Self::labeled("remove_key", move || {
            // The removed value is dropped after the borrow ends so its
            // destructor may queue further commands.
            let removed = target.borrow_mut().take(&key);
            drop(removed);
        })
    }

    /// Remove the entry under `key` only if `guard` holds when the command
    /// is applied.
    pub fn remove_key_if<M>(
        target: &Rc<RefCell<M>>,
        key: M::Key,
        guard: impl FnOnce() -> bool + 'static,
    ) -> Self
    where
        M: KeyedStore + 'static,
        M::Key: 'static,
    {
        let target = Rc::clone(target);
        Self::labeled("remove_key_if", move || {
            if !guard() {
                return;
            }
            let removed = target.borrow_mut().take(&key);
            drop(removed);
        })
    }

    /// Append `value` to the sequence stored under `key`. No-op if absent.
    pub fn push_to_key<M, T>(target: &Rc<RefCell<M>>, key: M::Key, value: T) -> Self
    where
        M: KeyedStore<Value = Vec<T>> + 'static,
        M::Key: 'static,
        T: 'static,
    {
        let target = Rc::clone(target);
        Self::labeled("push_to_key", move || {
            if let Some(items) = target.borrow_mut().entry_mut(&key) {
                items.push(value);
            }
        })
    }
}

impl Apply for Command {
    fn apply(self) {
        (self.action)()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("label", &self.label).finish()
    }
}

/// Keyed container that keyed commands can target.
pub trait KeyedStore {
    type Key;
    type Value;

    fn has_key(&self, key: &Self::Key) -> bool;
    fn put(&mut self, key: Self::Key, value: Self::Value);
    fn take(&mut self, key: &Self::Key) -> Option<Self::Value>;
    fn entry_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;
}

impl<K: Eq + Hash, V, S: BuildHasher> KeyedStore for HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn has_key(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn take(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn entry_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }
}

impl<K: Ord, V> KeyedStore for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn has_key(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn take(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn entry_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }
}
