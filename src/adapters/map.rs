// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory map-backed configuration source adapter.
//!
//! The workhorse source for tests and programmatic configuration, and the
//! reference implementation of the mutation contract: every mutator reports
//! the delta to the installed listener as a [`ChangeSet`].

use crate::ports::{ChangeAction, ChangeListener, ChangeSet, ConfigSource};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

/// Mutation batches queued for delivery, plus whether a frame is already
/// draining the queue.
struct Pending {
    queue: VecDeque<ChangeSet>,
    delivering: bool,
}

/// A mutable in-memory configuration source.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::ports::ConfigSource;
///
/// let source = MapSource::new("mem")
///     .with_entry("server.host", "localhost")
///     .with_entry("server.port", "7001");
///
/// assert_eq!(source.value("server.port").as_deref(), Some("7001"));
/// assert_eq!(source.keys().len(), 2);
/// ```
pub struct MapSource {
    name: String,
    entries: Mutex<BTreeMap<String, String>>,
    listener: Mutex<Option<ChangeListener>>,
    pending: Mutex<Pending>,
}

impl MapSource {
    /// Creates an empty source with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        MapSource {
            name: name.into(),
            entries: Mutex::new(BTreeMap::new()),
            listener: Mutex::new(None),
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                delivering: false,
            }),
        }
    }

    /// Adds an entry during construction, before any listener exists.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        lock_unpoisoned(&self.entries).insert(key.into(), value.into());
        self
    }

    /// Sets a key, reporting the change to the listener.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let mut changes = ChangeSet::new();
        changes.insert(key, Some(value));
        self.apply(changes);
    }

    /// Removes a key, reporting the change to the listener.
    pub fn remove(&self, key: impl Into<String>) {
        let mut changes = ChangeSet::new();
        changes.insert(key.into(), None);
        self.apply(changes);
    }

    /// Applies a batch of additions, updates and removals atomically and
    /// reports the whole batch as one change event.
    pub fn apply(&self, changes: ChangeSet) {
        {
            let mut entries = lock_unpoisoned(&self.entries);
            for (key, value) in &changes {
                match value {
                    Some(v) => {
                        entries.insert(key.clone(), v.clone());
                    }
                    None => {
                        entries.remove(key);
                    }
                }
            }
        }
        self.fire(changes);
    }

    /// Queues a batch and drains the queue unless a frame further up the
    /// stack is already doing so. The listener is never invoked with a source
    /// lock held, so it may mutate this source re-entrantly; such mutations
    /// are delivered by the outermost frame after the current batch.
    fn fire(&self, changes: ChangeSet) {
        {
            let mut pending = lock_unpoisoned(&self.pending);
            pending.queue.push_back(changes);
            if pending.delivering {
                return;
            }
            pending.delivering = true;
        }
        loop {
            let batch = {
                let mut pending = lock_unpoisoned(&self.pending);
                match pending.queue.pop_front() {
                    Some(batch) => batch,
                    None => {
                        pending.delivering = false;
                        return;
                    }
                }
            };
            let listener = lock_unpoisoned(&self.listener).take();
            let Some(mut listener) = listener else {
                continue;
            };
            let action = listener(batch);
            if action == ChangeAction::Continue {
                let mut guard = lock_unpoisoned(&self.listener);
                // keep a listener installed during the call, unless stopped
                if guard.is_none() {
                    *guard = Some(listener);
                }
            }
        }
    }
}

/// A poisoned source mutex only records that a panic unwound through it; the
/// data is still consistent, so take the guard anyway.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, key: &str) -> Option<String> {
        lock_unpoisoned(&self.entries).get(key).cloned()
    }

    fn keys(&self) -> BTreeSet<String> {
        lock_unpoisoned(&self.entries).keys().cloned().collect()
    }

    fn subscribe(&self, listener: ChangeListener) -> bool {
        *lock_unpoisoned(&self.listener) = Some(listener);
        true
    }
}
