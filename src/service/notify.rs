// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification engine.
//!
//! Subscriptions are keyed to a node prefix. When a source reports a batch of
//! changed keys, the engine builds the successor snapshot under the swap
//! lock, atomically publishes it, and then delivers events outside any lock:
//! each active subscription whose scope intersects the batch receives exactly
//! one event carrying a node bound to the new snapshot plus the changed keys
//! relative to its prefix.

use crate::domain::Key;
use crate::ports::{ChangeAction, ChangeSet};
use crate::service::node::{Config, Shared};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Callback = Box<dyn FnMut(Config, BTreeSet<String>) -> ChangeAction + Send>;

struct Subscription {
    prefix: Key,
    callback: Arc<Mutex<Callback>>,
    active: Arc<AtomicBool>,
}

/// Registry of change subscriptions for one configuration instance.
pub(crate) struct ChangeHub {
    subscriptions: Mutex<Vec<Subscription>>,
    /// Serializes snapshot successor construction and publication.
    swap: Mutex<()>,
}

impl ChangeHub {
    pub(crate) fn new() -> Self {
        ChangeHub {
            subscriptions: Mutex::new(Vec::new()),
            swap: Mutex::new(()),
        }
    }

    pub(crate) fn subscribe<F>(&self, prefix: Key, callback: F)
    where
        F: FnMut(Config, BTreeSet<String>) -> ChangeAction + Send + 'static,
    {
        let subscription = Subscription {
            prefix,
            callback: Arc::new(Mutex::new(Box::new(callback))),
            active: Arc::new(AtomicBool::new(true)),
        };
        lock_unpoisoned(&self.subscriptions).push(subscription);
    }

    #[cfg(test)]
    pub(crate) fn active_count(&self) -> usize {
        lock_unpoisoned(&self.subscriptions)
            .iter()
            .filter(|s| s.active.load(Ordering::Acquire))
            .count()
    }
}

/// A poisoned engine mutex only records that a panic unwound through it; the
/// guarded data is still consistent, so take the guard anyway.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Applies a source mutation batch: publishes the successor snapshot and
/// delivers scoped events.
pub(crate) fn apply_change(shared: &Arc<Shared>, source_name: &str, changes: ChangeSet) {
    // Build and publish the successor under the swap lock so concurrent
    // batches serialize; readers never block, they see old or new.
    let new_snapshot = {
        let _guard = lock_unpoisoned(&shared.hub.swap);
        let old = shared.current.load_full();
        let new = Arc::new(old.apply_change(source_name, &changes));
        shared.current.store(Arc::clone(&new));
        new
    };

    let changed: BTreeSet<String> = changes.keys().cloned().collect();

    // Collect matching subscriptions first; callbacks run without any engine
    // lock held so they may re-enter (subscribe, read, navigate).
    let mut deliveries = Vec::new();
    {
        let mut subs = lock_unpoisoned(&shared.hub.subscriptions);
        subs.retain(|s| s.active.load(Ordering::Acquire));
        for sub in subs.iter() {
            let relative = relative_keys(&sub.prefix, &changed);
            if relative.is_empty() {
                continue;
            }
            deliveries.push((
                sub.prefix.clone(),
                Arc::clone(&sub.callback),
                Arc::clone(&sub.active),
                relative,
            ));
        }
    }

    for (prefix, callback, active, relative) in deliveries {
        let node = Config::from_parts(
            Arc::clone(shared),
            Arc::clone(&new_snapshot),
            prefix.clone(),
        );
        let action = match callback.lock() {
            Ok(mut cb) => (cb)(node, relative),
            Err(_) => ChangeAction::Stop,
        };
        if action == ChangeAction::Stop {
            active.store(false, Ordering::Release);
            tracing::debug!(prefix = %prefix, "change subscription stopped");
        }
    }
}

/// Projects a batch of absolute changed keys into a subscription's scope.
///
/// A key inside the prefix is stripped to its relative remainder; the prefix
/// itself, or an ancestor of it, maps to the empty string (the node itself
/// changed). Keys disjoint from the prefix are dropped.
fn relative_keys(prefix: &Key, changed: &BTreeSet<String>) -> BTreeSet<String> {
    let mut relative = BTreeSet::new();
    for key in changed {
        if let Some(rest) = prefix.relative(key) {
            relative.insert(rest.to_string());
        } else if Key::from(key.as_str()).covers(prefix.as_str()) {
            relative.insert(String::new());
        }
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_relative_keys_under_prefix() {
        let rel = relative_keys(&Key::from("group"), &changed(&["group.key-2"]));
        assert_eq!(rel, changed(&["key-2"]));
    }

    #[test]
    fn test_relative_keys_root_sees_absolute() {
        let rel = relative_keys(&Key::root(), &changed(&["group.key-2"]));
        assert_eq!(rel, changed(&["group.key-2"]));
    }

    #[test]
    fn test_relative_keys_disjoint_dropped() {
        let rel = relative_keys(&Key::from("other"), &changed(&["group.key-2"]));
        assert!(rel.is_empty());
    }

    #[test]
    fn test_relative_keys_exact_match_is_node_itself() {
        let rel = relative_keys(&Key::from("group.key-2"), &changed(&["group.key-2"]));
        assert_eq!(rel, changed(&[""]));
    }

    #[test]
    fn test_relative_keys_ancestor_change_covers_node() {
        let rel = relative_keys(&Key::from("group.key-2"), &changed(&["group"]));
        assert_eq!(rel, changed(&[""]));
    }

    #[test]
    fn test_relative_keys_deep_subtree() {
        let rel = relative_keys(&Key::from("a"), &changed(&["a.b.c", "a.d"]));
        assert_eq!(rel, changed(&["b.c", "d"]));
    }

    #[test]
    fn test_lock_unpoisoned_recovers_after_panic() {
        let shared = Arc::new(Mutex::new(vec![1, 2, 3]));
        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(shared.lock().is_err());
        let mut guard = lock_unpoisoned(&shared);
        assert_eq!(guard.as_slice(), [1, 2, 3]);
        guard.push(4);
        drop(guard);
        assert_eq!(lock_unpoisoned(&shared).len(), 4);
    }

    #[test]
    fn test_subscribe_survives_poisoned_subscriptions() {
        let hub = Arc::new(ChangeHub::new());
        let poisoner = Arc::clone(&hub);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.subscriptions.lock().unwrap();
            panic!("poison the subscriptions mutex");
        })
        .join();

        hub.subscribe(Key::from("group"), |_node, _keys| ChangeAction::Continue);
        assert_eq!(hub.active_count(), 1);
    }
}
