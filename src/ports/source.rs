// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! This module defines the `ConfigSource` trait, the primary port for feeding
//! raw key/value data into the engine. Any origin of configuration data
//! (in-memory maps, environment variables, remote services, files parsed by
//! external code) implements this trait; the engine treats every source as a
//! flat dotted-key map and never performs I/O itself.

use std::collections::{BTreeMap, BTreeSet};

/// A batch of changed keys reported by a mutable source.
///
/// Keys are absolute dotted keys. `Some(value)` is an addition or update,
/// `None` is a removal.
pub type ChangeSet = BTreeMap<String, Option<String>>;

/// Continuation decision returned by change listeners and subscribers.
///
/// This is the explicit form of the continue/stop boolean: `Continue` keeps
/// the listener registered, `Stop` deregisters it and no further events are
/// delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeAction {
    /// Keep delivering events to this listener.
    Continue,
    /// Deregister this listener; it receives no further events.
    Stop,
}

/// Listener installed into a mutable source by the engine.
///
/// The source invokes it with the batch of keys that changed; the returned
/// [`ChangeAction`] tells the source whether to keep the listener.
pub type ChangeListener = Box<dyn FnMut(ChangeSet) -> ChangeAction + Send>;

/// A trait for configuration sources.
///
/// A source is an immutable value provider from the engine's point of view:
/// the data behind it may change, but such changes are surfaced exclusively
/// through the [`ConfigSource::subscribe`] contract, never observed directly.
/// The engine materializes `keys()` and `value()` into a snapshot at build
/// time.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`.
///
/// # Ordinals
///
/// Every source carries a default ordinal used when the registrant does not
/// supply an explicit one. Higher ordinals win; ties between distinct sources
/// are broken by name, ascending.
///
/// # Examples
///
/// ```
/// use treecfg::ports::ConfigSource;
/// use std::collections::BTreeSet;
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn value(&self, key: &str) -> Option<String> {
///         (key == "app.name").then(|| "demo".to_string())
///     }
///
///     fn keys(&self) -> BTreeSet<String> {
///         BTreeSet::from(["app.name".to_string()])
///     }
/// }
///
/// let source = Fixed;
/// assert_eq!(source.value("app.name").as_deref(), Some("demo"));
/// assert_eq!(source.default_ordinal(), 100);
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns the name of this configuration source.
    ///
    /// The name is used for diagnostics and as the deterministic tie-break
    /// when two sources share an ordinal. It should be short and descriptive,
    /// like `env` or `mem`.
    fn name(&self) -> &str;

    /// Retrieves the raw value for the given absolute dotted key.
    ///
    /// Returns `None` when this source does not define the key. Sources that
    /// hit transient trouble should report the key as absent rather than
    /// panicking; hard failures belong in the construction of the source.
    fn value(&self, key: &str) -> Option<String>;

    /// Returns every key this source currently defines.
    ///
    /// Tree-shaped backends flatten their hierarchy into dotted keys here, so
    /// the engine can treat flat and nested sources uniformly.
    fn keys(&self) -> BTreeSet<String>;

    /// The ordinal used when no explicit ordinal is given at registration.
    ///
    /// Higher values take precedence. Defaults to 100.
    fn default_ordinal(&self) -> i32 {
        100
    }

    /// Installs a change listener into this source.
    ///
    /// Returns `true` if the source supports mutation and will invoke the
    /// listener with a [`ChangeSet`] whenever its data changes. The default
    /// implementation drops the listener and returns `false` (static source).
    fn subscribe(&self, listener: ChangeListener) -> bool {
        drop(listener);
        false
    }
}
