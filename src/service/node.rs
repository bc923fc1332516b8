// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Config` node facade and its builder.
//!
//! A `Config` identifies a position in the hierarchical key space by its
//! fully qualified key plus a reference to the snapshot it was captured
//! against. Nodes are cheap to clone and keep observing the snapshot in
//! effect when their root was built; source mutations never retroactively
//! change values already visible through a node. The new state is delivered
//! only through [`Config::on_change`] callbacks.

use crate::domain::{Key, Result};
use crate::domain::ConfigValue;
use crate::mapping::{self, BoundNode, MappingDescriptor};
use crate::ports::{ChangeAction, ConfigSource, Converter, StringConverter};
use crate::service::converters::{BoxedValue, ConverterRegistry};
use crate::service::notify::ChangeHub;
use crate::service::registry::SourceRegistry;
use crate::service::resolver::{self, Resolution};
use crate::service::snapshot::Snapshot;
use arc_swap::ArcSwap;
use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// State shared by every node of one configuration instance.
pub(crate) struct Shared {
    pub(crate) registry: SourceRegistry,
    pub(crate) converters: ConverterRegistry,
    /// The snapshot mutations are applied against; nodes hold their own
    /// captured `Arc<Snapshot>` and never read this on the lookup path.
    pub(crate) current: ArcSwap<Snapshot>,
    pub(crate) hub: ChangeHub,
}

/// A node in the merged configuration tree.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::service::Config;
/// use std::sync::Arc;
///
/// # fn main() -> treecfg::domain::Result<()> {
/// let config = Config::builder()
///     .with_source(Arc::new(
///         MapSource::new("mem")
///             .with_entry("server.host", "localhost")
///             .with_entry("server.port", "7001"),
///     ))
///     .build()?;
///
/// let server = config.get("server");
/// assert_eq!(server.get("host").as_string()?.as_deref(), Some("localhost"));
/// assert_eq!(server.get("port").as_type::<u16>()?, Some(7001));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Config {
    shared: Arc<Shared>,
    snapshot: Arc<Snapshot>,
    key: Key,
}

impl Config {
    /// Starts building a configuration instance.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub(crate) fn from_parts(shared: Arc<Shared>, snapshot: Arc<Snapshot>, key: Key) -> Self {
        Config {
            shared,
            snapshot,
            key,
        }
    }

    /// Fully qualified key of this node; the root has the empty key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Name of this node - the last element of the fully qualified key.
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Returns the sub-node for a relative dotted path.
    ///
    /// The node always exists as a navigation handle; whether a value or
    /// subtree exists at its position is a separate question answered by
    /// [`Config::exists`] or [`Config::resolve`].
    pub fn get(&self, path: &str) -> Config {
        Config {
            shared: Arc::clone(&self.shared),
            snapshot: Arc::clone(&self.snapshot),
            key: self.key.join(path),
        }
    }

    /// Returns `true` if a value or subtree exists at this node's position.
    pub fn exists(&self) -> bool {
        self.snapshot.contains(&self.key)
    }

    /// Returns `true` if this node resolves directly to a value.
    pub fn is_leaf(&self) -> bool {
        self.snapshot.raw(self.key.as_str()).is_some()
    }

    /// Resolves this node's position: leaf, internal node, or absent.
    pub fn resolve(&self) -> Result<Resolution> {
        resolver::resolve(&self.snapshot, &self.key)
    }

    /// The full resolved value record at this node, if it is a leaf.
    pub fn value(&self) -> Result<Option<ConfigValue>> {
        self.snapshot.value_at(self.key.as_str())
    }

    /// Direct string value of this node, after placeholder expansion.
    pub fn as_string(&self) -> Result<Option<String>> {
        Ok(self.value()?.map(ConfigValue::into_value))
    }

    /// Typed value using the registered converters.
    ///
    /// Returns `Ok(None)` when the node is absent.
    pub fn as_type<T: Send + Sync + 'static>(&self) -> Result<Option<T>> {
        self.shared.converters.convert::<T>(self)
    }

    /// Typed value using an explicit converter, bypassing the registry.
    ///
    /// The converter is only invoked when the node exists.
    pub fn as_with<T>(&self, converter: impl Converter<T>) -> Result<Option<T>> {
        if !self.exists() {
            return Ok(None);
        }
        converter.convert(self).map(Some)
    }

    /// Typed list from the indexed children of this node.
    ///
    /// Elements live under numeric child keys starting at `0`; the sequence
    /// is contiguous and the first gap terminates it. Returns `Ok(None)` when
    /// there is no element at index 0.
    pub fn as_list<T: Send + Sync + 'static>(&self) -> Result<Option<Vec<T>>> {
        let children = self.children();
        let mut items = Vec::new();
        let mut index = 0usize;
        loop {
            let name = index.to_string();
            if !children.iter().any(|c| *c == name) {
                break;
            }
            match self.get(&name).as_type::<T>()? {
                Some(item) => items.push(item),
                None => break,
            }
            index += 1;
        }
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(items))
        }
    }

    /// Names of the direct children of this node, deduplicated across
    /// sources and iterated in priority order.
    pub fn children(&self) -> Vec<String> {
        self.snapshot.children_of(&self.key)
    }

    /// Bulk export of the subtree rooted at this node: fully qualified key
    /// to expanded value.
    pub fn properties(&self) -> Result<BTreeMap<String, String>> {
        self.snapshot.properties_view(&self.key)
    }

    /// The registered sources as `(name, ordinal)` pairs in priority order.
    pub fn sources(&self) -> Vec<(String, i32)> {
        self.shared
            .registry
            .handles()
            .iter()
            .map(|h| (h.name().to_string(), h.ordinal()))
            .collect()
    }

    /// Registers a change callback scoped to this node.
    ///
    /// The callback fires at most once per mutation batch, and only when the
    /// batch touches this node or its subtree. It receives a `Config` bound
    /// to the post-mutation snapshot at this node's key, plus the changed
    /// keys relative to this node (the empty string denotes the node itself).
    /// Returning [`ChangeAction::Stop`] deregisters the subscription.
    ///
    /// The subscription lives for the lifetime of the configuration instance
    /// unless stopped.
    pub fn on_change<F>(&self, callback: F)
    where
        F: FnMut(Config, BTreeSet<String>) -> ChangeAction + Send + 'static,
    {
        self.shared.hub.subscribe(self.key.clone(), callback);
    }

    /// Binds a mapping descriptor at this node, producing a populated
    /// object graph.
    ///
    /// See [`crate::mapping`] for the descriptor model. Fails with an
    /// aggregate [`crate::domain::ConfigError::Mapping`] naming every missing
    /// required path.
    pub fn bind(&self, descriptor: &MappingDescriptor) -> Result<BoundNode> {
        mapping::bind(descriptor, self)
    }

    pub(crate) fn convert_dyn_by(&self, id: TypeId, type_name: &str) -> Result<BoxedValue> {
        self.shared.converters.convert_dyn(id, type_name, self)
    }

    pub(crate) fn convert_raw_dyn_by(
        &self,
        id: TypeId,
        type_name: &str,
        raw: &str,
    ) -> Result<BoxedValue> {
        self.shared
            .converters
            .convert_raw_dyn(id, type_name, self.key.as_str(), raw)
    }
}

/// Builder for a configuration instance.
///
/// Collects sources and converters, then [`ConfigBuilder::build`] registers
/// the sources (assigning ordinals), materializes the initial snapshot and
/// wires change-capable sources into the notification engine.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::service::Config;
/// use std::sync::Arc;
///
/// # fn main() -> treecfg::domain::Result<()> {
/// let config = Config::builder()
///     .with_source_ordinal(Arc::new(MapSource::new("defaults").with_entry("k", "low")), 10)
///     .with_source_ordinal(Arc::new(MapSource::new("overrides").with_entry("k", "high")), 500)
///     .build()?;
///
/// assert_eq!(config.get("k").as_string()?.as_deref(), Some("high"));
/// # Ok(())
/// # }
/// ```
pub struct ConfigBuilder {
    sources: Vec<(Arc<dyn ConfigSource>, Option<i32>)>,
    converters: ConverterRegistry,
}

impl ConfigBuilder {
    /// Creates a builder with the built-in converters pre-registered.
    pub fn new() -> Self {
        ConfigBuilder {
            sources: Vec::new(),
            converters: ConverterRegistry::with_builtins(),
        }
    }

    /// Adds a source using its own default ordinal.
    pub fn with_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.sources.push((source, None));
        self
    }

    /// Adds a source with an explicit ordinal; higher ordinals win.
    pub fn with_source_ordinal(mut self, source: Arc<dyn ConfigSource>, ordinal: i32) -> Self {
        self.sources.push((source, Some(ordinal)));
        self
    }

    /// Adds several sources, each using its own default ordinal.
    pub fn with_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ConfigSource>>,
    {
        for source in sources {
            self.sources.push((source, None));
        }
        self
    }

    /// Registers a whole-node converter for `T` at the given priority.
    pub fn with_converter<T, C>(mut self, priority: i64, converter: C) -> Self
    where
        T: Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        self.converters.register::<T, C>(priority, converter);
        self
    }

    /// Registers a string-only converter for `T` at the given priority.
    pub fn with_str_converter<T, C>(mut self, priority: i64, converter: C) -> Self
    where
        T: Send + Sync + 'static,
        C: StringConverter<T> + 'static,
    {
        self.converters.register_str::<T, C>(priority, converter);
        self
    }

    /// Applies a batch of registrations to the converter registry.
    pub fn with_converters(mut self, configure: impl FnOnce(&mut ConverterRegistry)) -> Self {
        configure(&mut self.converters);
        self
    }

    /// Builds the configuration instance and returns its root node.
    ///
    /// Fails if two sources collide on both name and ordinal.
    pub fn build(self) -> Result<Config> {
        let mut registry = SourceRegistry::new();
        for (source, ordinal) in self.sources {
            registry.register(source, ordinal)?;
        }

        let snapshot = Arc::new(Snapshot::from_registry(&registry));
        let shared = Arc::new(Shared {
            registry,
            converters: self.converters,
            current: ArcSwap::new(Arc::clone(&snapshot)),
            hub: ChangeHub::new(),
        });

        // Wire mutation events from change-capable sources into the hub. The
        // listener holds a Weak so a torn-down instance stops deliveries.
        for handle in shared.registry.handles() {
            let weak = Arc::downgrade(&shared);
            let source_name = handle.name().to_string();
            let supported = handle.source().subscribe(Box::new(move |changes| {
                match weak.upgrade() {
                    Some(shared) => {
                        crate::service::notify::apply_change(&shared, &source_name, changes);
                        ChangeAction::Continue
                    }
                    None => ChangeAction::Stop,
                }
            }));
            if supported {
                tracing::debug!(source = %handle.name(), "source supports change notification");
            }
        }

        Ok(Config {
            shared,
            snapshot,
            key: Key::root(),
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
