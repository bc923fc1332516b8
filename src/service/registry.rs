// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered registry of configuration sources.
//!
//! Registration is append-then-resort: sources are kept in a strict total
//! order with ordinal descending as the primary key and name ascending as the
//! deterministic tie-break. The order is fixed for the lifetime of the
//! configuration built from the registry.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigSource;
use std::sync::Arc;

/// A registered source together with its resolved identity.
pub struct SourceHandle {
    name: String,
    ordinal: i32,
    source: Arc<dyn ConfigSource>,
}

impl SourceHandle {
    /// The name of the underlying source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordinal assigned at registration time.
    pub fn ordinal(&self) -> i32 {
        self.ordinal
    }

    pub(crate) fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }
}

/// Holds registered sources in priority order.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::service::SourceRegistry;
/// use std::sync::Arc;
///
/// # fn main() -> treecfg::domain::Result<()> {
/// let mut registry = SourceRegistry::new();
/// registry.register(Arc::new(MapSource::new("defaults")), Some(10))?;
/// registry.register(Arc::new(MapSource::new("overrides")), Some(500))?;
///
/// let names: Vec<_> = registry.handles().iter().map(|h| h.name()).collect();
/// assert_eq!(names, ["overrides", "defaults"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SourceRegistry {
    handles: Vec<SourceHandle>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        SourceRegistry { handles: Vec::new() }
    }

    /// Registers a source, assigning the explicit ordinal or falling back to
    /// the source's own default.
    ///
    /// Fails with [`ConfigError::AmbiguousSource`] if a source with the same
    /// name and the same ordinal is already registered, since the pair no
    /// longer identifies a unique position in the priority order.
    pub fn register(&mut self, source: Arc<dyn ConfigSource>, ordinal: Option<i32>) -> Result<()> {
        let name = source.name().to_string();
        let ordinal = ordinal.unwrap_or_else(|| source.default_ordinal());

        if self
            .handles
            .iter()
            .any(|h| h.ordinal == ordinal && h.name == name)
        {
            return Err(ConfigError::AmbiguousSource { name, ordinal });
        }

        tracing::debug!(source = %name, ordinal, "registering configuration source");
        self.handles.push(SourceHandle { name, ordinal, source });
        self.handles
            .sort_by(|a, b| b.ordinal.cmp(&a.ordinal).then_with(|| a.name.cmp(&b.name)));
        Ok(())
    }

    /// Returns the registered sources in priority order, highest first.
    pub fn handles(&self) -> &[SourceHandle] {
        &self.handles
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no source has been registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
