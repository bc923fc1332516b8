// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolved configuration value record.
//!
//! This module provides the `ConfigValue` type, the immutable record a
//! snapshot produces for a leaf lookup: the key, the value after placeholder
//! expansion, the raw value before expansion, and the name of the source that
//! supplied it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable record describing one resolved configuration value.
///
/// Produced on demand by snapshot lookups; it is not persisted. The `value`
/// is the string after `${other.key}` expansion, `raw` is the string exactly
/// as the winning source supplied it, and `source` names that source for
/// diagnostics.
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
///     .with_source(Arc::new(MapSource::new("mem").with_entry("server.host", "localhost")))
///     .build()?;
///
/// let value = config.get("server.host").value()?.unwrap();
/// assert_eq!(value.key(), "server.host");
/// assert_eq!(value.value(), "localhost");
/// assert_eq!(value.source(), "mem");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    key: String,
    value: String,
    raw: String,
    source: String,
}

impl ConfigValue {
    /// Creates a new resolved value record.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        raw: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        ConfigValue {
            key: key.into(),
            value: value.into(),
            raw: raw.into(),
            source: source.into(),
        }
    }

    /// The fully qualified key this value was resolved for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The resolved value, after placeholder expansion.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The raw value, before placeholder expansion.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The name of the source that supplied the value.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consumes the record and returns the resolved value.
    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigValue {
        ConfigValue::new("server.url", "http://localhost:8080", "http://${server.host}:8080", "mem")
    }

    #[test]
    fn test_accessors() {
        let value = sample();
        assert_eq!(value.key(), "server.url");
        assert_eq!(value.value(), "http://localhost:8080");
        assert_eq!(value.raw(), "http://${server.host}:8080");
        assert_eq!(value.source(), "mem");
    }

    #[test]
    fn test_display_uses_resolved_value() {
        assert_eq!(format!("{}", sample()), "http://localhost:8080");
    }

    #[test]
    fn test_into_value() {
        assert_eq!(sample().into_value(), "http://localhost:8080");
    }

    #[test]
    fn test_as_ref() {
        let value = sample();
        let s: &str = value.as_ref();
        assert_eq!(s, "http://localhost:8080");
    }

    #[test]
    fn test_equality() {
        assert_eq!(sample(), sample());
        let other = ConfigValue::new("k", "v", "v", "s");
        assert_ne!(sample(), other);
    }
}
