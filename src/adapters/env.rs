// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration source adapter.
//!
//! The process environment is captured once at construction; a source never
//! re-reads it. Variable names are mapped into the dotted key space by
//! lowercasing and replacing underscores with dots, so `SERVER_PORT` serves
//! the key `server.port`.

use crate::ports::ConfigSource;
use std::collections::{BTreeMap, BTreeSet};
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// A static configuration source backed by the process environment.
///
/// Environment variables default to ordinal 300, above in-memory and
/// file-derived sources at the default 100, matching the convention that the
/// deployment environment overrides packaged configuration.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::EnvSource;
/// use treecfg::ports::ConfigSource;
///
/// // Capture every variable.
/// let source = EnvSource::new();
/// assert_eq!(source.name(), "env");
/// assert_eq!(source.default_ordinal(), 300);
///
/// // Capture only MYAPP_-prefixed variables, prefix stripped:
/// // MYAPP_SERVER_PORT serves the key server.port.
/// let source = EnvSource::with_prefix("MYAPP_");
/// ```
#[derive(Debug)]
pub struct EnvSource {
    entries: BTreeMap<String, String>,
}

impl EnvSource {
    /// Captures the whole process environment.
    pub fn new() -> Self {
        Self::capture(None)
    }

    /// Captures only variables starting with the given prefix; the prefix is
    /// stripped before key mapping.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::capture(Some(prefix.into()))
    }

    fn capture(prefix: Option<String>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, value) in env::vars() {
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    key_len = key.len(),
                    value_len = value.len(),
                    "skipping oversized environment variable"
                );
                continue;
            }
            let key = match &prefix {
                Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(stripped) => stripped.to_string(),
                    None => continue,
                },
                None => key,
            };
            entries.insert(map_key(&key), value);
        }
        tracing::debug!(count = entries.len(), "captured environment variables");
        EnvSource { entries }
    }
}

/// `SERVER_PORT` becomes `server.port`.
fn map_key(name: &str) -> String {
    name.to_lowercase().replace('_', ".")
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    fn value(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    fn default_ordinal(&self) -> i32 {
        300
    }
}
