// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical configuration key type.
//!
//! This module provides the `Key` type, a newtype wrapper around `String` that
//! represents a position in the dotted configuration hierarchy. The empty key
//! is the root of the tree.

use std::fmt;

/// A type-safe wrapper for hierarchical configuration keys.
///
/// A `Key` is a dotted path such as `server.tls.port`. The empty string is the
/// root of the configuration tree. Keys are cheap to clone and compare, and
/// provide the path arithmetic the resolution engine needs: segment access,
/// child/parent navigation and prefix tests.
///
/// # Examples
///
/// ```
/// use treecfg::domain::Key;
///
/// let key = Key::from("server.port");
/// assert_eq!(key.name(), "port");
/// assert_eq!(key.parent(), Some(Key::from("server")));
/// assert!(Key::from("server").covers("server.port"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Returns the root key (the empty path).
    pub fn root() -> Self {
        Key(String::new())
    }

    /// Creates a new `Key` from a `String`.
    pub fn new(key: String) -> Self {
        Key(key)
    }

    /// Returns the fully qualified key as a string slice.
    ///
    /// The root key returns the empty string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the root key.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of this node - the last element of the fully qualified key.
    ///
    /// For `server.port` this returns `port`. The root key has no name and
    /// returns the empty string.
    pub fn name(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    /// Returns the dot-separated segments of this key, empty for the root.
    pub fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.0.split('.').collect()
        }
    }

    /// Returns the key for a direct child of this node.
    pub fn child(&self, name: &str) -> Key {
        self.join(name)
    }

    /// Appends a relative dotted path to this key.
    ///
    /// An empty path returns this key unchanged, so `get("")` on a node is the
    /// node itself.
    pub fn join(&self, path: &str) -> Key {
        if path.is_empty() {
            self.clone()
        } else if self.is_root() {
            Key(path.to_string())
        } else {
            Key(format!("{}.{}", self.0, path))
        }
    }

    /// Returns the parent key, or `None` for the root.
    pub fn parent(&self) -> Option<Key> {
        if self.is_root() {
            None
        } else {
            match self.0.rsplit_once('.') {
                Some((prefix, _)) => Some(Key(prefix.to_string())),
                None => Some(Key::root()),
            }
        }
    }

    /// Returns `true` if `key` is this node or lies underneath it.
    ///
    /// The root covers every key.
    pub fn covers(&self, key: &str) -> bool {
        if self.is_root() {
            return true;
        }
        key == self.0 || (key.len() > self.0.len() && key.starts_with(&self.0) && key.as_bytes()[self.0.len()] == b'.')
    }

    /// Strips this key from a fully qualified key it covers.
    ///
    /// Returns the relative remainder, the empty string when `key` equals this
    /// key, or `None` when `key` is not covered. The remainder borrows from
    /// `key`, not from this key.
    pub fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        if self.is_root() {
            return Some(key);
        }
        if key == self.0 {
            return Some("");
        }
        key.strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
    }

    /// Derives a config name from a member identifier.
    ///
    /// Inserts `-` before internal uppercase boundaries, maps `_` to `-` and
    /// lowercases the result, so `maxRetries` and `max_retries` both become
    /// `max-retries`.
    pub fn kebab(ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 4);
        for (i, c) in ident.chars().enumerate() {
            if c == '_' {
                out.push('-');
            } else if c.is_uppercase() {
                if i > 0 {
                    out.push('-');
                }
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
