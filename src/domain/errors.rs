// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration engine.
//!
//! Absence of a key is never an error in this crate; lookups surface it as
//! `Option::None`. The variants here are the hard failures: conversion,
//! placeholder cycles, ambiguous source identity, mapping failures and
//! source-reported problems. All errors use `thiserror`.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// Marked `#[non_exhaustive]` to allow new variants without breaking callers.
///
/// # Examples
///
/// ```
/// use treecfg::domain::ConfigError;
///
/// fn convert() -> Result<i32, ConfigError> {
///     Err(ConfigError::Conversion {
///         key: "server.port".to_string(),
///         target_type: "i32".to_string(),
///         message: "invalid digit found in string".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A value was present but could not be converted to the requested type,
    /// or no converter is registered for the type.
    #[error("failed to convert configuration value for key '{key}' to type {target_type}: {message}")]
    Conversion {
        /// The key being converted.
        key: String,
        /// The target type name.
        target_type: String,
        /// Why the conversion failed.
        message: String,
    },

    /// Placeholder expansion detected a reference cycle.
    #[error("circular reference while expanding key '{key}': {}", cycle.join(" -> "))]
    CircularReference {
        /// The key whose expansion started the cycle.
        key: String,
        /// The chain of keys forming the cycle.
        cycle: Vec<String>,
    },

    /// Two sources were registered with the same ordinal and the same name,
    /// making their relative priority ambiguous.
    #[error("ambiguous configuration source: '{name}' registered twice with ordinal {ordinal}")]
    AmbiguousSource {
        /// The colliding source name.
        name: String,
        /// The colliding ordinal.
        ordinal: i32,
    },

    /// Object binding failed; carries every missing required path.
    #[error("missing required configuration value(s): {}", missing.join(", "))]
    Mapping {
        /// The fully qualified paths that had no value and no default.
        missing: Vec<String>,
    },

    /// A configuration source reported a problem.
    #[error("configuration source '{source_name}' error: {message}")]
    Source {
        /// The name of the source that encountered the error.
        source_name: String,
        /// The error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Creates a `Conversion` error for the given key and target type.
    pub fn conversion(
        key: impl Into<String>,
        target_type: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        ConfigError::Conversion {
            key: key.into(),
            target_type: target_type.into(),
            message: message.to_string(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
