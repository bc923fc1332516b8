// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converter trait definitions.
//!
//! Two contracts exist: [`Converter`] sees a whole config node and may inspect
//! its children, while [`StringConverter`] is the restricted fast path that
//! only ever sees the string representation of a leaf. Both are
//! blanket-implemented for plain closures so callers rarely need a named
//! type.

use crate::domain::Result;
use crate::service::Config;

/// Converts a config node into a `T`.
///
/// The engine only invokes a converter for nodes that exist; absence is
/// handled before dispatch and surfaced as `None` to the caller. Failure is
/// signaled with [`crate::domain::ConfigError::Conversion`].
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::service::Config;
/// use treecfg::domain::{ConfigError, Result};
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let config = Config::builder()
///     .with_source(Arc::new(MapSource::new("mem").with_entry("flag", "yes")))
///     .build()?;
///
/// // A closure over the node is a Converter.
/// let flag = config.get("flag").as_with(|node: &Config| {
///     Ok(node.as_string()?.as_deref() == Some("yes"))
/// })?;
/// assert_eq!(flag, Some(true));
/// # Ok(())
/// # }
/// ```
pub trait Converter<T>: Send + Sync {
    /// Produces a `T` from an existing config node.
    fn convert(&self, node: &Config) -> Result<T>;
}

impl<T, F> Converter<T> for F
where
    F: Fn(&Config) -> Result<T> + Send + Sync,
{
    fn convert(&self, node: &Config) -> Result<T> {
        self(node)
    }
}

/// Converts the raw string form of a leaf into a `T`.
///
/// A string converter never sees the node, only the resolved string value.
/// Errors produced here may leave the key empty; the registry fills in the
/// key of the node being converted.
pub trait StringConverter<T>: Send + Sync {
    /// Produces a `T` from the resolved string value of a leaf.
    fn convert_str(&self, raw: &str) -> Result<T>;
}

impl<T, F> StringConverter<T> for F
where
    F: Fn(&str) -> Result<T> + Send + Sync,
{
    fn convert_str(&self, raw: &str) -> Result<T> {
        self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;

    #[test]
    fn test_closure_is_string_converter() {
        let upper = |raw: &str| Ok(raw.to_uppercase());
        assert_eq!(upper.convert_str("abc").unwrap(), "ABC");
    }

    #[test]
    fn test_string_converter_error() {
        let fail = |raw: &str| -> Result<i32> {
            Err(ConfigError::conversion("", "i32", format!("bad value '{raw}'")))
        };
        assert!(fail.convert_str("x").is_err());
    }
}
