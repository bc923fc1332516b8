// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converter registry: maps target types to conversion functions.
//!
//! Dispatch order for a requested type is: per-call converter (see
//! [`Config::as_with`]), then the highest-priority registered converter, then
//! the built-ins. Built-ins are registered at [`BUILTIN_PRIORITY`] (the lowest
//! possible), so any user registration overrides them; ties between equal
//! priorities resolve to the most recent registration.

use crate::domain::{ConfigError, Result};
use crate::ports::{Converter, StringConverter};
use crate::service::Config;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// The priority built-in converters are registered at; always overridable.
pub const BUILTIN_PRIORITY: i64 = i64::MIN;

pub(crate) type BoxedValue = Box<dyn Any + Send + Sync>;
type NodeFn = Arc<dyn Fn(&Config) -> Result<BoxedValue> + Send + Sync>;
type RawFn = Arc<dyn Fn(&str) -> Result<BoxedValue> + Send + Sync>;

#[derive(Clone)]
struct Registered {
    priority: i64,
    seq: u64,
    node: NodeFn,
    /// String fast path, present for converters registered via
    /// [`ConverterRegistry::register_str`]; also used to convert literal
    /// defaults during mapping.
    raw: Option<RawFn>,
}

/// Registry of type converters.
///
/// Cloneable; a clone shares the converter functions but registrations on the
/// clone do not affect the original.
///
/// # Examples
///
/// ```
/// use treecfg::adapters::MapSource;
/// use treecfg::service::Config;
/// use treecfg::domain::{ConfigError, Result};
/// use std::sync::Arc;
///
/// #[derive(Debug, PartialEq)]
/// struct Port(u16);
///
/// # fn main() -> Result<()> {
/// let config = Config::builder()
///     .with_source(Arc::new(MapSource::new("mem").with_entry("server.port", "7001")))
///     .with_str_converter::<Port, _>(0, |raw: &str| {
///         raw.parse::<u16>()
///             .map(Port)
///             .map_err(|e| ConfigError::conversion("", "Port", e))
///     })
///     .build()?;
///
/// assert_eq!(config.get("server.port").as_type::<Port>()?, Some(Port(7001)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    table: HashMap<TypeId, Vec<Registered>>,
    seq: u64,
}

impl ConverterRegistry {
    /// Creates an empty registry with no converters at all.
    pub fn new() -> Self {
        ConverterRegistry::default()
    }

    /// Creates a registry pre-populated with the built-in converters.
    pub fn with_builtins() -> Self {
        BUILTINS.clone()
    }

    /// Registers a whole-node converter for `T` at the given priority.
    pub fn register<T, C>(&mut self, priority: i64, converter: C)
    where
        T: Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        let converter = Arc::new(converter);
        let node: NodeFn = Arc::new(move |n: &Config| {
            converter.convert(n).map(|v| Box::new(v) as BoxedValue)
        });
        self.push::<T>(priority, node, None);
    }

    /// Registers a string-only converter for `T` at the given priority.
    ///
    /// The converter only ever sees the resolved string value of a leaf; a
    /// node without a direct value fails with a conversion error. String
    /// converters also serve as the conversion path for literal default
    /// values during mapping.
    pub fn register_str<T, C>(&mut self, priority: i64, converter: C)
    where
        T: Send + Sync + 'static,
        C: StringConverter<T> + 'static,
    {
        let converter = Arc::new(converter);
        let for_raw = Arc::clone(&converter);
        let raw: RawFn = Arc::new(move |raw: &str| {
            for_raw.convert_str(raw).map(|v| Box::new(v) as BoxedValue)
        });
        let node: NodeFn = Arc::new(move |n: &Config| match n.as_string()? {
            Some(s) => converter
                .convert_str(&s)
                .map(|v| Box::new(v) as BoxedValue)
                .map_err(|e| fill_key(e, n.key().as_str())),
            None => Err(ConfigError::conversion(
                n.key().as_str(),
                std::any::type_name::<T>(),
                "node has no direct value",
            )),
        });
        self.push::<T>(priority, node, Some(raw));
    }

    fn push<T: 'static>(&mut self, priority: i64, node: NodeFn, raw: Option<RawFn>) {
        self.seq += 1;
        let entry = Registered {
            priority,
            seq: self.seq,
            node,
            raw,
        };
        self.table.entry(TypeId::of::<T>()).or_default().push(entry);
    }

    fn best(&self, id: TypeId) -> Option<&Registered> {
        self.table
            .get(&id)?
            .iter()
            .max_by_key(|r| (r.priority, r.seq))
    }

    /// Returns `true` if a converter for `T` is registered.
    pub fn supports<T: 'static>(&self) -> bool {
        self.table.contains_key(&TypeId::of::<T>())
    }

    /// Converts an existing node to `T` using the best registered converter.
    ///
    /// Returns `Ok(None)` when the node is absent; the converter is never
    /// invoked in that case.
    pub fn convert<T: Send + Sync + 'static>(&self, node: &Config) -> Result<Option<T>> {
        if !node.exists() {
            return Ok(None);
        }
        let boxed = self.convert_dyn(TypeId::of::<T>(), std::any::type_name::<T>(), node)?;
        match boxed.downcast::<T>() {
            Ok(v) => Ok(Some(*v)),
            Err(_) => Err(ConfigError::conversion(
                node.key().as_str(),
                std::any::type_name::<T>(),
                "converter produced a mismatched type",
            )),
        }
    }

    pub(crate) fn convert_dyn(
        &self,
        id: TypeId,
        type_name: &str,
        node: &Config,
    ) -> Result<BoxedValue> {
        let entry = self.best(id).ok_or_else(|| {
            ConfigError::conversion(node.key().as_str(), type_name, "no converter registered")
        })?;
        (entry.node)(node)
    }

    pub(crate) fn convert_raw_dyn(
        &self,
        id: TypeId,
        type_name: &str,
        key: &str,
        raw_value: &str,
    ) -> Result<BoxedValue> {
        let entry = self
            .best(id)
            .ok_or_else(|| ConfigError::conversion(key, type_name, "no converter registered"))?;
        match &entry.raw {
            Some(f) => f(raw_value).map_err(|e| fill_key(e, key)),
            None => Err(ConfigError::conversion(
                key,
                type_name,
                "registered converter cannot convert a literal default value",
            )),
        }
    }
}

/// String converters do not know the key they convert for; the registry
/// attaches it after the fact.
fn fill_key(err: ConfigError, key: &str) -> ConfigError {
    match err {
        ConfigError::Conversion {
            key: k,
            target_type,
            message,
        } if k.is_empty() => ConfigError::Conversion {
            key: key.to_string(),
            target_type,
            message,
        },
        other => other,
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => Err(ConfigError::conversion(
            "",
            "bool",
            format!("unrecognized boolean value '{other}'"),
        )),
    }
}

static BUILTINS: Lazy<ConverterRegistry> = Lazy::new(|| {
    let mut reg = ConverterRegistry::new();

    macro_rules! from_str_converters {
        ($($t:ty),+ $(,)?) => {
            $(
                reg.register_str::<$t, _>(BUILTIN_PRIORITY, |raw: &str| {
                    raw.parse::<$t>()
                        .map_err(|e| ConfigError::conversion("", std::any::type_name::<$t>(), e))
                });
            )+
        };
    }

    from_str_converters!(
        i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, char, String,
        std::path::PathBuf, std::net::IpAddr, std::net::SocketAddr,
    );
    reg.register_str::<bool, _>(BUILTIN_PRIORITY, parse_bool);
    reg
});
