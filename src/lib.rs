// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture configuration resolution crate.
//!
//! This crate merges ordered heterogeneous key/value sources into one
//! hierarchical configuration tree, navigated through cheap [`service::Config`]
//! node handles. Values convert to Rust types through a priority-ordered
//! converter registry, structured targets populate through descriptor-driven
//! mapping, and mutable sources feed a scoped change notification engine.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`Key`, `ConfigValue`, errors)
//! - **Ports**: Trait definitions (`ConfigSource`, `Converter`, `StringConverter`)
//! - **Adapters**: Source implementations (in-memory map, environment variables)
//! - **Service**: The engine - source registry, snapshot merging, resolution,
//!   converter dispatch, change notification
//! - **Mapping**: Descriptor-driven binding of config subtrees to object shapes
//!
//! # Features
//!
//! - **Multiple Sources**: Any number of sources merged by ordinal; higher
//!   ordinals win, names break ties deterministically
//! - **Hierarchy**: Dotted keys form a tree; any node is addressable and
//!   navigable relative to any other
//! - **Type Safety**: Built-in converters for the primitive types plus
//!   user-registered converters that can override them
//! - **Placeholders**: `${key}` references expand against the merged view,
//!   with cycle detection
//! - **Immutable Views**: A node observes the snapshot captured when its root
//!   was built; mutations surface only through scoped change callbacks
//!
//! # Feature Flags
//!
//! - `env`: Enable the environment variable source (default)
//!
//! # Quick Start
//!
//! ```rust
//! use treecfg::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> treecfg::domain::Result<()> {
//! let config = Config::builder()
//!     .with_source(Arc::new(
//!         MapSource::new("mem")
//!             .with_entry("server.host", "localhost")
//!             .with_entry("server.port", "7001"),
//!     ))
//!     .build()?;
//!
//! let server = config.get("server");
//! assert_eq!(server.get("host").as_string()?.as_deref(), Some("localhost"));
//! assert_eq!(server.get("port").as_type::<u16>()?, Some(7001));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod mapping;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigError, ConfigValue, Key, Result};
    pub use crate::mapping::{BoundNode, MappingDescriptor, Member, Shape};
    pub use crate::ports::{
        ChangeAction, ChangeSet, ConfigSource, Converter, StringConverter,
    };
    pub use crate::service::{Config, ConfigBuilder, Resolution};

    pub use crate::adapters::MapSource;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvSource;
}
