// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor-driven config mapping.
//!
//! A [`MappingDescriptor`] describes a target object shape member by member;
//! [`bind`] walks the descriptor against a [`crate::service::Config`] node
//! and produces a [`BoundNode`] graph with every scalar converted through the
//! registered converters. Member names map to config keys via kebab-case
//! unless overridden; absences are aggregated and reported together.
//!
//! # Examples
//!
//! ```
//! use treecfg::adapters::MapSource;
//! use treecfg::mapping::{MappingDescriptor, Member, Shape};
//! use treecfg::service::Config;
//! use std::sync::Arc;
//!
//! # fn main() -> treecfg::domain::Result<()> {
//! let descriptor = MappingDescriptor::new("Server")
//!     .with_member(Member::new("host", Shape::scalar::<String>()))
//!     .with_member(Member::new("port", Shape::scalar::<u16>()).with_default("8080"));
//!
//! let config = Config::builder()
//!     .with_source(Arc::new(MapSource::new("mem").with_entry("server.host", "localhost")))
//!     .build()?;
//!
//! let server = config.get("server").bind(&descriptor)?;
//! assert_eq!(server.member("host").unwrap().scalar().unwrap().get::<String>().unwrap(), "localhost");
//! assert_eq!(*server.member("port").unwrap().scalar().unwrap().get::<u16>().unwrap(), 8080);
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod descriptor;

pub use binder::{bind, BoundNode, BoundScalar};
pub use descriptor::{MappingDescriptor, Member, ScalarType, Shape};
