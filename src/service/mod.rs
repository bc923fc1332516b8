// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration engine: source registry, snapshot merging, path
//! resolution, converter dispatch and change notification.

pub mod converters;
pub mod node;
pub(crate) mod notify;
pub mod registry;
pub mod resolver;
pub mod snapshot;

pub use converters::{ConverterRegistry, BUILTIN_PRIORITY};
pub use node::{Config, ConfigBuilder};
pub use registry::{SourceHandle, SourceRegistry};
pub use resolver::Resolution;
pub use snapshot::Snapshot;
