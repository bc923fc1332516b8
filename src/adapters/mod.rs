// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source adapters.
//!
//! Each adapter implements [`crate::ports::ConfigSource`] for one origin of
//! key/value data. [`MapSource`] is mutable and participates in change
//! notification; [`EnvSource`] is a static capture of the process
//! environment.

pub mod map;

#[cfg(feature = "env")]
pub mod env;

pub use map::MapSource;

#[cfg(feature = "env")]
pub use env::EnvSource;
