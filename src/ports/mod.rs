// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports: trait contracts between the engine and the outside world.

pub mod converter;
pub mod source;

pub use converter::{Converter, StringConverter};
pub use source::{ChangeAction, ChangeListener, ChangeSet, ConfigSource};
