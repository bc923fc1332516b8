// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer: core types shared by every other layer.

pub mod errors;
pub mod key;
pub mod value;

pub use errors::{ConfigError, Result};
pub use key::Key;
pub use value::ConfigValue;
