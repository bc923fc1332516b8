// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for the integration test suites.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
///
/// Output goes through the test writer so it is captured per test and only
/// shown for failures.
#[allow(dead_code)]
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
