// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the configuration crate.
//!
//! This example demonstrates:
//! - Building a configuration from layered sources
//! - Navigating the tree and retrieving values
//! - Type conversions (string, int, bool)
//! - `${key}` placeholder expansion
//!
//! To run this example:
//! ```bash
//! # Optionally override packaged values from the environment
//! export DEMO_SERVER_PORT="9090"
//!
//! # Run the example
//! cargo run --example basic_usage --features env
//! ```

use std::sync::Arc;
use treecfg::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== treecfg: Basic Usage ===\n");

    // Packaged defaults at the lowest ordinal, environment on top.
    let defaults = MapSource::new("defaults")
        .with_entry("server.host", "localhost")
        .with_entry("server.port", "8080")
        .with_entry("server.url", "http://${server.host}:${server.port}/")
        .with_entry("debug", "false");

    let config = Config::builder()
        .with_source_ordinal(Arc::new(defaults), 10)
        .with_source(Arc::new(EnvSource::with_prefix("DEMO_")))
        .build()?;

    println!("--- Example 1: String Values ---");
    let server = config.get("server");
    println!("server.host = {:?}", server.get("host").as_string()?);

    println!("\n--- Example 2: Typed Values ---");
    let port: Option<u16> = server.get("port").as_type()?;
    println!("server.port = {port:?} (as u16)");
    let debug: Option<bool> = config.get("debug").as_type()?;
    println!("debug = {debug:?} (as bool)");

    println!("\n--- Example 3: Placeholder Expansion ---");
    let url = server.get("url").value()?.expect("url is configured");
    println!("raw      = {}", url.raw());
    println!("expanded = {}", url.value());
    println!("supplied by source '{}'", url.source());

    println!("\n--- Example 4: Existence and Shape ---");
    println!("server exists:       {}", server.exists());
    println!("server is a leaf:    {}", server.is_leaf());
    println!("server children:     {:?}", server.children());
    println!("missing key exists:  {}", config.get("nope").exists());

    println!("\n--- Example 5: Bulk Export ---");
    for (key, value) in server.properties()? {
        println!("  {key} = {value}");
    }

    println!("\n=== Example Complete ===");
    println!("\nTip: export DEMO_SERVER_PORT=9090 and run again to see the override.");

    Ok(())
}
