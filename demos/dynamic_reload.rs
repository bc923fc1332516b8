// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification example.
//!
//! This example demonstrates:
//! - Subscribing to a subtree with `on_change`
//! - Mutating a source and receiving scoped events
//! - The immutability of already-captured configuration views
//!
//! To run this example:
//! ```bash
//! cargo run --example dynamic_reload
//! ```

use std::sync::Arc;
use treecfg::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== treecfg: Change Notification ===\n");

    let source = Arc::new(
        MapSource::new("runtime")
            .with_entry("feature.flags.dark-mode", "off")
            .with_entry("feature.flags.beta", "off"),
    );

    let config = Config::builder()
        .with_source(Arc::clone(&source) as Arc<dyn ConfigSource>)
        .build()?;

    let flags = config.get("feature.flags");
    println!("initial dark-mode = {:?}", flags.get("dark-mode").as_string()?);

    // Subscribe to the flags subtree; keys arrive relative to it.
    flags.on_change(|node, keys| {
        println!("changed under feature.flags: {keys:?}");
        for key in &keys {
            println!("  {key} is now {:?}", node.get(key).as_string().unwrap());
        }
        ChangeAction::Continue
    });

    println!("\nflipping dark-mode on...");
    source.set("feature.flags.dark-mode", "on");

    println!("\nremoving beta flag...");
    source.remove("feature.flags.beta");

    // The view captured at build time is unaffected by the mutations.
    println!(
        "\npre-mutation view still reports dark-mode = {:?}",
        flags.get("dark-mode").as_string()?
    );

    println!("\n=== Example Complete ===");

    Ok(())
}
