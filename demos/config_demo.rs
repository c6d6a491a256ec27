//! Process configuration walkthrough: building a [`Config`] from explicit
//! values the way the CLI front end builds one from parsed flags.
//!
//! This demo shows:
//! - The builder's defaults (quiet, unforced, root `/`)
//! - Overriding root, verbosity, and force
//! - Mapping a `-v` repeat count to a verbosity level and tracing filter
//!
//! Run with:
//!   `cargo run --example config_demo`

use xbps_rs::config::{Config, Verbosity};

fn main() {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║       xbps-rs: Configuration Demo                               ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("┌─ Defaults ────────────────────────────────────────────────────────┐");
    let defaults = Config::builder().build();
    println!("  root: {}", defaults.root().path().display());
    println!("  verbosity: {:?}", defaults.verbosity());
    println!("  force: {}", defaults.force());
    println!();

    println!("┌─ Explicit overrides ────────────────────────────────────────────────┐");
    let custom = Config::builder().root("/tmp/demo-root").verbosity(Verbosity::Debug).force(true).build();
    println!("  root: {}", custom.root().path().display());
    println!("  verbosity: {:?}", custom.verbosity());
    println!("  force: {}", custom.force());
    println!();

    println!("┌─ Verbosity from a `-v` repeat count ───────────────────────────────┐");
    for count in 0..=3u8 {
        let verbosity = Verbosity::from_count(count);
        println!("  -{} -> {:?}, filter \"{}\"", "v".repeat(count as usize), verbosity, verbosity.filter_directive());
    }
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Demo Complete!                               ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
}
