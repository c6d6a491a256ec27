//! Version comparator walkthrough.
//!
//! This demo shows:
//! - Total-order comparison of `pkgver` strings
//! - Constraint satisfaction against `op`+`version` predicates
//! - A handful of the revision/epoch edge cases the comparator handles
//!
//! Run with:
//!   `cargo run --example version_demo`

use std::cmp::Ordering;
use xbps_rs::version::{compare, satisfies};

fn main() {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║       xbps-rs: Version Comparator Demo                         ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("┌─ Basic total order ─────────────────────────────────────────────┐");
    let cases = vec![
        ("1.2", "1.3", Ordering::Less),
        ("2.0", "1.9", Ordering::Greater),
        ("1.0", "1.0", Ordering::Equal),
        ("1.0_1", "1.0_2", Ordering::Less),
        ("1.0_2", "1.0_10", Ordering::Less),
    ];
    for (a, b, expected) in cases {
        let result = compare(a, b);
        let symbol = match result {
            Ordering::Less => "<",
            Ordering::Equal => "==",
            Ordering::Greater => ">",
        };
        let status = if result == expected { "✓" } else { "✗" };
        println!("  {status} {a} {symbol} {b} (expected {expected:?})");
    }
    println!();

    println!("┌─ Constraint satisfaction ────────────────────────────────────────┐");
    let constraint_cases = vec![
        ("1.5", ">=1.0", true),
        ("0.9", ">=1.0", false),
        ("1.0_1", "=1.0_1", true),
        ("1.0_2", "<1.0_3", true),
        ("2.0", "<=1.9", false),
    ];
    for (version, constraint, expected) in constraint_cases {
        let result = satisfies(version, constraint);
        let status = if result == expected { "✓" } else { "✗" };
        println!("  {status} satisfies(\"{version}\", \"{constraint}\"): {result} (expected {expected})");
    }
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Demo Complete!                               ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
}
