//! Dependency resolver walkthrough over two ranked, in-memory repositories.
//!
//! This demo shows:
//! - Building `IndexDocument`s by hand (no archives on disk required)
//! - First-match-wins resolution across repository priority order
//! - A resolved plan's topological step order and INSTALL/UPGRADE/KEEP split
//!
//! Run with:
//!   `cargo run --example resolve_demo`

use xbps_rs::index::{IndexDocument, RegistryDocument};
use xbps_rs::resolve::resolve;
use xbps_rs::types::{PackageDescriptor, Step};

fn descriptor(pkgname: &str, version: &str, run_depends: &[&str]) -> PackageDescriptor {
    PackageDescriptor {
        pkgname: pkgname.to_string(),
        version: version.to_string(),
        short_desc: format!("{pkgname} demo package"),
        architecture: "noarch".to_string(),
        run_depends: run_depends.iter().map(|s| (*s).to_string()).collect(),
        filename: None,
        filename_sha256: None,
        filename_size: None,
    }
}

fn main() {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║       xbps-rs: Dependency Resolver Demo                         ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let mut stable = IndexDocument::new("stable-repo");
    stable.packages.push(descriptor("libfoo", "1.0", &[]));
    stable.packages.push(descriptor("app", "1.0", &["libfoo>=1.0"]));

    let mut testing = IndexDocument::new("testing-repo");
    testing.packages.push(descriptor("libfoo", "2.0", &[]));

    let repos = vec![
        ("stable-repo".to_string(), stable),
        ("testing-repo".to_string(), testing),
    ];
    let registry = RegistryDocument::new();

    println!("┌─ Resolving \"app\" across [stable-repo, testing-repo] ───────────┐");
    match resolve("app", &repos, &registry) {
        Ok(plan) => {
            for step in plan.executable() {
                match step {
                    Step::Install {
                        descriptor,
                        source_repo,
                        automatic,
                    } => {
                        println!(
                            "  ✓ INSTALL {}-{} from {source_repo} (automatic: {automatic})",
                            descriptor.pkgname, descriptor.version
                        );
                    }
                    Step::Upgrade {
                        descriptor_new,
                        descriptor_old,
                        source_repo,
                    } => {
                        println!(
                            "  ✓ UPGRADE {} {} -> {} from {source_repo}",
                            descriptor_new.pkgname, descriptor_old.version, descriptor_new.version
                        );
                    }
                    Step::Keep { descriptor } => {
                        println!("  ✓ KEEP {}-{}", descriptor.pkgname, descriptor.version);
                    }
                }
            }
            println!("\n  Note: libfoo resolves to 1.0 from stable-repo, not 2.0 from");
            println!("  testing-repo, because stable-repo is listed first (first-match-wins).");
        }
        Err(err) => println!("  ✗ resolution failed: {err}"),
    }
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Demo Complete!                               ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
}
