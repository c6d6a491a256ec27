//! Repository index builder and integrity checker walkthrough, using a
//! temporary directory standing in for a real repository/root pair.
//!
//! This demo shows:
//! - Writing a minimal `.xbps` archive (tar of `props.plist` plus content)
//! - Building a repository index from a directory of archives
//! - Re-hashing an installed file and detecting tampering
//!
//! Run with:
//!   `cargo run --example indexer_demo`

use xbps_rs::index::{self, IndexDocument};
use xbps_rs::{indexer, integrity, plist};

fn build_archive(props: &[u8], content: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(props.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "props.plist", props)
        .expect("append props.plist");
    for (name, bytes) in content {
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *bytes).expect("append entry");
    }
    builder.into_inner().expect("finish tar")
}

fn props_xml(pkgname: &str, version: &str) -> Vec<u8> {
    let mut dict = plist::Node::dict();
    dict.set("pkgname", plist::Node::from(pkgname));
    dict.set("version", plist::Node::from(version));
    dict.set("run_depends", plist::Node::Array(Vec::new()));
    let value = ::plist::Value::from(&dict);
    let mut xml = Vec::new();
    value.to_writer_xml(&mut xml).expect("serialize props.plist");
    xml
}

fn main() {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║       xbps-rs: Index Builder & Integrity Demo                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let repo_dir = tempfile::TempDir::new().expect("tempdir");
    let root_dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(repo_dir.path().join("noarch")).expect("mkdir noarch");

    let archive = build_archive(&props_xml("demo-pkg", "1.0"), &[("usr/bin/demo-pkg", b"#!/bin/sh\necho hi\n")]);
    std::fs::write(repo_dir.path().join("noarch/demo-pkg-1.0.xbps"), archive).expect("write archive");

    println!("┌─ Building the repository index ──────────────────────────────────┐");
    let summary = indexer::build(repo_dir.path(), "x86_64").expect("index build");
    println!("  ✓ indexed {} archive(s), skipped {}", summary.updated, summary.skipped);

    let document = IndexDocument::from_node(&plist::load(&indexer::index_path(repo_dir.path())).expect("load index"))
        .expect("parse index");
    let found = index::find(&document, "demo-pkg").expect("demo-pkg present");
    println!("  ✓ demo-pkg resolves to version {}", found.version);
    println!();

    println!("┌─ Installing and re-checking integrity ───────────────────────────┐");
    std::fs::create_dir_all(root_dir.path().join("usr/bin")).expect("mkdir usr/bin");
    std::fs::write(root_dir.path().join("usr/bin/demo-pkg"), b"#!/bin/sh\necho hi\n").expect("simulate unpack");
    let file = xbps_rs::FileEntry {
        path: "usr/bin/demo-pkg".to_string(),
        sha256: xbps_rs::archive::sha256_hex(b"#!/bin/sh\necho hi\n"),
        mutable: false,
    };
    let report = integrity::check_package(root_dir.path(), "demo-pkg", &[file.clone()]);
    println!("  ✓ fresh install reports ok: {}", report.is_ok());

    std::fs::write(root_dir.path().join("usr/bin/demo-pkg"), b"tampered-contents").expect("tamper");
    let report = integrity::check_package(root_dir.path(), "demo-pkg", &[file]);
    println!("  ✗ after tampering reports ok: {}", report.is_ok());
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Demo Complete!                               ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
}
