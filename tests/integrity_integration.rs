//! Integrity re-hashing against a real installed tree, and the
//! installation-aborts-cleanly guarantee (S5) when an archive's declared
//! hash doesn't match its bytes.

use xbps_rs::index::RegistryDocument;
use xbps_rs::integrity;
use xbps_rs::{archive, transaction, Error, PackageDescriptor, Result};

fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *contents).expect("append entry");
    }
    builder.into_inner().expect("finish tar")
}

fn descriptor(pkgname: &str, version: &str, filename: &str) -> PackageDescriptor {
    PackageDescriptor {
        pkgname: pkgname.to_string(),
        version: version.to_string(),
        short_desc: String::new(),
        architecture: "noarch".to_string(),
        run_depends: Vec::new(),
        filename: Some(filename.to_string()),
        filename_sha256: None,
        filename_size: None,
    }
}

/// A package whose on-disk file has been tampered with after install fails
/// the manifest re-hash, while an untouched package still passes.
#[test]
fn tampering_a_file_after_install_fails_the_rehash_but_siblings_still_pass() -> Result<()> {
    let repo_dir = tempfile::TempDir::new().expect("tempdir");
    let root = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(repo_dir.path().join("noarch")).expect("mkdir");

    let mut good = descriptor("good", "1.0", "good-1.0.xbps");
    let good_bytes = build_archive(&[("usr/bin/good", b"trustworthy")]);
    good.filename_sha256 = Some(archive::sha256_hex(&good_bytes));
    std::fs::write(repo_dir.path().join("noarch/good-1.0.xbps"), good_bytes).expect("write good archive");

    let mut tampered = descriptor("tampered", "1.0", "tampered-1.0.xbps");
    let tampered_bytes = build_archive(&[("usr/bin/tampered", b"original")]);
    tampered.filename_sha256 = Some(archive::sha256_hex(&tampered_bytes));
    std::fs::write(repo_dir.path().join("noarch/tampered-1.0.xbps"), tampered_bytes).expect("write tampered archive");

    let mut registry = RegistryDocument::new();
    transaction::install(root.path(), &mut registry, &good, repo_dir.path().to_str().expect("utf8 path"), false)?;
    transaction::install(root.path(), &mut registry, &tampered, repo_dir.path().to_str().expect("utf8 path"), false)?;

    std::fs::write(root.path().join("usr/bin/tampered"), b"modified-after-the-fact").expect("tamper with file");

    let reports = integrity::check_all(root.path(), &registry);
    let good_report = reports.iter().find(|r| r.pkgname == "good").expect("good reported");
    assert!(good_report.is_ok());
    let tampered_report = reports.iter().find(|r| r.pkgname == "tampered").expect("tampered reported");
    assert!(!tampered_report.is_ok());
    assert_eq!(tampered_report.failures().count(), 1);
    Ok(())
}

/// S5: a declared hash that doesn't match the archive bytes aborts before
/// any filesystem effect, and the registry is left exactly as it was.
#[test]
fn corrupt_archive_hash_aborts_install_and_leaves_registry_untouched() -> Result<()> {
    let repo_dir = tempfile::TempDir::new().expect("tempdir");
    let root = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(repo_dir.path().join("noarch")).expect("mkdir");

    let mut already_installed = descriptor("kept", "1.0", "kept-1.0.xbps");
    let kept_bytes = build_archive(&[("usr/bin/kept", b"kept")]);
    already_installed.filename_sha256 = Some(archive::sha256_hex(&kept_bytes));
    std::fs::write(repo_dir.path().join("noarch/kept-1.0.xbps"), kept_bytes).expect("write kept archive");
    let mut registry = RegistryDocument::new();
    transaction::install(root.path(), &mut registry, &already_installed, repo_dir.path().to_str().expect("utf8 path"), false)?;
    let before = registry.clone();

    let mut corrupt = descriptor("corrupt", "1.0", "corrupt-1.0.xbps");
    let corrupt_bytes = build_archive(&[("usr/bin/corrupt", b"payload")]);
    corrupt.filename_sha256 = Some("0".repeat(64));
    std::fs::write(repo_dir.path().join("noarch/corrupt-1.0.xbps"), corrupt_bytes).expect("write corrupt archive");

    let err = transaction::install(root.path(), &mut registry, &corrupt, repo_dir.path().to_str().expect("utf8 path"), false)
        .expect_err("hash mismatch rejected");
    assert!(matches!(err, Error::Integrity { .. }));
    assert!(!root.path().join("usr/bin/corrupt").exists());
    assert_eq!(registry.packages, before.packages);
    Ok(())
}
