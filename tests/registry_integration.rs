//! Integration tests for the locked registry handle and the installed
//! registry's persistence and reverse-dependency bookkeeping.

use tempfile::TempDir;
use xbps_rs::registry::RegistryHandle;
use xbps_rs::state::PackageState;
use xbps_rs::types::{FileEntry, InstalledDescriptor, PackageDescriptor};
use xbps_rs::Result;

fn descriptor(pkgname: &str, version: &str, run_depends: &[&str]) -> PackageDescriptor {
    PackageDescriptor {
        pkgname: pkgname.to_string(),
        version: version.to_string(),
        short_desc: String::new(),
        architecture: "noarch".to_string(),
        run_depends: run_depends.iter().map(|s| (*s).to_string()).collect(),
        filename: None,
        filename_sha256: None,
        filename_size: None,
    }
}

/// Property 3: `load(store(x)) == x` for any registry tree, exercised here
/// through the locked handle rather than the bare plist layer.
#[test]
fn registry_round_trips_across_process_boundaries() -> Result<()> {
    let root = TempDir::new().expect("tempdir");
    {
        let mut handle = RegistryHandle::prepare(root.path())?;
        handle.document.packages.push(InstalledDescriptor {
            descriptor: descriptor("foo", "1.0_1", &["bar>=1.0"]),
            state: PackageState::Installed,
            automatic_install: false,
            requiredby: Vec::new(),
            files: vec![FileEntry {
                path: "usr/bin/foo".to_string(),
                sha256: "cafebabe".to_string(),
                mutable: false,
            }],
        });
        handle.release()?;
    }

    let reopened = RegistryHandle::prepare(root.path())?;
    assert_eq!(reopened.document.packages.len(), 1);
    let foo = &reopened.document.packages[0];
    assert_eq!(foo.pkgname(), "foo");
    assert_eq!(foo.descriptor.version, "1.0_1");
    assert_eq!(foo.files.len(), 1);
    Ok(())
}

/// A fresh root with no registry file yet behaves like an empty registry,
/// rather than an error.
#[test]
fn fresh_root_has_no_installed_packages() -> Result<()> {
    let root = TempDir::new().expect("tempdir");
    let handle = RegistryHandle::prepare(root.path())?;
    assert!(handle.document.packages.is_empty());
    Ok(())
}

/// Two handles opened back-to-back on the same root see each other's
/// committed mutations, since `release` flushes before the lock is dropped.
#[test]
fn sequential_handles_observe_prior_mutations() -> Result<()> {
    let root = TempDir::new().expect("tempdir");
    for version in ["1.0", "2.0", "3.0"] {
        let mut handle = RegistryHandle::prepare(root.path())?;
        handle.document.packages.retain(|p| p.pkgname() != "foo");
        handle.document.packages.push(InstalledDescriptor {
            descriptor: descriptor("foo", version, &[]),
            state: PackageState::Installed,
            automatic_install: false,
            requiredby: Vec::new(),
            files: Vec::new(),
        });
        handle.release()?;
    }

    let handle = RegistryHandle::prepare(root.path())?;
    assert_eq!(handle.document.packages.len(), 1);
    assert_eq!(handle.document.packages[0].descriptor.version, "3.0");
    Ok(())
}
