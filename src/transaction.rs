//! Transaction engine: applies a resolved plan's steps against a target root,
//! driving the unpack -> configure -> register and remove -> unregister
//! transitions described by the package lifecycle (§4.6-4.7).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::error::{Error, Result};
use crate::index::RegistryDocument;
use crate::plist::Node;
use crate::script::{self, Phase, ScriptKind};
use crate::state::{self, PackageState};
use crate::types::{FileEntry, InstalledDescriptor, PackageDescriptor, Step, TransactionPlan};

/// What: Directory under `root` where a package's `REMOVE` script is cached,
/// so it stays available after the original archive is gone.
fn metadata_dir(root: &Path, pkgname: &str) -> PathBuf {
    root.join("var/db/xbps/metadata").join(pkgname)
}

/// What: Locate the archive file for `descriptor` under a local repository
/// directory, trying the architecture subdir, `noarch`, then the directory
/// root (mirroring the layout the index builder scans, §4.4).
fn locate_archive(source_repo: &Path, descriptor: &PackageDescriptor) -> Result<PathBuf> {
    let filename = descriptor
        .filename
        .as_deref()
        .ok_or_else(|| Error::MissingField("filename".to_string()))?;
    [
        source_repo.join(&descriptor.architecture).join(filename),
        source_repo.join("noarch").join(filename),
        source_repo.join(filename),
    ]
    .into_iter()
    .find(|candidate| candidate.exists())
    .ok_or_else(|| Error::NotFound(format!("{} ({filename})", descriptor.pkgver())))
}

/// What: Extract the set of paths tagged `mutable` from a `files.plist` entry.
fn mutable_paths(files_plist: Option<&[u8]>) -> Result<HashSet<String>> {
    let Some(bytes) = files_plist else {
        return Ok(HashSet::new());
    };
    let node = crate::plist::load_bytes(bytes)?;
    let paths = node
        .get("files")
        .and_then(Node::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.get("mutable").and_then(Node::as_bool) == Some(true))
                .filter_map(|e| e.get("path").and_then(Node::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(paths)
}

/// What: Strip an operator/version suffix off a dependency predicate.
fn predicate_name(predicate: &str) -> &str {
    predicate.find(['<', '>', '=']).map_or(predicate, |idx| &predicate[..idx])
}

/// What: Run the unpack, configure, and register phases for one INSTALL or
/// UPGRADE step (§4.7).
///
/// Inputs:
/// - `automatic`: `Some(flag)` for a fresh INSTALL (the resolver's verdict);
///   `None` for an UPGRADE, which preserves the previously recorded flag.
///
/// Output:
/// - `Ok(())` once the package reaches `INSTALLED`.
/// - `Err(Error::ScriptFailed)` after leaving the package `BROKEN` (the
///   descriptor is still committed `UNPACKED`/`BROKEN`, never silently
///   `INSTALLED`, per §4.7's ordering guarantee).
fn unpack_configure_register(
    root: &Path,
    registry: &mut RegistryDocument,
    descriptor: &PackageDescriptor,
    source_repo: &str,
    automatic: Option<bool>,
) -> Result<()> {
    let pkgname = descriptor.pkgname.clone();
    let pkgver = descriptor.pkgver();
    let previous_idx = registry.packages.iter().position(|p| p.pkgname() == pkgname);
    let previous = previous_idx.map(|idx| registry.packages[idx].clone());

    let archive_path = locate_archive(Path::new(source_repo), descriptor)?;
    let bytes = archive::read_file(&archive_path)?;
    let expected_sha256 = descriptor
        .filename_sha256
        .as_deref()
        .ok_or_else(|| Error::MissingField("filename-sha256".to_string()))?;
    archive::verify_sha256(&bytes, expected_sha256, &pkgver)?;

    let install_script = archive::read_named_entry(&bytes, "INSTALL")?;
    script::run(root, install_script.as_deref(), ScriptKind::Install, Phase::Pre, &pkgver)?;

    let unpacked = archive::unpack(&bytes, root)?;
    let files_plist = archive::read_named_entry(&bytes, archive::FILES_ENTRY)?;
    let mutable = mutable_paths(files_plist.as_deref())?;

    if let Some(previous) = &previous {
        let new_paths: HashSet<&str> = unpacked.iter().map(|f| f.path.as_str()).collect();
        for old_file in &previous.files {
            if !old_file.mutable && !new_paths.contains(old_file.path.as_str()) {
                let _ = std::fs::remove_file(root.join(&old_file.path));
            }
        }
    }

    let remove_script = archive::read_named_entry(&bytes, "REMOVE")?;
    let meta_dir = metadata_dir(root, &pkgname);
    std::fs::create_dir_all(&meta_dir)?;
    match &remove_script {
        Some(contents) => std::fs::write(meta_dir.join("REMOVE"), contents)?,
        None => {
            let _ = std::fs::remove_file(meta_dir.join("REMOVE"));
        }
    }
    match &install_script {
        Some(contents) => std::fs::write(meta_dir.join("INSTALL"), contents)?,
        None => {
            let _ = std::fs::remove_file(meta_dir.join("INSTALL"));
        }
    }

    let files = unpacked
        .into_iter()
        .map(|f| FileEntry {
            mutable: mutable.contains(&f.path),
            path: f.path,
            sha256: f.sha256,
        })
        .collect();

    let automatic_install = automatic.unwrap_or_else(|| previous.as_ref().is_some_and(|p| p.automatic_install));
    let requiredby = previous.as_ref().map(|p| p.requiredby.clone()).unwrap_or_default();

    let installed = InstalledDescriptor {
        descriptor: descriptor.clone(),
        state: PackageState::Unpacked,
        automatic_install,
        requiredby,
        files,
    };
    match previous_idx {
        Some(idx) => registry.packages[idx] = installed,
        None => registry.packages.push(installed),
    }

    let configure_result = script::run(root, install_script.as_deref(), ScriptKind::Install, Phase::Post, &pkgver);
    let idx = registry
        .packages
        .iter()
        .position(|p| p.pkgname() == pkgname)
        .expect("just inserted above");
    let target_state = if configure_result.is_ok() {
        PackageState::Installed
    } else {
        PackageState::Broken
    };
    registry.packages[idx].state = state::transition(&pkgname, PackageState::Unpacked, target_state)?;
    configure_result?;

    for dep_predicate in &descriptor.run_depends {
        let dep_name = predicate_name(dep_predicate);
        if let Some(dep) = registry.packages.iter_mut().find(|p| p.pkgname() == dep_name) {
            if !dep.requiredby.contains(&pkgver) {
                dep.requiredby.push(pkgver.clone());
            }
        }
    }

    Ok(())
}

/// What: Run an INSTALL step.
pub fn install(
    root: &Path,
    registry: &mut RegistryDocument,
    descriptor: &PackageDescriptor,
    source_repo: &str,
    automatic: bool,
) -> Result<()> {
    unpack_configure_register(root, registry, descriptor, source_repo, Some(automatic))
}

/// What: Run an UPGRADE step, preserving the previously recorded
/// `automatic-install` flag.
pub fn upgrade(root: &Path, registry: &mut RegistryDocument, descriptor_new: &PackageDescriptor, source_repo: &str) -> Result<()> {
    unpack_configure_register(root, registry, descriptor_new, source_repo, None)
}

/// What: Remove an installed package, optionally purging its config files
/// and descriptor (§4.7 REMOVE/PURGE).
///
/// Details:
/// - A file still listed in another installed package's manifest (shared by
///   exact path) is never deleted.
/// - Plain removal preserves `mutable` files and leaves the package
///   `CONFIG_FILES`; purge deletes everything and removes the descriptor
///   entirely, regardless of the package's current state.
pub fn remove(root: &Path, registry: &mut RegistryDocument, pkgname: &str, purge: bool) -> Result<()> {
    let idx = registry
        .packages
        .iter()
        .position(|p| p.pkgname() == pkgname)
        .ok_or_else(|| Error::NotFound(pkgname.to_string()))?;
    let target = registry.packages[idx].clone();
    let pkgver = target.pkgver();

    let remove_script = std::fs::read(metadata_dir(root, pkgname).join("REMOVE")).ok();
    script::run(root, remove_script.as_deref(), ScriptKind::Remove, Phase::Pre, &pkgver)?;

    for file in &target.files {
        if !purge && file.mutable {
            continue;
        }
        let shared = registry
            .packages
            .iter()
            .enumerate()
            .any(|(other_idx, other)| other_idx != idx && other.files.iter().any(|f| f.path == file.path));
        if shared {
            continue;
        }
        let _ = std::fs::remove_file(root.join(&file.path));
    }

    script::run(root, remove_script.as_deref(), ScriptKind::Remove, Phase::Post, &pkgver)?;

    for other in &mut registry.packages {
        other.requiredby.retain(|r| r != &pkgver);
    }

    if purge {
        let _ = std::fs::remove_dir_all(metadata_dir(root, pkgname));
        registry.packages.retain(|p| p.pkgname() != pkgname);
    } else {
        let idx = registry
            .packages
            .iter()
            .position(|p| p.pkgname() == pkgname)
            .expect("still present: purge branch not taken");
        let current_state = registry.packages[idx].state;
        registry.packages[idx].state = state::transition(pkgname, current_state, PackageState::ConfigFiles)?;
        registry.packages[idx].files.retain(|f| f.mutable);
    }

    Ok(())
}

/// What: Re-run a package's cached `INSTALL` post-install (configure) phase
/// (the CLI `reconfigure` command).
///
/// Output:
/// - `Ok(())` and state `INSTALLED` on success.
/// - `Err(Error::ScriptFailed)` after leaving the package `BROKEN`, mirroring
///   the configure-phase ordering guarantee in [`unpack_configure_register`].
/// - `Err(Error::NotFound)` if `pkgname` is not installed.
pub fn reconfigure(root: &Path, registry: &mut RegistryDocument, pkgname: &str) -> Result<()> {
    let idx = registry
        .packages
        .iter()
        .position(|p| p.pkgname() == pkgname)
        .ok_or_else(|| Error::NotFound(pkgname.to_string()))?;
    let pkgver = registry.packages[idx].pkgver();
    let current_state = registry.packages[idx].state;

    registry.packages[idx].state = state::transition(pkgname, current_state, PackageState::Unpacked)?;

    let install_script = std::fs::read(metadata_dir(root, pkgname).join("INSTALL")).ok();
    let configure_result = script::run(root, install_script.as_deref(), ScriptKind::Install, Phase::Post, &pkgver);
    let target_state = if configure_result.is_ok() {
        PackageState::Installed
    } else {
        PackageState::Broken
    };
    registry.packages[idx].state = state::transition(pkgname, PackageState::Unpacked, target_state)?;
    configure_result
}

/// What: Apply every executable step of `plan`, in order.
///
/// Details:
/// - Fail-fast: the first error halts the plan, leaving earlier steps
///   committed (§7 recovery policy for the resolver/engine).
pub fn apply(root: &Path, registry: &mut RegistryDocument, plan: &TransactionPlan) -> Result<()> {
    for step in plan.executable() {
        match step {
            Step::Install {
                descriptor,
                source_repo,
                automatic,
            } => install(root, registry, descriptor, source_repo, *automatic)?,
            Step::Upgrade {
                descriptor_new,
                source_repo,
                ..
            } => upgrade(root, registry, descriptor_new, source_repo)?,
            Step::Keep { .. } => unreachable!("TransactionPlan::executable filters out Keep steps"),
        }
    }
    Ok(())
}
