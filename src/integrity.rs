//! Integrity checker: re-hashes installed files and compares against the
//! manifest recorded at install time (§4.8).

use std::path::Path;

use crate::archive;
use crate::index::RegistryDocument;
use crate::types::FileEntry;

/// Outcome of checking a single manifest entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    /// The on-disk file matches the recorded digest.
    Ok,
    /// The file is absent from the root.
    Missing,
    /// The file exists but could not be read (permissions, I/O error).
    Unreadable(String),
    /// The file was read but its digest disagrees with the manifest.
    Mismatch {
        /// Digest recorded at install time.
        expected: String,
        /// Digest computed just now.
        actual: String,
    },
}

/// Integrity report for one installed package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageReport {
    /// Package the report concerns.
    pub pkgname: String,
    /// `(path, status)` for every manifest entry, in manifest order.
    pub entries: Vec<(String, EntryStatus)>,
}

impl PackageReport {
    /// What: `true` if every manifest entry checked out.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.entries.iter().all(|(_, status)| matches!(status, EntryStatus::Ok))
    }

    /// What: The entries that did not check out.
    pub fn failures(&self) -> impl Iterator<Item = &(String, EntryStatus)> {
        self.entries.iter().filter(|(_, status)| !matches!(status, EntryStatus::Ok))
    }
}

/// What: Re-hash every file `files` names, under `root`, and compare against
/// the recorded digest.
///
/// Details:
/// - Every entry is visited regardless of earlier failures, so one report
///   always names every broken file rather than stopping at the first.
#[must_use]
pub fn check_package(root: &Path, pkgname: &str, files: &[FileEntry]) -> PackageReport {
    let entries = files
        .iter()
        .map(|file| {
            let status = match std::fs::read(root.join(&file.path)) {
                Ok(contents) => {
                    let actual = archive::sha256_hex(&contents);
                    if actual.eq_ignore_ascii_case(&file.sha256) {
                        EntryStatus::Ok
                    } else {
                        EntryStatus::Mismatch {
                            expected: file.sha256.clone(),
                            actual,
                        }
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => EntryStatus::Missing,
                Err(err) => EntryStatus::Unreadable(err.to_string()),
            };
            (file.path.clone(), status)
        })
        .collect();
    PackageReport {
        pkgname: pkgname.to_string(),
        entries,
    }
}

/// What: Check every installed package under `root`.
#[must_use]
pub fn check_all(root: &Path, registry: &RegistryDocument) -> Vec<PackageReport> {
    registry
        .packages
        .iter()
        .map(|p| check_package(root, p.pkgname(), &p.files))
        .collect()
}
