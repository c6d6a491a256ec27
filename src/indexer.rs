//! Repository index builder: scans a directory of archives and extracts
//! their metadata into a repository index document (§4.4).

use std::path::{Path, PathBuf};

use crate::archive;
use crate::error::Result;
use crate::index::{self, IndexDocument, PKGINDEX_VERSION};
use crate::plist;
use crate::types::PackageDescriptor;

/// Basename of the on-disk index file within a scanned directory (§6).
const INDEX_FILENAME: &str = "pkg-index.plist";

/// Outcome of one [`build`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Archives successfully added or replaced.
    pub updated: usize,
    /// Archives skipped because they were malformed or missing a descriptor.
    pub skipped: usize,
}

/// What: Build or update the repository index for directory `dir`.
///
/// Inputs:
/// - `dir`: repository root; subdirectories named `arch` or `noarch` are
///   scanned for `*.xbps` archives.
/// - `arch`: the host architecture tag (e.g. `x86_64`).
///
/// Output:
/// - A [`Summary`] of how many archives were indexed or skipped.
///
/// Details:
/// - A malformed archive or one missing `props.plist` is logged via
///   `tracing::warn!` and skipped rather than aborting the scan. An I/O
///   error writing the index back out is fatal and propagates.
/// - Equal-version archives keep the existing entry (idempotence, §4.3);
///   running this twice on an unchanged directory reproduces the same
///   index bytes.
pub fn build(dir: &Path, arch: &str) -> Result<Summary> {
    let index_path = dir.join(INDEX_FILENAME);
    let mut document = if index_path.exists() {
        IndexDocument::from_node(&plist::load(&index_path)?)?
    } else {
        IndexDocument::new(dir.to_string_lossy().into_owned())
    };

    let mut summary = Summary::default();
    for subdir_name in [arch, "noarch"] {
        let subdir = dir.join(subdir_name);
        if !subdir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&subdir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xbps") {
                continue;
            }
            match index_one(&path) {
                Ok(descriptor) => {
                    index::replace_if_newer(&mut document, descriptor);
                    plist::store(&index_path, &document.to_node())?;
                    summary.updated += 1;
                }
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "skipping archive");
                    summary.skipped += 1;
                }
            }
        }
    }

    Ok(summary)
}

/// What: Extract a fully populated descriptor (including the three
/// index-only fields) from one archive.
fn index_one(path: &Path) -> Result<PackageDescriptor> {
    let bytes = archive::read_file(path)?;
    let props = archive::read_named_entry(&bytes, archive::PROPS_ENTRY)?
        .ok_or_else(|| crate::error::Error::MissingField(archive::PROPS_ENTRY.to_string()))?;
    let node = plist::load_bytes(&props)?;
    let mut descriptor = PackageDescriptor::from_node(&node)?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    descriptor.filename = Some(filename);
    descriptor.filename_sha256 = Some(archive::sha256_hex(&bytes));
    descriptor.filename_size = Some(bytes.len() as u64);

    Ok(descriptor)
}

/// What: Path to the on-disk index file for directory `dir`.
#[must_use]
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILENAME)
}

/// What: Index-document format version this builder writes.
#[must_use]
pub const fn format_version() -> &'static str {
    PKGINDEX_VERSION
}
