//! Compression-auto-detecting tar archive reader shared by the index
//! builder and the transaction engine.
//!
//! Archives carry two fixed metadata entries (`props.plist`, `files.plist`)
//! and optional `INSTALL`/`REMOVE` scripts, on top of the package's regular
//! file tree (§6 archive format).

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Basename of the package descriptor entry every archive must carry.
pub const PROPS_ENTRY: &str = "props.plist";
/// Basename of the files-manifest entry every archive must carry.
pub const FILES_ENTRY: &str = "files.plist";

/// Compression detected from an archive's leading bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Compression {
    /// `\x1f\x8b` magic.
    Gzip,
    /// `BZh` magic.
    Bzip2,
    /// Neither magic matched; treated as an uncompressed tar stream.
    None,
}

/// What: Detect an archive's compression from its leading bytes.
fn detect(bytes: &[u8]) -> Compression {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        Compression::Gzip
    } else if bytes.starts_with(b"BZh") {
        Compression::Bzip2
    } else {
        Compression::None
    }
}

/// What: Wrap `bytes` in a [`tar::Archive`] over the appropriate decompressor.
fn archive_over(bytes: &[u8]) -> tar::Archive<Box<dyn Read + '_>> {
    let reader: Box<dyn Read> = match detect(bytes) {
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(bytes)),
        Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(bytes)),
        Compression::None => Box::new(bytes),
    };
    tar::Archive::new(reader)
}

/// What: Read an archive file fully into memory.
///
/// Details:
/// - Archives in this system are package-scale (single packages, not whole
///   repositories), so reading them whole rather than streaming keeps the
///   entry walk and the hash computation both simple and single-pass.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// What: Compute the hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// What: Find the first entry whose path ends with `basename` and return its
/// contents.
///
/// Output:
/// - `Ok(Some(contents))` if found.
/// - `Ok(None)` if no entry matches.
/// - `Err(Error::Io)` on a malformed or truncated tar stream.
pub fn read_named_entry(bytes: &[u8], basename: &str) -> Result<Option<Vec<u8>>> {
    let mut archive = archive_over(bytes);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.to_path_buf();
        if entry_path.file_name().and_then(|n| n.to_str()) == Some(basename) {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            return Ok(Some(contents));
        }
    }
    Ok(None)
}

/// A regular file unpacked from an archive onto disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpackedFile {
    /// Path relative to the unpack destination.
    pub path: String,
    /// Hex SHA-256 digest of the file's content.
    pub sha256: String,
}

/// What: Stream every regular file in `bytes` onto `dest`, skipping the
/// fixed metadata entries and any install/remove scripts.
///
/// Inputs:
/// - `bytes`: full archive contents, as read by [`read_file`].
/// - `dest`: destination root; entries are written at `dest/entry_path`.
///
/// Output:
/// - The manifest of unpacked regular files, each with its SHA-256 digest
///   computed from the bytes actually written (§4.7 unpack phase step b).
///
/// Details:
/// - `props.plist`, `files.plist`, `INSTALL`, and `REMOVE` are metadata the
///   transaction engine consumes directly; they are never written into the
///   target root's file tree.
pub fn unpack(bytes: &[u8], dest: &Path) -> Result<Vec<UnpackedFile>> {
    const SKIPPED: [&str; 4] = [PROPS_ENTRY, FILES_ENTRY, "INSTALL", "REMOVE"];

    let mut archive = archive_over(bytes);
    let mut manifest = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry.path()?.to_path_buf();
        let basename = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if SKIPPED.contains(&basename) {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;

        let out_path = dest.join(&entry_path);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out_path, &contents)?;

        manifest.push(UnpackedFile {
            path: entry_path.to_string_lossy().into_owned(),
            sha256: sha256_hex(&contents),
        });
    }
    Ok(manifest)
}

/// What: Verify `bytes`'s SHA-256 digest matches `expected_sha256`.
///
/// Output:
/// - `Err(Error::Integrity)` naming `pkgver` on mismatch.
pub fn verify_sha256(bytes: &[u8], expected_sha256: &str, pkgver: &str) -> Result<()> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected_sha256) {
        Ok(())
    } else {
        Err(Error::Integrity {
            pkgver: pkgver.to_string(),
            reason: format!("sha256 mismatch: expected {expected_sha256}, got {actual}"),
        })
    }
}
