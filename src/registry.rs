//! Scoped ownership of the installed-package registry, replacing the
//! reference implementation's process-wide singleton (§9 Design Notes).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::Result;
use crate::index::RegistryDocument;
use crate::plist;

/// The advisory-locked, in-memory owner of one root's installed registry.
///
/// Acquired with [`RegistryHandle::prepare`], mutated in place, and released
/// either explicitly with [`RegistryHandle::release`] or implicitly on
/// `Drop`. Not `Sync`: the design assumes one owner at a time within the
/// process (§5 single-writer assumption).
pub struct RegistryHandle {
    /// In-memory registry document, mutated by callers and flushed on release.
    pub document: RegistryDocument,
    /// Path to `regpkgdb.plist` under the target root.
    path: PathBuf,
    /// Advisory exclusive lock held for the handle's lifetime.
    lock_file: File,
}

impl RegistryHandle {
    /// What: Acquire the registry for a given root, taking an exclusive
    /// advisory lock and loading its current contents.
    ///
    /// Inputs:
    /// - `root`: installation root; the registry lives at
    ///   `root/var/db/xbps/regpkgdb.plist`.
    ///
    /// Output:
    /// - `Ok(RegistryHandle)` once the lock is held and the document loaded
    ///   (a missing registry file is treated as an empty, fresh document).
    /// - `Err(Error::Io)` if the metadata directory cannot be created, the
    ///   lock file cannot be opened, or the lock cannot be acquired.
    pub fn prepare(root: &Path) -> Result<Self> {
        let dir = root.join("var/db/xbps");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("regpkgdb.plist");

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join("regpkgdb.lock"))?;
        lock_file.lock_exclusive()?;

        let document = if path.exists() {
            RegistryDocument::from_node(&plist::load(&path)?)?
        } else {
            RegistryDocument::new()
        };

        Ok(Self { document, path, lock_file })
    }

    /// What: Flush the in-memory document to disk, atomically.
    ///
    /// Details:
    /// - Uses [`plist::store`], so a crash mid-write never corrupts the
    ///   previous registry (§4.2 durability contract).
    pub fn flush(&self) -> Result<()> {
        plist::store(&self.path, &self.document.to_node())
    }

    /// What: Flush and release the advisory lock, consuming the handle.
    ///
    /// Details:
    /// - Equivalent to letting the handle drop, but surfaces the final
    ///   flush's `Result` to the caller instead of discarding it.
    pub fn release(self) -> Result<()> {
        self.flush()
    }
}

impl Drop for RegistryHandle {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::error!(error = %err, path = %self.path.display(), "failed to flush registry on drop");
        }
        if let Err(err) = FileExt::unlock(&self.lock_file) {
            tracing::error!(error = %err, "failed to release registry lock");
        }
    }
}
