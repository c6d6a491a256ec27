//! Repository-list maintenance: register, unregister, and load the ranked
//! list of repositories a root consults.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::index::RepositoryList;
use crate::plist;

/// What: Path to the compressed repository-list document under `root`.
fn repositories_path(root: &Path) -> PathBuf {
    root.join("var/db/xbps/repositories.plist")
}

/// What: Load the repository list for `root`, or an empty list if none
/// exists yet.
pub fn load(root: &Path) -> Result<RepositoryList> {
    let path = repositories_path(root);
    if path.exists() {
        RepositoryList::from_node(&plist::load_compressed(&path)?)
    } else {
        Ok(RepositoryList::new())
    }
}

/// What: Persist `list` for `root`.
pub fn save(root: &Path, list: &RepositoryList) -> Result<()> {
    let path = repositories_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    plist::store_compressed(&path, &list.to_node())
}

/// What: Register a repository URI for `root`, persisting the change.
///
/// Output:
/// - `Err(Error::Duplicate)` if the URI is already registered.
pub fn register(root: &Path, uri: &str) -> Result<()> {
    let mut list = load(root)?;
    list.register(uri)?;
    tracing::info!(uri, "registered repository");
    save(root, &list)
}

/// What: Unregister a repository URI for `root`, persisting the change.
///
/// Output:
/// - `Err(Error::NotFound)` if the URI was not registered.
pub fn unregister(root: &Path, uri: &str) -> Result<()> {
    let mut list = load(root)?;
    list.unregister(uri)?;
    tracing::info!(uri, "unregistered repository");
    save(root, &list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn register_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        register(dir.path(), "https://repo.example/current").unwrap();
        let list = load(dir.path()).unwrap();
        assert_eq!(list.repositories, vec!["https://repo.example/current".to_string()]);
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn unregister_removes_previously_registered_uri() {
        let dir = TempDir::new().unwrap();
        register(dir.path(), "https://repo.example/current").unwrap();
        unregister(dir.path(), "https://repo.example/current").unwrap();
        let list = load(dir.path()).unwrap();
        assert!(list.repositories.is_empty());
    }

    #[test]
    fn load_on_fresh_root_yields_empty_list() {
        let dir = TempDir::new().expect("tempdir");
        let list = load(dir.path()).expect("load succeeds");
        assert!(list.repositories.is_empty());
    }
}
