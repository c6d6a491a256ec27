//! The two documents built over the plist store: a repository index and the
//! installed-package registry, plus the repository-list document.

use crate::error::{Error, Result};
use crate::plist::Node;
use crate::types::{InstalledDescriptor, PackageDescriptor};

/// Current value of the `pkgindex-version` field written to every index.
pub const PKGINDEX_VERSION: &str = "1.0";

/// A repository-level document enumerating descriptors for one on-disk
/// archive collection.
///
/// Invariant I1: `pkgname` is unique within `packages`. Invariant I2:
/// `total_pkgs()` always equals `packages.len()` — the field is recomputed
/// on serialization rather than tracked separately, so it cannot drift.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexDocument {
    /// Format version; currently always [`PKGINDEX_VERSION`].
    pub pkgindex_version: String,
    /// Absolute path of the directory this index was built from.
    pub location_local: String,
    /// Descriptors, in insertion order.
    pub packages: Vec<PackageDescriptor>,
}

impl IndexDocument {
    /// What: Construct a fresh, empty index rooted at `location_local`.
    #[must_use]
    pub fn new(location_local: impl Into<String>) -> Self {
        Self {
            pkgindex_version: PKGINDEX_VERSION.to_string(),
            location_local: location_local.into(),
            packages: Vec::new(),
        }
    }

    /// What: The cached `total-pkgs` value (invariant I2).
    #[must_use]
    pub fn total_pkgs(&self) -> usize {
        self.packages.len()
    }

    /// What: Convert this document to its [`Node`] representation.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = Node::dict();
        dict.set("pkgindex-version", Node::from(self.pkgindex_version.as_str()));
        dict.set("location-local", Node::from(self.location_local.as_str()));
        dict.set(
            "packages",
            Node::Array(self.packages.iter().map(PackageDescriptor::to_node).collect()),
        );
        dict.set("total-pkgs", Node::from(self.total_pkgs() as i64));
        dict
    }

    /// What: Parse an index document out of its [`Node`] representation.
    pub fn from_node(node: &Node) -> Result<Self> {
        let packages = node
            .get("packages")
            .and_then(Node::as_array)
            .map(|arr| arr.iter().map(PackageDescriptor::from_node).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            pkgindex_version: node
                .get("pkgindex-version")
                .and_then(Node::as_str)
                .unwrap_or(PKGINDEX_VERSION)
                .to_string(),
            location_local: node.require_str("location-local")?.to_string(),
            packages,
        })
    }
}

/// The installation-local document enumerating installed descriptors and
/// their states.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistryDocument {
    /// Installed descriptors, in insertion order.
    pub packages: Vec<InstalledDescriptor>,
}

impl RegistryDocument {
    /// What: Construct an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { packages: Vec::new() }
    }

    /// What: Convert this document to its [`Node`] representation.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = Node::dict();
        dict.set(
            "packages",
            Node::Array(self.packages.iter().map(InstalledDescriptor::to_node).collect()),
        );
        dict
    }

    /// What: Parse a registry document out of its [`Node`] representation.
    pub fn from_node(node: &Node) -> Result<Self> {
        let packages = node
            .get("packages")
            .and_then(Node::as_array)
            .map(|arr| {
                arr.iter()
                    .map(InstalledDescriptor::from_node)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();
        Ok(Self { packages })
    }
}

/// The ranked repository list: earlier entries win priority ties, entries
/// are unique and case-sensitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepositoryList {
    /// Repository URIs or local paths, in priority order.
    pub repositories: Vec<String>,
}

impl RepositoryList {
    /// What: Construct an empty repository list.
    #[must_use]
    pub const fn new() -> Self {
        Self { repositories: Vec::new() }
    }

    /// What: Append `uri` to the end of the list (lowest priority).
    ///
    /// Output:
    /// - `Err(Error::Duplicate)` if `uri` is already registered.
    pub fn register(&mut self, uri: &str) -> Result<()> {
        if self.repositories.iter().any(|r| r == uri) {
            return Err(Error::Duplicate(uri.to_string()));
        }
        self.repositories.push(uri.to_string());
        Ok(())
    }

    /// What: Remove `uri` from the list.
    ///
    /// Output:
    /// - `Err(Error::NotFound)` if `uri` was not registered.
    pub fn unregister(&mut self, uri: &str) -> Result<()> {
        let idx = self
            .repositories
            .iter()
            .position(|r| r == uri)
            .ok_or_else(|| Error::NotFound(uri.to_string()))?;
        self.repositories.remove(idx);
        Ok(())
    }

    /// What: Convert this list to its [`Node`] representation.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = Node::dict();
        dict.set(
            "repository-list",
            Node::Array(self.repositories.iter().map(|r| Node::from(r.as_str())).collect()),
        );
        dict
    }

    /// What: Parse a repository list out of its [`Node`] representation.
    pub fn from_node(node: &Node) -> Result<Self> {
        let repositories = node
            .get("repository-list")
            .and_then(Node::as_array)
            .map(|arr| arr.iter().filter_map(Node::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        Ok(Self { repositories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(pkgname: &str, version: &str) -> PackageDescriptor {
        PackageDescriptor {
            pkgname: pkgname.to_string(),
            version: version.to_string(),
            short_desc: String::new(),
            architecture: "noarch".to_string(),
            run_depends: Vec::new(),
            filename: None,
            filename_sha256: None,
            filename_size: None,
        }
    }

    #[test]
    fn total_pkgs_tracks_packages_len() {
        let mut index = IndexDocument::new("/srv/repo");
        assert_eq!(index.total_pkgs(), 0);
        index.packages.push(descriptor("foo", "1.0"));
        assert_eq!(index.total_pkgs(), 1);
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn index_round_trips_through_node() {
        let mut index = IndexDocument::new("/srv/repo");
        index.packages.push(descriptor("foo", "1.0"));
        let node = index.to_node();
        let parsed = IndexDocument::from_node(&node).unwrap();
        assert_eq!(index, parsed);
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn repository_list_rejects_duplicate_register() {
        let mut list = RepositoryList::new();
        list.register("https://repo.example/current").unwrap();
        assert!(matches!(
            list.register("https://repo.example/current"),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn repository_list_unregister_rejects_unknown_uri() {
        let mut list = RepositoryList::new();
        assert!(matches!(
            list.unregister("https://nowhere.example"),
            Err(Error::NotFound(_))
        ));
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn repository_list_round_trips() {
        let mut list = RepositoryList::new();
        list.register("a").unwrap();
        list.register("b").unwrap();
        let node = list.to_node();
        let parsed = RepositoryList::from_node(&node).unwrap();
        assert_eq!(list, parsed);
    }
}
