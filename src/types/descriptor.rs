//! Package descriptor types: the dictionary shape shared by repository
//! indexes and the installed registry.

use crate::error::{Error, Result};
use crate::plist::Node;
use crate::state::PackageState;

/// One package's identity, dependencies, and (in an index) archive locator.
///
/// This is the `packages[]` element described in the data model: every
/// required field from the spec's descriptor table, plus the three
/// index-only fields (`filename`, `filename-sha256`, `filename-size`), which
/// are `None` until the index builder or transaction engine fills them in.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageDescriptor {
    /// Stable identifier, unique per repository and per installation.
    pub pkgname: String,
    /// Version string under the §4.1 grammar.
    pub version: String,
    /// Human summary.
    pub short_desc: String,
    /// Target machine tag, or the literal `noarch`.
    pub architecture: String,
    /// Dependency predicates: `name op version`, or a bare `name`.
    pub run_depends: Vec<String>,
    /// Archive basename (index only).
    pub filename: Option<String>,
    /// Hex SHA-256 digest of the archive bytes (index only).
    pub filename_sha256: Option<String>,
    /// Byte length of the archive (index only).
    pub filename_size: Option<u64>,
}

impl PackageDescriptor {
    /// What: Derive this descriptor's `pkgver` (`pkgname-version`).
    #[must_use]
    pub fn pkgver(&self) -> String {
        format!("{}-{}", self.pkgname, self.version)
    }

    /// What: Convert this descriptor to its dictionary [`Node`] representation.
    ///
    /// Details:
    /// - `pkgver` is written out even though it is derivable, matching the
    ///   data model's "derived, but stored" note for that field.
    /// - Index-only fields are omitted when absent rather than written as
    ///   null, so a freshly-parsed archive descriptor round-trips cleanly
    ///   before the indexer fills them in.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = Node::dict();
        dict.set("pkgname", Node::from(self.pkgname.as_str()));
        dict.set("version", Node::from(self.version.as_str()));
        dict.set("pkgver", Node::from(self.pkgver()));
        dict.set("short_desc", Node::from(self.short_desc.as_str()));
        dict.set("architecture", Node::from(self.architecture.as_str()));
        dict.set(
            "run_depends",
            Node::Array(self.run_depends.iter().map(|d| Node::from(d.as_str())).collect()),
        );
        if let Some(filename) = &self.filename {
            dict.set("filename", Node::from(filename.as_str()));
        }
        if let Some(sha256) = &self.filename_sha256 {
            dict.set("filename-sha256", Node::from(sha256.as_str()));
        }
        if let Some(size) = self.filename_size {
            dict.set("filename-size", Node::from(size));
        }
        dict
    }

    /// What: Parse a descriptor out of its dictionary [`Node`] representation.
    ///
    /// Output:
    /// - `Err(Error::MissingField)` naming the first required field absent.
    pub fn from_node(node: &Node) -> Result<Self> {
        let run_depends = node
            .require_array("run_depends")
            .map(|arr| {
                arr.iter()
                    .filter_map(Node::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            pkgname: node.require_str("pkgname")?.to_string(),
            version: node.require_str("version")?.to_string(),
            short_desc: node.get("short_desc").and_then(Node::as_str).unwrap_or("").to_string(),
            architecture: node
                .get("architecture")
                .and_then(Node::as_str)
                .unwrap_or("noarch")
                .to_string(),
            run_depends,
            filename: node.get("filename").and_then(Node::as_str).map(str::to_string),
            filename_sha256: node
                .get("filename-sha256")
                .and_then(Node::as_str)
                .map(str::to_string),
            filename_size: node.get("filename-size").and_then(Node::as_u64),
        })
    }
}

/// A single entry of an installed package's files manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    /// Path relative to the installation root.
    pub path: String,
    /// Hex SHA-256 digest of the file's content at install time.
    pub sha256: String,
    /// Whether this file is user-modifiable configuration, preserved across
    /// removal and upgrade rather than deleted (supplement to the bare
    /// `{path, sha256}` pair named in the data model).
    pub mutable: bool,
}

impl FileEntry {
    /// What: Convert this manifest entry to its [`Node`] representation.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = Node::dict();
        dict.set("path", Node::from(self.path.as_str()));
        dict.set("sha256", Node::from(self.sha256.as_str()));
        dict.set("mutable", Node::from(self.mutable));
        dict
    }

    /// What: Parse a manifest entry out of its [`Node`] representation.
    pub fn from_node(node: &Node) -> Result<Self> {
        Ok(Self {
            path: node.require_str("path")?.to_string(),
            sha256: node.require_str("sha256")?.to_string(),
            mutable: node.get("mutable").and_then(Node::as_bool).unwrap_or(false),
        })
    }
}

/// An installed package: a [`PackageDescriptor`] plus the registry-only
/// bookkeeping fields described by invariants I4-I6.
#[derive(Clone, Debug, PartialEq)]
pub struct InstalledDescriptor {
    /// The package's identity and dependency facts.
    pub descriptor: PackageDescriptor,
    /// Lifecycle state (§4.6).
    pub state: PackageState,
    /// `true` if installed only to satisfy a dependency (invariant I5).
    pub automatic_install: bool,
    /// `pkgver` of every installed package that depends on this one (invariant I4).
    pub requiredby: Vec<String>,
    /// Manifest of files this package placed in the root.
    pub files: Vec<FileEntry>,
}

impl InstalledDescriptor {
    /// What: Convert this installed descriptor to its [`Node`] representation.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let mut dict = self.descriptor.to_node();
        dict.set("state", Node::from(self.state.as_str()));
        dict.set("automatic-install", Node::from(self.automatic_install));
        dict.set(
            "requiredby",
            Node::Array(self.requiredby.iter().map(|r| Node::from(r.as_str())).collect()),
        );
        dict.set(
            "files",
            Node::Array(self.files.iter().map(FileEntry::to_node).collect()),
        );
        dict
    }

    /// What: Parse an installed descriptor out of its [`Node`] representation.
    pub fn from_node(node: &Node) -> Result<Self> {
        let descriptor = PackageDescriptor::from_node(node)?;
        let state = PackageState::parse(node.require_str("state")?)?;
        let automatic_install = node
            .get("automatic-install")
            .and_then(Node::as_bool)
            .unwrap_or(false);
        let requiredby = node
            .get("requiredby")
            .and_then(Node::as_array)
            .map(|arr| arr.iter().filter_map(Node::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        let files = node
            .get("files")
            .and_then(Node::as_array)
            .map(|arr| arr.iter().map(FileEntry::from_node).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            descriptor,
            state,
            automatic_install,
            requiredby,
            files,
        })
    }

    /// What: Shorthand for `self.descriptor.pkgname`.
    #[must_use]
    pub fn pkgname(&self) -> &str {
        &self.descriptor.pkgname
    }

    /// What: Shorthand for `self.descriptor.pkgver()`.
    #[must_use]
    pub fn pkgver(&self) -> String {
        self.descriptor.pkgver()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackageDescriptor {
        PackageDescriptor {
            pkgname: "foo".to_string(),
            version: "1.0_1".to_string(),
            short_desc: "the foo package".to_string(),
            architecture: "x86_64".to_string(),
            run_depends: vec!["bar>=1.0".to_string()],
            filename: Some("foo-1.0_1.x86_64.xbps".to_string()),
            filename_sha256: Some("deadbeef".to_string()),
            filename_size: Some(1024),
        }
    }

    #[test]
    fn pkgver_concatenates_name_and_version() {
        assert_eq!(sample().pkgver(), "foo-1.0_1");
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn descriptor_round_trips_through_node() {
        let descriptor = sample();
        let node = descriptor.to_node();
        let parsed = PackageDescriptor::from_node(&node).unwrap();
        assert_eq!(descriptor, parsed);
    }

    #[test]
    fn from_node_rejects_missing_pkgname() {
        let node = Node::dict();
        assert!(matches!(
            PackageDescriptor::from_node(&node),
            Err(Error::MissingField(_))
        ));
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn installed_descriptor_round_trips() {
        let installed = InstalledDescriptor {
            descriptor: sample(),
            state: PackageState::Installed,
            automatic_install: true,
            requiredby: vec!["baz-2.0".to_string()],
            files: vec![FileEntry {
                path: "/usr/bin/foo".to_string(),
                sha256: "cafebabe".to_string(),
                mutable: false,
            }],
        };
        let node = installed.to_node();
        let parsed = InstalledDescriptor::from_node(&node).unwrap();
        assert_eq!(installed, parsed);
    }
}
