//! Target-root resolution: the directory every on-disk layout in §6 is
//! rooted at.

use std::path::{Path, PathBuf};

/// The installation root a command operates against.
///
/// Precedence is fixed and simple (§6): the `-r` CLI flag wins when given,
/// otherwise the compiled-in default of `/` applies. No environment
/// variable is consulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootHandle {
    path: PathBuf,
}

impl RootHandle {
    /// What: Resolve the root from an optional `-r` flag value.
    ///
    /// Inputs:
    /// - `flag`: the `-r` argument, if the caller passed one.
    ///
    /// Output:
    /// - `RootHandle` wrapping `flag` when present, else `/`.
    #[must_use]
    pub fn resolve(flag: Option<&Path>) -> Self {
        Self {
            path: flag.map_or_else(|| PathBuf::from("/"), Path::to_path_buf),
        }
    }

    /// What: Borrow the resolved root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What: Join a root-relative path onto this root.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }
}

impl Default for RootHandle {
    fn default() -> Self {
        Self::resolve(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_slash_when_no_flag_given() {
        assert_eq!(RootHandle::resolve(None).path(), Path::new("/"));
    }

    #[test]
    fn flag_takes_precedence_over_default() {
        let root = RootHandle::resolve(Some(Path::new("/mnt/target")));
        assert_eq!(root.path(), Path::new("/mnt/target"));
    }

    #[test]
    fn join_appends_relative_path_to_root() {
        let root = RootHandle::resolve(Some(Path::new("/mnt/target")));
        assert_eq!(root.join("var/db/xbps"), Path::new("/mnt/target/var/db/xbps"));
    }
}
