//! Process-wide configuration: target root, verbosity, and the force flag,
//! assembled from CLI flags (§10 Ambient stack).
//!
//! Mirrors the teacher crate's builder-configuration-object shape: a plain
//! struct with chained setters and a `build` that can never fail, since every
//! field here has a total default.

use std::path::{Path, PathBuf};

use crate::root::RootHandle;

/// Verbosity level selected by stacking `-v` flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No `-v` given: warnings and errors only.
    #[default]
    Quiet,
    /// One `-v`: info-level events too.
    Verbose,
    /// Two or more `-v`: debug-level events too.
    Debug,
}

impl Verbosity {
    /// What: Map a stacked flag count to a level.
    #[must_use]
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Quiet,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// What: The `tracing` filter directive this level corresponds to.
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Resolved configuration a command runs under.
#[derive(Clone, Debug)]
pub struct Config {
    root: RootHandle,
    verbosity: Verbosity,
    force: bool,
}

impl Config {
    /// What: Start building a [`Config`] from its compiled-in defaults
    /// (`-r /`, quiet, unforced).
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// What: The resolved installation root.
    #[must_use]
    pub fn root(&self) -> &RootHandle {
        &self.root
    }

    /// What: The resolved verbosity level.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// What: `true` if confirmations and reverse-dependency warnings should
    /// be skipped.
    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }
}

/// Builder for [`Config`], one setter per CLI flag in §6.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    root: Option<PathBuf>,
    verbosity: Verbosity,
    force: bool,
}

impl ConfigBuilder {
    /// What: Set the `-r ROOT` flag value.
    #[must_use]
    pub fn root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// What: Set the verbosity level from a stacked `-v` count.
    #[must_use]
    pub const fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// What: Set the `-f` force flag.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// What: Finish building, resolving the root per [`RootHandle::resolve`].
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            root: RootHandle::resolve(self.root.as_deref()),
            verbosity: self.verbosity,
            force: self.force,
        }
    }
}
