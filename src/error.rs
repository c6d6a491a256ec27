//! Unified error type for xbps-rs.

use thiserror::Error;

/// Unified error type for all xbps-rs operations.
///
/// This error type covers every failure mode surfaced by the core: the plist
/// store, the index model, the resolver, and the transaction engine. Each
/// variant below corresponds to one of the error kinds named in the
/// error-handling design: `not-found`, `unsatisfiable-constraint`, `cycle`,
/// `integrity`, `script-failed`, `state-invalid`, `io`, `malformed-plist`, or
/// `duplicate`.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem or archive I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The plist serializer could not parse a document.
    #[error("malformed plist: {0}")]
    MalformedPlist(#[from] plist::Error),

    /// A required field was absent from a node tree, or had the wrong kind.
    #[error("malformed plist: missing or mismatched field `{0}`")]
    MissingField(String),

    /// Name absent from both the installed registry and all configured repositories.
    #[error("package not found: {0}")]
    NotFound(String),

    /// No descriptor across the ranked repository list satisfies the
    /// intersection of every predicate imposed on a dependency.
    #[error("no version of `{0}` satisfies the required constraints")]
    UnsatisfiableConstraint(String),

    /// The resolver's recursion stack encountered a name it had not yet
    /// finished resolving, naming every package in the cycle.
    #[error("dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// A second descriptor with an existing `pkgname` was added to an index,
    /// or two repositories disagree on the hash of the same `pkgname`/`version` pair.
    #[error("duplicate package: {0}")]
    Duplicate(String),

    /// Archive bytes did not match the index descriptor's `filename-sha256`,
    /// or fewer bytes were read than the descriptor's `filename-size` promised.
    #[error("integrity check failed for {pkgver}: {reason}")]
    Integrity {
        /// `pkgname-version` of the affected package.
        pkgver: String,
        /// Human-readable description (hash mismatch, short read, missing file).
        reason: String,
    },

    /// An `INSTALL`/`REMOVE` script exited with a nonzero status.
    #[error("{script} {phase} script for {pkgver} failed with exit code {code}")]
    ScriptFailed {
        /// `pkgname-version` of the package whose script failed.
        pkgver: String,
        /// Which script ran: `INSTALL` or `REMOVE`.
        script: &'static str,
        /// Which phase ran: `pre` or `post`.
        phase: &'static str,
        /// Process exit code, or -1 if terminated by a signal.
        code: i32,
    },

    /// A requested state transition is not permitted by the package lifecycle.
    #[error("invalid state transition for {pkgname}: {from:?} -> {to:?}")]
    StateInvalid {
        /// Package the transition was attempted on.
        pkgname: String,
        /// State the package was in.
        from: crate::state::PackageState,
        /// State the transition targeted.
        to: crate::state::PackageState,
    },

    /// Invalid input, such as an unparsable dependency predicate.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for xbps-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// What: Map an error to a stable process exit code for the CLI front-end.
    ///
    /// Inputs:
    /// - `self`: the error to classify.
    ///
    /// Output:
    /// - A nonzero exit code; distinct kinds map to distinct codes but the
    ///   mapping itself is not part of any on-disk contract.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 2,
            Self::UnsatisfiableConstraint(_) => 3,
            Self::Cycle(_) => 4,
            Self::Duplicate(_) => 5,
            Self::Integrity { .. } => 6,
            Self::ScriptFailed { .. } => 7,
            Self::StateInvalid { .. } => 8,
            Self::Io(_) => 9,
            Self::MalformedPlist(_) | Self::MissingField(_) => 10,
            Self::InvalidInput(_) => 11,
        }
    }
}
