//! Per-package lifecycle state machine.
//!
//! The state is persisted as a string alongside every installed descriptor in
//! the registry (invariant I6). Every transition here is total: attempting a
//! transition the machine does not permit returns [`Error::StateInvalid`]
//! rather than silently applying it.

use crate::error::{Error, Result};
use std::fmt;

/// Lifecycle state of one installed package.
///
/// `NOT_INSTALLED` is implicit: a package in that state simply has no
/// descriptor in the registry, so it has no corresponding variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackageState {
    /// Archive extracted, pre-install actions run, files manifest registered,
    /// but the post-install script has not yet confirmed success.
    Unpacked,
    /// Fully installed: the post-install script ran and exited zero.
    Installed,
    /// The post-install script failed; operator must retry reconfigure or remove.
    Broken,
    /// Removed without purge: package files are gone but config files and the
    /// descriptor remain so a later reinstall does not lose customization.
    ConfigFiles,
}

impl PackageState {
    /// What: Parse a state from its on-disk string representation.
    ///
    /// Inputs:
    /// - `s`: the string stored under the `state` key of an installed descriptor.
    ///
    /// Output:
    /// - `Ok(PackageState)` for a recognized string.
    /// - `Err(Error::MissingField)` for anything else, since an unrecognized
    ///   state string breaks invariant I6.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "unpacked" => Ok(Self::Unpacked),
            "installed" => Ok(Self::Installed),
            "broken" => Ok(Self::Broken),
            "config-files" => Ok(Self::ConfigFiles),
            other => Err(Error::MissingField(format!("state: {other}"))),
        }
    }

    /// What: Render the state to the string stored in the registry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpacked => "unpacked",
            Self::Installed => "installed",
            Self::Broken => "broken",
            Self::ConfigFiles => "config-files",
        }
    }

    /// What: Check whether a transition from `self` to `to` is permitted.
    ///
    /// Inputs:
    /// - `self`: current state.
    /// - `to`: proposed next state.
    ///
    /// Output:
    /// - `true` if the transition matches one of the machine's edges:
    ///   `Unpacked -> Installed`, `Unpacked -> Broken`,
    ///   `Installed -> ConfigFiles`, or any state `-> Unpacked` (re-entering
    ///   unpack on upgrade).
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Unpacked, Self::Installed)
                | (Self::Unpacked, Self::Broken)
                | (Self::Installed, Self::ConfigFiles)
                | (_, Self::Unpacked)
        )
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What: Validate and describe a state transition for a named package.
///
/// Inputs:
/// - `pkgname`: package the transition applies to, used only for error context.
/// - `from`: state the package is currently in.
/// - `to`: state being requested.
///
/// Output:
/// - `Ok(to)` when the machine permits the edge `from -> to`.
/// - `Err(Error::StateInvalid)` otherwise.
///
/// Details:
/// - Callers write the returned state into the registry; this function itself
///   performs no I/O, keeping the machine pure and easy to test (I6).
pub fn transition(pkgname: &str, from: PackageState, to: PackageState) -> Result<PackageState> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(Error::StateInvalid {
            pkgname: pkgname.to_string(),
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacked_to_installed_is_valid() {
        assert!(transition("foo", PackageState::Unpacked, PackageState::Installed).is_ok());
    }

    #[test]
    fn unpacked_to_broken_is_valid() {
        assert!(transition("foo", PackageState::Unpacked, PackageState::Broken).is_ok());
    }

    #[test]
    fn installed_to_config_files_is_valid() {
        assert!(transition("foo", PackageState::Installed, PackageState::ConfigFiles).is_ok());
    }

    #[test]
    fn any_state_to_unpacked_is_valid() {
        for from in [
            PackageState::Unpacked,
            PackageState::Installed,
            PackageState::Broken,
            PackageState::ConfigFiles,
        ] {
            assert!(transition("foo", from, PackageState::Unpacked).is_ok());
        }
    }

    #[test]
    fn installed_to_broken_is_invalid() {
        let err = transition("foo", PackageState::Installed, PackageState::Broken).unwrap_err();
        assert!(matches!(err, Error::StateInvalid { .. }));
    }

    #[test]
    fn config_files_to_installed_is_invalid() {
        assert!(transition("foo", PackageState::ConfigFiles, PackageState::Installed).is_err());
    }

    #[test]
    fn broken_to_config_files_is_invalid() {
        assert!(transition("foo", PackageState::Broken, PackageState::ConfigFiles).is_err());
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn parse_round_trips_through_as_str() {
        for state in [
            PackageState::Unpacked,
            PackageState::Installed,
            PackageState::Broken,
            PackageState::ConfigFiles,
        ] {
            assert_eq!(PackageState::parse(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn parse_rejects_unknown_string() {
        assert!(PackageState::parse("frobnicated").is_err());
    }
}
