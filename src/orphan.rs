//! Orphan detector: automatically installed packages no longer required by
//! anything (§4.8).

use crate::index::RegistryDocument;
use crate::state::PackageState;

/// What: Compute the transitive closure of orphaned packages.
///
/// Inputs:
/// - `registry`: the current installed set. Read-only; actual removal is the
///   caller's job, typically one [`crate::transaction::remove`] call per
///   returned name, in the order returned.
///
/// Output:
/// - Pkgnames in removal order. Earlier entries never depend on later ones,
///   since a package can only become orphaned once everything that kept it
///   required has itself already been counted.
///
/// Details:
/// - Removing one round of orphans is simulated against a working copy of
///   the registry so the next round sees `requiredby` as it would look after
///   those removals actually ran — the fixed-point rule of §4.8 and the
///   orphan-fixpoint property (§8 property 5).
/// - Only packages in state `Installed` are candidates. A package already
///   left at `ConfigFiles`/`Broken`/`Unpacked` by a prior non-purge removal
///   or a stalled transaction keeps its `automatic-install` flag and an
///   empty `requiredby` regardless, and re-offering it here would hand the
///   caller a second non-purge `remove` on a package not in `Installed` —
///   a transition `can_transition_to` rejects (§4.6).
#[must_use]
pub fn detect(registry: &RegistryDocument) -> Vec<String> {
    let mut working = registry.packages.clone();
    let mut removed = Vec::new();

    loop {
        let round: Vec<String> = working
            .iter()
            .filter(|p| p.state == PackageState::Installed && p.automatic_install && p.requiredby.is_empty())
            .map(|p| p.pkgname().to_string())
            .collect();
        if round.is_empty() {
            break;
        }

        for name in &round {
            if let Some(pkgver) = working.iter().find(|p| p.pkgname() == name).map(|p| p.pkgver()) {
                for other in &mut working {
                    other.requiredby.retain(|r| r != &pkgver);
                }
            }
        }
        working.retain(|p| !round.iter().any(|name| name == p.pkgname()));
        removed.extend(round);
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PackageState;
    use crate::types::{InstalledDescriptor, PackageDescriptor};

    fn installed(pkgname: &str, automatic: bool, requiredby: &[&str], run_depends: &[&str]) -> InstalledDescriptor {
        InstalledDescriptor {
            descriptor: PackageDescriptor {
                pkgname: pkgname.to_string(),
                version: "1.0".to_string(),
                short_desc: String::new(),
                architecture: "noarch".to_string(),
                run_depends: run_depends.iter().map(|s| (*s).to_string()).collect(),
                filename: None,
                filename_sha256: None,
                filename_size: None,
            },
            state: PackageState::Installed,
            automatic_install: automatic,
            requiredby: requiredby.iter().map(|s| (*s).to_string()).collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn no_orphans_when_nothing_is_automatic() {
        let mut registry = RegistryDocument::new();
        registry.packages.push(installed("a", false, &[], &[]));
        assert!(detect(&registry).is_empty());
    }

    #[test]
    fn manually_installed_with_no_dependents_is_not_an_orphan() {
        let mut registry = RegistryDocument::new();
        registry.packages.push(installed("a", false, &[], &[]));
        assert!(detect(&registry).is_empty());
    }

    #[test]
    fn directly_orphaned_package_is_found() {
        let mut registry = RegistryDocument::new();
        registry.packages.push(installed("b", true, &[], &[]));
        assert_eq!(detect(&registry), vec!["b".to_string()]);
    }

    #[test]
    fn automatic_package_still_required_is_not_orphaned() {
        let mut registry = RegistryDocument::new();
        registry.packages.push(installed("b", true, &["foo-1.0"], &[]));
        assert!(detect(&registry).is_empty());
    }

    #[test]
    fn s6_orphan_cascade_reaches_fixpoint_in_two_rounds() {
        // A (manual) depends on B (automatic) depends on C (automatic).
        // A has already been removed, so B's requiredby is now empty.
        let mut registry = RegistryDocument::new();
        registry.packages.push(installed("b", true, &[], &["c"]));
        registry.packages.push(installed("c", true, &["b-1.0"], &[]));
        assert_eq!(detect(&registry), vec!["b".to_string(), "c".to_string()]);
    }
}
