//! Dependency resolver: walks run-dependency facts across a ranked
//! repository list and produces a topologically sorted transaction plan.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::index;
use crate::index::{IndexDocument, RegistryDocument};
use crate::types::{PackageDescriptor, Step, TransactionPlan};
use crate::version;

/// One ranked repository: its URI and loaded index.
pub type RankedRepo = (String, IndexDocument);

/// What: Split a dependency predicate `name op version` (or a bare `name`)
/// into its parts.
///
/// Inputs:
/// - `predicate`: e.g. `"bar>=1.0"` or `"bar"`.
///
/// Output:
/// - `(name, None)` for a bare name.
/// - `(name, Some((op, version)))` when an operator is present.
fn parse_predicate(predicate: &str) -> (&str, Option<(&str, &str)>) {
    match predicate.find(['<', '>', '=']) {
        Some(idx) => {
            let name = &predicate[..idx];
            let (op, version) = version::split_operator(&predicate[idx..]);
            (name, Some((op, version)))
        }
        None => (predicate, None),
    }
}

/// What: Resolve the single best descriptor for `predicate` across `repos`.
///
/// Details:
/// - A bare name (no constraint) takes the highest version across every
///   repo that carries it, ties broken by priority (earlier repo wins).
/// - A constrained name takes the *first* repo in priority order whose
///   descriptor satisfies the constraint, even if a later repo carries a
///   newer version (S2).
/// - Open Question (a): once a candidate is chosen, every other repo is
///   checked for a same-name, same-version descriptor with a different
///   `filename-sha256`; if one exists, resolution fails with
///   [`Error::Duplicate`] naming both repository URIs rather than silently
///   preferring the higher-priority one.
fn find_candidate(predicate: &str, repos: &[RankedRepo]) -> Result<(PackageDescriptor, String)> {
    let (name, constraint) = parse_predicate(predicate);

    if !repos.iter().any(|(_, idx)| index::find(idx, name).is_some()) {
        return Err(Error::NotFound(name.to_string()));
    }

    let chosen = if let Some((op, target)) = constraint {
        let wanted = format!("{op}{target}");
        repos
            .iter()
            .find_map(|(uri, idx)| {
                index::find(idx, name)
                    .filter(|d| version::satisfies(&d.version, &wanted))
                    .map(|d| (d.clone(), uri.clone()))
            })
            .ok_or_else(|| Error::UnsatisfiableConstraint(name.to_string()))?
    } else {
        let mut best: Option<(PackageDescriptor, String)> = None;
        for (uri, idx) in repos {
            if let Some(d) = index::find(idx, name) {
                let replace = match &best {
                    None => true,
                    Some((existing, _)) => version::compare(&d.version, &existing.version) == Ordering::Greater,
                };
                if replace {
                    best = Some((d.clone(), uri.clone()));
                }
            }
        }
        best.expect("existence already checked above")
    };

    let (descriptor, repo_uri) = chosen;
    for (uri, idx) in repos {
        if *uri == repo_uri {
            continue;
        }
        if let Some(other) = index::find(idx, name) {
            if other.version == descriptor.version {
                if let (Some(a), Some(b)) = (&other.filename_sha256, &descriptor.filename_sha256) {
                    if a != b {
                        return Err(Error::Duplicate(format!(
                            "{name}-{} disagrees between {repo_uri} and {uri}",
                            descriptor.version
                        )));
                    }
                }
            }
        }
    }

    Ok((descriptor, repo_uri))
}

/// Recursion state shared across [`visit`] calls.
struct Resolver<'a> {
    /// Ranked repositories, priority order.
    repos: &'a [RankedRepo],
    /// Names currently on the recursion stack, for cycle detection.
    stack: Vec<String>,
    /// Names fully resolved so far, in first-encounter (post-order) order.
    order: Vec<String>,
    /// Resolved descriptor and source repo, keyed by name.
    resolved: HashMap<String, (PackageDescriptor, String)>,
    /// Names introduced only as a dependency of the original target.
    automatic: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn visit(&mut self, predicate: &str, is_root: bool) -> Result<()> {
        let (name, constraint) = parse_predicate(predicate);
        let name = name.to_string();

        if let Some(pos) = self.stack.iter().position(|n| *n == name) {
            let mut members = self.stack[pos..].to_vec();
            members.push(name);
            return Err(Error::Cycle(members));
        }

        if let Some((descriptor, _)) = self.resolved.get(&name) {
            if let Some((op, target)) = constraint {
                let wanted = format!("{op}{target}");
                if !version::satisfies(&descriptor.version, &wanted) {
                    return Err(Error::UnsatisfiableConstraint(name));
                }
            }
            return Ok(());
        }

        self.stack.push(name.clone());
        let (descriptor, repo_uri) = find_candidate(predicate, self.repos)?;
        for dep in descriptor.run_depends.clone() {
            self.visit(&dep, false)?;
        }
        self.stack.pop();

        if !is_root {
            self.automatic.insert(name.clone());
        }
        self.order.push(name.clone());
        self.resolved.insert(name, (descriptor, repo_uri));
        Ok(())
    }
}

/// What: Resolve `target` against `repos` and `registry`, producing a
/// transaction plan.
///
/// Inputs:
/// - `target`: a package name or name-with-constraint.
/// - `repos`: repositories in priority order.
/// - `registry`: the currently installed set.
///
/// Output:
/// - `Ok(TransactionPlan)` with steps topologically sorted (dependencies
///   before dependents) in first-encounter order among siblings.
/// - `Err(Error::NotFound)` / `Err(Error::UnsatisfiableConstraint)` /
///   `Err(Error::Cycle)` / `Err(Error::Duplicate)` per §4.5.
pub fn resolve(target: &str, repos: &[RankedRepo], registry: &RegistryDocument) -> Result<TransactionPlan> {
    let mut resolver = Resolver {
        repos,
        stack: Vec::new(),
        order: Vec::new(),
        resolved: HashMap::new(),
        automatic: HashSet::new(),
    };
    resolver.visit(target, true)?;

    let mut plan = TransactionPlan::new();
    for name in resolver.order {
        let (descriptor, repo_uri) = resolver
            .resolved
            .remove(&name)
            .expect("every ordered name has a resolved entry");
        let step = match registry.packages.iter().find(|p| p.pkgname() == name) {
            None => Step::Install {
                descriptor,
                source_repo: repo_uri,
                automatic: resolver.automatic.contains(&name),
            },
            Some(installed) => match version::compare(&descriptor.version, &installed.descriptor.version) {
                Ordering::Equal => Step::Keep { descriptor },
                Ordering::Greater => Step::Upgrade {
                    descriptor_new: descriptor,
                    descriptor_old: installed.descriptor.clone(),
                    source_repo: repo_uri,
                },
                Ordering::Less => {
                    return Err(Error::UnsatisfiableConstraint(format!(
                        "{name}: installed version {} is newer than the best available {}",
                        installed.descriptor.version, descriptor.version
                    )));
                }
            },
        };
        plan.push(step);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstalledDescriptor;

    fn descriptor(pkgname: &str, version: &str, run_depends: &[&str]) -> PackageDescriptor {
        PackageDescriptor {
            pkgname: pkgname.to_string(),
            version: version.to_string(),
            short_desc: String::new(),
            architecture: "noarch".to_string(),
            run_depends: run_depends.iter().map(|s| (*s).to_string()).collect(),
            filename: None,
            filename_sha256: None,
            filename_size: None,
        }
    }

    fn repo(uri: &str, packages: Vec<PackageDescriptor>) -> RankedRepo {
        let mut index = IndexDocument::new(uri);
        index.packages = packages;
        (uri.to_string(), index)
    }

    #[test]
    fn s2_first_match_wins_over_newer_version_in_lower_priority_repo() {
        let repos = vec![
            repo(
                "R1",
                vec![descriptor("A", "1", &[]), descriptor("B", "1", &["A>=1"])],
            ),
            repo("R2", vec![descriptor("A", "2", &[])]),
        ];
        let registry = RegistryDocument::new();
        let plan = resolve("B", &repos, &registry).expect("resolves");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].pkgname(), "A");
        assert_eq!(plan.steps[1].pkgname(), "B");
        match &plan.steps[0] {
            Step::Install { descriptor, source_repo, automatic } => {
                assert_eq!(descriptor.version, "1");
                assert_eq!(source_repo, "R1");
                assert!(*automatic);
            }
            other => panic!("expected Install, got {other:?}"),
        }
    }

    #[test]
    fn s3_cycle_is_reported_with_both_members() {
        let repos = vec![repo(
            "R1",
            vec![descriptor("X", "1", &["Y"]), descriptor("Y", "1", &["X"])],
        )];
        let registry = RegistryDocument::new();
        let err = resolve("X", &repos, &registry).expect_err("cycle detected");
        match err {
            Error::Cycle(members) => assert_eq!(members, vec!["X".to_string(), "Y".to_string(), "X".to_string()]),
            other => panic!("expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn s4_upgrade_plan_for_newer_repo_version() {
        let repos = vec![repo("R1", vec![descriptor("P", "2", &[])])];
        let mut registry = RegistryDocument::new();
        registry.packages.push(InstalledDescriptor {
            descriptor: descriptor("P", "1", &[]),
            state: crate::state::PackageState::Installed,
            automatic_install: false,
            requiredby: Vec::new(),
            files: Vec::new(),
        });
        let plan = resolve("P", &repos, &registry).expect("resolves");
        assert_eq!(plan.steps.len(), 1);
        assert!(matches!(&plan.steps[0], Step::Upgrade { .. }));
    }

    #[test]
    fn already_satisfied_target_emits_keep() {
        let repos = vec![repo("R1", vec![descriptor("P", "1", &[])])];
        let mut registry = RegistryDocument::new();
        registry.packages.push(InstalledDescriptor {
            descriptor: descriptor("P", "1", &[]),
            state: crate::state::PackageState::Installed,
            automatic_install: false,
            requiredby: Vec::new(),
            files: Vec::new(),
        });
        let plan = resolve("P", &repos, &registry).expect("resolves");
        assert!(matches!(&plan.steps[0], Step::Keep { .. }));
    }

    #[test]
    fn missing_name_in_every_repo_is_not_found() {
        let repos = vec![repo("R1", vec![descriptor("A", "1", &[])])];
        let registry = RegistryDocument::new();
        assert!(matches!(resolve("ghost", &repos, &registry), Err(Error::NotFound(_))));
    }

    #[test]
    fn unsatisfiable_constraint_when_no_version_matches() {
        let repos = vec![repo("R1", vec![descriptor("A", "1", &[])])];
        let registry = RegistryDocument::new();
        assert!(matches!(
            resolve("A>=2", &repos, &registry),
            Err(Error::UnsatisfiableConstraint(_))
        ));
    }

    #[test]
    fn duplicate_hash_across_repos_at_equal_version_is_rejected() {
        let mut a1 = descriptor("A", "1", &[]);
        a1.filename_sha256 = Some("aaaa".to_string());
        let mut a2 = descriptor("A", "1", &[]);
        a2.filename_sha256 = Some("bbbb".to_string());
        let repos = vec![repo("R1", vec![a1]), repo("R2", vec![a2])];
        let registry = RegistryDocument::new();
        assert!(matches!(resolve("A", &repos, &registry), Err(Error::Duplicate(_))));
    }
}
