//! Resolver output: the ordered sequence of steps a transaction executes.

use crate::types::PackageDescriptor;

/// One step of a [`TransactionPlan`], in the order the engine must apply it.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Package absent from the registry; fetch and unpack it.
    Install {
        /// Descriptor to install.
        descriptor: PackageDescriptor,
        /// Repository URI the descriptor was resolved from.
        source_repo: String,
        /// `true` if this step exists only to satisfy another step's dependency.
        automatic: bool,
    },
    /// Registry holds an older version; replace it.
    Upgrade {
        /// Descriptor to install.
        descriptor_new: PackageDescriptor,
        /// Descriptor currently installed.
        descriptor_old: PackageDescriptor,
        /// Repository URI the new descriptor was resolved from.
        source_repo: String,
    },
    /// Already satisfies the requesting constraint; recorded for cycle
    /// detection but not executed.
    Keep {
        /// The already-installed descriptor that satisfies the request.
        descriptor: PackageDescriptor,
    },
}

impl Step {
    /// What: The `pkgname` this step concerns, regardless of variant.
    #[must_use]
    pub fn pkgname(&self) -> &str {
        match self {
            Self::Install { descriptor, .. } | Self::Keep { descriptor } => &descriptor.pkgname,
            Self::Upgrade { descriptor_new, .. } => &descriptor_new.pkgname,
        }
    }

    /// What: `true` if this step has work for the transaction engine to perform.
    ///
    /// Details:
    /// - [`Step::Keep`] carries no work; it exists purely so the resolver's
    ///   cycle and constraint-intersection bookkeeping can see it.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        !matches!(self, Self::Keep { .. })
    }
}

/// A fully ordered, topologically sorted sequence of steps: dependencies
/// appear before their dependents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionPlan {
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl TransactionPlan {
    /// What: Construct an empty plan.
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// What: Append a step to the end of the plan.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// What: Iterate the steps that the transaction engine must execute,
    /// skipping [`Step::Keep`] entries.
    pub fn executable(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.is_executable())
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
    fn keep_steps_are_excluded_from_executable() {
        let mut plan = TransactionPlan::new();
        plan.push(Step::Keep {
            descriptor: descriptor("a", "1.0"),
        });
        plan.push(Step::Install {
            descriptor: descriptor("b", "1.0"),
            source_repo: "repo1".to_string(),
            automatic: false,
        });
        assert_eq!(plan.executable().count(), 1);
    }

    #[test]
    fn pkgname_reads_through_every_variant() {
        let install = Step::Install {
            descriptor: descriptor("a", "1.0"),
            source_repo: "repo1".to_string(),
            automatic: true,
        };
        let upgrade = Step::Upgrade {
            descriptor_new: descriptor("b", "2.0"),
            descriptor_old: descriptor("b", "1.0"),
            source_repo: "repo1".to_string(),
        };
        let keep = Step::Keep {
            descriptor: descriptor("c", "1.0"),
        };
        assert_eq!(install.pkgname(), "a");
        assert_eq!(upgrade.pkgname(), "b");
        assert_eq!(keep.pkgname(), "c");
    }
}
