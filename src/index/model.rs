//! Typed mutation operations over an [`IndexDocument`], encoding invariant I1.

use std::cmp::Ordering;

use super::document::IndexDocument;
use crate::error::{Error, Result};
use crate::types::PackageDescriptor;
use crate::version;

/// Outcome of [`replace_if_newer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// No prior descriptor for this `pkgname`; the new one was appended.
    Added,
    /// A prior descriptor existed and compared strictly older; it was
    /// removed and the new one appended.
    Replaced,
    /// A prior descriptor existed and was not older; the index is unchanged.
    Kept,
}

/// What: Find a package descriptor by name.
#[must_use]
pub fn find<'a>(index: &'a IndexDocument, pkgname: &str) -> Option<&'a PackageDescriptor> {
    index.packages.iter().find(|d| d.pkgname == pkgname)
}

/// What: Remove a package descriptor by name.
///
/// Output:
/// - `Ok(())` if a descriptor was removed.
/// - `Err(Error::NotFound)` if no descriptor with that name existed.
pub fn remove(index: &mut IndexDocument, pkgname: &str) -> Result<()> {
    let idx = index
        .packages
        .iter()
        .position(|d| d.pkgname == pkgname)
        .ok_or_else(|| Error::NotFound(pkgname.to_string()))?;
    index.packages.remove(idx);
    Ok(())
}

/// What: Add a new package descriptor.
///
/// Output:
/// - `Ok(())` on success.
/// - `Err(Error::Duplicate)` if `pkgname` is already present (invariant I1).
pub fn add(index: &mut IndexDocument, descriptor: PackageDescriptor) -> Result<()> {
    if find(index, &descriptor.pkgname).is_some() {
        return Err(Error::Duplicate(descriptor.pkgname));
    }
    index.packages.push(descriptor);
    Ok(())
}

/// What: Insert `descriptor`, replacing any existing descriptor of the same
/// name only if `descriptor`'s version is strictly newer.
///
/// Inputs:
/// - `index`: the document to mutate.
/// - `descriptor`: the candidate descriptor.
///
/// Output:
/// - [`ReplaceOutcome::Added`] if no prior descriptor existed.
/// - [`ReplaceOutcome::Replaced`] if the prior descriptor compared older and
///   was removed before `descriptor` was appended.
/// - [`ReplaceOutcome::Kept`] if the prior descriptor was equal or newer
///   (the index builder's idempotence rule: ties keep the existing entry).
pub fn replace_if_newer(index: &mut IndexDocument, descriptor: PackageDescriptor) -> ReplaceOutcome {
    match find(index, &descriptor.pkgname) {
        None => {
            index.packages.push(descriptor);
            ReplaceOutcome::Added
        }
        Some(existing) => {
            if version::compare(&descriptor.version, &existing.version) == Ordering::Greater {
                // Error impossible here: we just confirmed the entry exists.
                let _ = remove(index, &descriptor.pkgname);
                index.packages.push(descriptor);
                ReplaceOutcome::Replaced
            } else {
                ReplaceOutcome::Kept
            }
        }
    }
}
