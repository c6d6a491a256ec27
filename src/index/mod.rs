//! Typed views over the plist store: the repository index, the installed
//! registry, and the repository list.
//!
//! This is one layer above [`crate::plist`]: callers never reach into a
//! [`crate::plist::Node`] directly for the keys this module understands.

mod document;
mod model;

pub use document::{IndexDocument, RegistryDocument, RepositoryList, PKGINDEX_VERSION};
pub use model::{add, find, remove, replace_if_newer, ReplaceOutcome};
