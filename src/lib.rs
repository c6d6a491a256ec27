//! Core library for a binary package manager: version comparison, a
//! plist-backed package index, a dependency resolver, and a transaction
//! engine that drives installed packages through their lifecycle.
//!
//! # Layering
//!
//! - [`plist`] — a schema-less, round-trip-faithful property-list tree.
//! - [`types`] and [`index`] — typed views over that tree: package
//!   descriptors, the installed registry, and the repository index.
//! - [`version`] — the `pkgname op version` comparison and constraint
//!   grammar every other layer relies on.
//! - [`resolve`] — walks `run_depends` facts across ranked repositories into
//!   a topologically sorted [`types::TransactionPlan`].
//! - [`transaction`] and [`state`] — applies a plan's steps against a target
//!   root, driving each package through its lifecycle.
//! - [`orphan`] and [`integrity`] — post-hoc maintenance: orphan detection
//!   and manifest re-hashing.
//! - [`registry`], [`repo`], [`root`], [`archive`], [`script`] — on-disk
//!   plumbing: the locked registry handle, the repository list, target-root
//!   resolution, archive reading, and install/remove script execution.
//! - [`indexer`] — builds a repository's `pkg-index.plist` from its archives.
//! - [`config`] and [`cli`] — the CLI front end.
//!
//! # Example
//!
//! ```no_run
//! use xbps_rs::config::Config;
//! use xbps_rs::registry::RegistryHandle;
//!
//! # fn example() -> xbps_rs::Result<()> {
//! let cfg = Config::builder().root("/").build();
//! let handle = RegistryHandle::prepare(cfg.root().path())?;
//! for pkg in &handle.document.packages {
//!     println!("{} {}", pkg.pkgname(), pkg.descriptor.version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod humanize;
pub mod index;
pub mod indexer;
pub mod integrity;
pub mod orphan;
pub mod plist;
pub mod registry;
pub mod repo;
pub mod resolve;
pub mod root;
pub mod script;
pub mod state;
pub mod transaction;
pub mod types;
pub mod version;

/// Prelude module for convenient imports.
///
/// Re-exports the types most call sites need, so `use xbps_rs::prelude::*;`
/// covers the error type, the plan/registry/descriptor types, and the
/// handles that own on-disk state.
pub mod prelude;

pub use error::{Error, Result};
pub use types::{FileEntry, InstalledDescriptor, PackageDescriptor, Step, TransactionPlan};
