//! Prelude module for convenient imports.
//!
//! Re-exports the types most call sites need from xbps-rs, allowing you to
//! import everything you need with a single `use xbps_rs::prelude::*;`.
//!
//! # Example
//!
//! ```no_run
//! use xbps_rs::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let cfg = Config::builder().root("/").build();
//! let handle = RegistryHandle::prepare(cfg.root().path())?;
//! let plan = resolve("foo", &[], &handle.document)?;
//! Ok(())
//! # }
//! ```

// Error handling
pub use crate::error::{Error, Result};

// Configuration
pub use crate::config::{Config, ConfigBuilder, Verbosity};

// Data types
pub use crate::types::{FileEntry, InstalledDescriptor, PackageDescriptor, Step, TransactionPlan};

// Index and registry documents
pub use crate::index::{IndexDocument, RegistryDocument, RepositoryList};

// On-disk handles
pub use crate::registry::RegistryHandle;
pub use crate::root::RootHandle;

// State machine
pub use crate::state::PackageState;

// Core operations
pub use crate::resolve::resolve;
pub use crate::transaction::apply;
pub use crate::version::compare;
