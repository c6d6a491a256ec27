//! Generic, schema-less property-list tree used by every persisted document.
//!
//! This is the lowest layer of the data model: a minimal tagged [`Node`]
//! representation for round-trip fidelity, built over the `plist` crate's
//! dynamic [`::plist::Value`] so on-disk bytes stay a standard Apple-style
//! property list. Typed accessors that understand `packages`, `pkgname`, and
//! friends live one layer up, in [`crate::index`].

mod node;
mod store;

pub use node::Node;
pub use store::{load, load_bytes, load_compressed, store, store_compressed};
