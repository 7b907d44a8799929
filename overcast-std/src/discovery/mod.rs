//! Sibling discovery backed by a catalog.
//!
//! - [`Catalog`] / [`CatalogBuilder`]: the declared scopes, types and members
//! - [`Discoverer`]: the [`SiblingSource`](overcast_core::SiblingSource) that
//!   queries a catalog
//! - Lineage helpers on [`Catalog`]: `lineage`, `superclasses`, `all_members`,
//!   `member_chain`

mod catalog;
#[cfg(feature = "inventory")]
mod collected;
mod discoverer;
mod lineage;

pub use catalog::{
    Catalog, CatalogBuilder, Entry, Scope, ScopeBuilder, TypeBuilder, TypeEntry, TypePath,
};
#[cfg(feature = "inventory")]
pub use collected::CollectedOverload;
pub use discoverer::Discoverer;
