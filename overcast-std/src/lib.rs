//! # overcast-std
//!
//! The standard dispatch engine for overcast.
//!
//! This crate provides:
//! - **Engine**: [`Engine`], [`EngineBuilder`], [`OperationBuilder`]
//! - **Overload sets**: [`OverloadSet`], the per-operation candidate list
//! - **Discovery**: [`Catalog`], [`Discoverer`] and the lineage helpers
//! - **Pending results**: [`PendingResult`] for suspending candidates
//! - **Testing**: counting and static sibling sources

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

macro_rules! emit {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)+);
    };
}

// Re-export core types
pub use overcast_core;

// Modules
pub mod discovery;
pub mod engine;
pub mod overload_set;
pub mod pending;
mod sync;
pub mod testing;

pub use discovery::{Catalog, CatalogBuilder, Discoverer, TypePath};
pub use engine::{Engine, EngineBuilder, OperationBuilder, Outcome};
pub use overload_set::OverloadSet;
pub use pending::{PendingError, PendingResult};

#[cfg(feature = "inventory")]
pub use discovery::CollectedOverload;
#[cfg(feature = "inventory")]
pub use inventory;
