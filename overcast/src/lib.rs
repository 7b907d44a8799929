//! # overcast - Runtime Multiple Dispatch
//!
//! `overcast` selects, at call time, which of several implementations of an
//! operation to run, based on the runtime types of *all* arguments.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use overcast::prelude::*;
//!
//! #[overload(name = "area")]
//! fn area_circle(shape: &Circle) -> f64 { PI * shape.r * shape.r }
//!
//! #[overload(name = "area")]
//! fn area_square(shape: &Square) -> f64 { shape.side * shape.side }
//!
//! let engine = Arc::new(Engine::new());
//! let area = engine
//!     .operation(&Arc::new(area_circle()))
//!     .overload(area_square())
//!     .finish();
//!
//! let square = engine.dispatch(&area, args![Square { side: 2.0 }])?;
//! ```
//!
//! ## Discovery
//!
//! Instead of listing overloads at registration, declare them in a
//! [`Catalog`] and let the engine find them on the first dispatch:
//!
//! ```rust,ignore
//! let catalog = Catalog::builder()
//!     .scope(module_path!(), |s| s.overload(area_circle()).overload(area_square()))
//!     .build()?;
//! let engine = Engine::builder().catalog(catalog).build();
//! ```
//!
//! Candidates are tried in order; the first whose parameters accept the
//! arguments wins.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod wiring;

pub use overcast_core::{
    // Arguments
    ArgError,
    Args,
    // Errors
    BindError,
    Binding,
    Body,
    Bound,
    BoxError,
    BoxFuture,
    // Candidates
    Candidate,
    CandidateBuilder,
    DiscoveryError,
    DispatchError,
    Invocation,
    // Discovery seam
    NoSiblings,
    OperationId,
    Origin,
    // Signatures
    Param,
    ParamKind,
    SiblingSource,
    Signature,
    // Values
    TypeDesc,
    Value,
    args,
};

pub use overcast_std::{
    Engine, EngineBuilder, OperationBuilder, OverloadSet, Outcome, PendingError, PendingResult,
};

pub use wiring::{
    CallError, Dispatcher, Inert, dispatcher, dispatcher_default, register, register_default,
};

/// Catalog-backed discovery.
pub mod discovery {
    pub use overcast_std::discovery::{
        Catalog, CatalogBuilder, Discoverer, Entry, Scope, ScopeBuilder, TypeBuilder, TypeEntry,
        TypePath,
    };

    #[cfg(feature = "inventory")]
    pub use overcast_std::discovery::CollectedOverload;
}

pub use discovery::{Catalog, CatalogBuilder, Discoverer, TypePath};

#[cfg(feature = "inventory")]
pub use discovery::CollectedOverload;

/// Testing utilities.
pub mod testing {
    pub use overcast_std::testing::{
        CallCounter, CallLog, CountingSource, StaticSource, labelled, recording,
    };
}

/// Prelude module - common imports for overcast.
///
/// # Usage
///
/// ```rust,ignore
/// use overcast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Args, BoxError, Candidate, Catalog, DispatchError, Engine, Outcome, Param, TypeDesc,
        Value, args, dispatcher, register,
    };

    #[cfg(feature = "macros")]
    pub use crate::overload;
}

#[cfg(feature = "macros")]
pub use overcast_macros::overload;

#[cfg(feature = "inventory")]
pub use inventory;
