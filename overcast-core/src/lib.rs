//! # overcast-core
//!
//! Core types for the overcast runtime multiple dispatch engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that describe candidates or sibling sources without pulling in
//! the engine from `overcast-std`.
//!
//! # Building Blocks
//!
//! ## Values ([`Value`])
//!
//! Type-erased, cheaply clonable runtime values. Arguments and results travel
//! through the engine as `Value`s.
//!
//! ## Type Descriptors ([`TypeDesc`])
//!
//! The declared type of a parameter: exact types, unions, sequences, tuples,
//! maps and predicates, checked structurally against a `Value`.
//!
//! ## Signatures ([`Signature`], [`Param`])
//!
//! A candidate's parameter list. [`Signature::bind`] is the matcher: it binds
//! an [`Args`] tuple positionally and by keyword, then checks descriptors.
//!
//! ## Candidates ([`Candidate`])
//!
//! One implementation: identity, origin, signature and body (synchronous or
//! suspending).
//!
//! ## Discovery seam ([`SiblingSource`])
//!
//! How the engine asks for the siblings of a registered entry point.
//!
//! # Error Types
//!
//! - [`DispatchError`] - Failures surfaced by `dispatch`
//! - [`DiscoveryError`] - Failures finding siblings
//! - [`BindError`] - Why a candidate rejected a call
//! - [`ArgError`] - Reading bound arguments

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod candidate;
mod error;
mod identity;
mod signature;
mod source;
mod types;
mod value;

// Re-exports
pub use args::{Args, Binding, Bound};
pub use candidate::{AsyncBody, Body, Candidate, CandidateBuilder, Invocation, Origin, SyncBody};
pub use error::{ArgError, BindError, BoxError, DiscoveryError, DispatchError};
pub use identity::OperationId;
pub use signature::{Param, ParamKind, Signature};
pub use source::{NoSiblings, SiblingSource};
pub use types::{Predicate, TypeDesc};
pub use value::{Value, short_type_name};

pub use futures::future::BoxFuture;
