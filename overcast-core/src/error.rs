//! Error types for overcast.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DispatchError`] - Errors surfaced to the caller of `dispatch`
//! - [`DiscoveryError`] - Errors from sibling discovery
//! - [`BindError`] - Why a single candidate rejected an argument tuple
//! - [`ArgError`] - Errors reading bound arguments inside a candidate body

use crate::identity::OperationId;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when dispatching an operation.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// `dispatch` was called for an identity never passed to `register`.
    #[error("operation `{operation}` ({id}) is not registered")]
    UnregisteredOperation {
        /// Qualified name of the entry point.
        operation: String,
        /// Identity of the entry point.
        id: OperationId,
    },

    /// Every candidate rejected the arguments.
    #[error("no candidate of `{operation}` accepts arguments {received} ({tried} tried)")]
    NoMatchingCandidate {
        /// Qualified name of the operation.
        operation: String,
        /// Summary of the argument types received, e.g. `(Circle, scale=f64)`.
        received: String,
        /// Number of candidates that were tried.
        tried: usize,
    },

    /// Sibling discovery failed; the operation stays undiscovered.
    #[error("discovery failed for `{operation}`")]
    Discovery {
        /// Qualified name of the operation.
        operation: String,
        /// The underlying discovery failure.
        #[source]
        source: DiscoveryError,
    },

    /// The selected candidate is asynchronous but no runtime can schedule it.
    #[error("no async runtime available to schedule `{operation}`")]
    NoRuntime {
        /// Qualified name of the operation.
        operation: String,
    },

    /// The selected candidate itself failed.
    #[error(transparent)]
    Candidate(BoxError),
}

impl DispatchError {
    /// Returns the candidate's own error, if the failure came from its body.
    pub fn into_candidate_error(self) -> Option<BoxError> {
        match self {
            DispatchError::Candidate(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors that can occur while discovering sibling candidates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The defining scope of a free operation is unknown.
    #[error("scope `{0}` could not be found")]
    UnknownScope(String),

    /// A referenced type is not declared in its scope.
    #[error("type `{name}` is not declared in scope `{scope}`")]
    UnknownType {
        /// Scope searched.
        scope: String,
        /// Type name searched for.
        name: String,
    },

    /// A member's qualified name does not name an owning type.
    #[error("cannot resolve the owning type of `{0}`")]
    UnresolvedOwner(String),

    /// A bound receiver's runtime type is not declared anywhere.
    #[error("receiver type `{0}` is not declared in the catalog")]
    UnknownReceiverType(String),

    /// The ancestor graph has a cycle or no consistent linearization.
    #[error("inconsistent type hierarchy at `{0}`")]
    InconsistentHierarchy(String),
}

/// Why a candidate rejected an argument tuple.
///
/// Binding failures are control flow inside the matcher: the engine moves on
/// to the next candidate and never surfaces them on their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// More positional arguments than positional parameters.
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        /// Positional parameters declared.
        expected: usize,
        /// Positional arguments given.
        given: usize,
    },

    /// A required parameter was not bound.
    #[error("missing required argument `{0}`")]
    MissingArgument(String),

    /// A keyword matched no parameter.
    #[error("unexpected keyword argument `{0}`")]
    UnexpectedKeyword(String),

    /// A keyword named a parameter already bound positionally.
    #[error("multiple values for argument `{0}`")]
    DuplicateArgument(String),

    /// A bound value does not satisfy the parameter's descriptor.
    #[error("argument `{param}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Parameter name.
        param: String,
        /// Rendered descriptor.
        expected: String,
        /// Short type name of the value received.
        found: String,
    },
}

/// Errors reading bound arguments inside a candidate body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// No value is bound under this name.
    #[error("no argument bound to `{0}`")]
    Missing(String),

    /// The bound value has a different type than requested.
    #[error("argument `{name}` is {found}, not {requested}")]
    WrongType {
        /// Parameter name.
        name: String,
        /// Type requested by the body.
        requested: &'static str,
        /// Type actually bound.
        found: String,
    },
}
