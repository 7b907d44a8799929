//! # Candidates
//!
//! A [`Candidate`] is one concrete implementation of an operation: a body, a
//! declared [`Signature`], and an [`Origin`] telling discovery where it was
//! declared.
//!
//! # Usage Patterns
//!
//! 1. **Builder**: `Candidate::builder("area").param(..).body(|bound| ..)`
//! 2. **Attribute**: `#[overload]` on a typed function (facade `macros` feature)
//!
//! ```rust,ignore
//! let circle = Candidate::builder("area")
//!     .scope(module_path!())
//!     .param(Param::positional("shape").of::<Circle>())
//!     .body(|bound| {
//!         let shape = bound.get::<Circle>("shape")?;
//!         Ok(Value::new(shape.area()))
//!     });
//! ```

use crate::{
    args::{Args, Bound},
    error::{BindError, BoxError},
    identity::OperationId,
    signature::{Param, Signature},
    value::Value,
};
use futures::future::BoxFuture;
use std::{borrow::Cow, fmt, future::Future, sync::Arc};

/// A synchronous candidate body.
pub type SyncBody = Arc<dyn Fn(Bound) -> Result<Value, BoxError> + Send + Sync>;

/// A suspending candidate body. The returned future owns the bound arguments.
pub type AsyncBody =
    Arc<dyn Fn(Bound) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// The executable part of a candidate.
#[derive(Clone)]
pub enum Body {
    /// Runs to completion on the dispatching thread.
    Sync(SyncBody),
    /// Produces a future that the engine schedules instead of awaiting.
    Async(AsyncBody),
}

/// Where a candidate was declared.
#[derive(Clone, Debug)]
pub enum Origin {
    /// A free operation declared in a scope (module).
    Free {
        /// The defining scope, e.g. `module_path!()`.
        scope: Cow<'static, str>,
    },
    /// A member of a type.
    Member {
        /// The scope the owning type is declared in.
        scope: Cow<'static, str>,
        /// `Type::name`.
        qualname: String,
        /// The bound receiver, prepended to positional arguments.
        receiver: Option<Value>,
    },
}

impl Origin {
    /// The defining scope.
    pub fn scope(&self) -> &str {
        match self {
            Origin::Free { scope } | Origin::Member { scope, .. } => scope,
        }
    }

    /// The bound receiver, if any.
    pub fn receiver(&self) -> Option<&Value> {
        match self {
            Origin::Member { receiver, .. } => receiver.as_ref(),
            Origin::Free { .. } => None,
        }
    }
}

/// The result of invoking a candidate body.
pub enum Invocation {
    /// A synchronous body ran to completion.
    Ready(Result<Value, BoxError>),
    /// A suspending body produced a future that has not been polled yet.
    Suspended(BoxFuture<'static, Result<Value, BoxError>>),
}

/// One implementation eligible for selection.
///
/// Candidates are immutable. Each has its own [`OperationId`]; registering a
/// candidate with an engine keys the overload set by that id.
pub struct Candidate {
    id: OperationId,
    name: Cow<'static, str>,
    origin: Origin,
    signature: Signature,
    body: Body,
}

impl Candidate {
    /// Start building a candidate for the operation `name`.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> CandidateBuilder {
        CandidateBuilder::new(name)
    }

    /// The identity of this implementation.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// The operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the candidate was declared.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The defining scope.
    pub fn scope(&self) -> &str {
        self.origin.scope()
    }

    /// `Type::name` for members, the bare name for free operations.
    pub fn qualname(&self) -> &str {
        match &self.origin {
            Origin::Member { qualname, .. } => qualname,
            Origin::Free { .. } => &self.name,
        }
    }

    /// `scope::qualname`, used in diagnostics.
    pub fn display_name(&self) -> String {
        match self.scope() {
            "" => self.qualname().to_string(),
            scope => format!("{scope}::{}", self.qualname()),
        }
    }

    /// Returns `true` for members of a type.
    pub fn is_member(&self) -> bool {
        matches!(self.origin, Origin::Member { .. })
    }

    /// The bound receiver, if any.
    pub fn receiver(&self) -> Option<&Value> {
        self.origin.receiver()
    }

    /// The declared parameters.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if the body is a suspending computation.
    pub fn is_async(&self) -> bool {
        matches!(self.body, Body::Async(_))
    }

    /// Check whether this candidate accepts `args`.
    ///
    /// A bound receiver is prepended to the positional arguments.
    pub fn accepts(&self, args: &Args) -> Result<Bound, BindError> {
        match self.receiver() {
            Some(receiver) => {
                let mut args = args.clone();
                args.prepend(receiver.clone());
                self.signature.bind(&args)
            }
            None => self.signature.bind(args),
        }
    }

    /// Run the body with arguments previously accepted by [`Candidate::accepts`].
    ///
    /// Defaults are filled in before the body runs. A suspending body is not
    /// polled; the caller decides how to schedule the returned future.
    pub fn invoke(&self, mut bound: Bound) -> Invocation {
        self.signature.fill_defaults(&mut bound);
        match &self.body {
            Body::Sync(body) => Invocation::Ready(body(bound)),
            Body::Async(body) => Invocation::Suspended(body(bound)),
        }
    }

    /// A copy of this member bound to `receiver`, with a fresh identity.
    pub fn bound_to(&self, receiver: Value) -> Candidate {
        let origin = match &self.origin {
            Origin::Member {
                scope, qualname, ..
            } => Origin::Member {
                scope: scope.clone(),
                qualname: qualname.clone(),
                receiver: Some(receiver),
            },
            Origin::Free { scope } => Origin::Member {
                scope: scope.clone(),
                qualname: self.name.to_string(),
                receiver: Some(receiver),
            },
        };
        Candidate {
            id: OperationId::next(),
            name: self.name.clone(),
            origin,
            signature: self.signature.clone(),
            body: self.body.clone(),
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("id", &self.id)
            .field("name", &self.display_name())
            .field("signature", &self.signature)
            .field("async", &self.is_async())
            .field("bound", &self.receiver().is_some())
            .finish()
    }
}

/// Builder for constructing a [`Candidate`].
///
/// Finish with [`body`](CandidateBuilder::body) for a synchronous
/// implementation or [`async_body`](CandidateBuilder::async_body) for a
/// suspending one.
pub struct CandidateBuilder {
    name: Cow<'static, str>,
    scope: Cow<'static, str>,
    owner: Option<String>,
    receiver: Option<Value>,
    signature: Signature,
}

impl CandidateBuilder {
    /// Create a new builder for the operation `name`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            scope: Cow::Borrowed(""),
            owner: None,
            receiver: None,
            signature: Signature::default(),
        }
    }

    /// Set the defining scope, usually `module_path!()`.
    pub fn scope(mut self, scope: impl Into<Cow<'static, str>>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Declare the candidate as a member of the type `owner`.
    pub fn member_of(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Bind a receiver, making the candidate a bound member.
    pub fn receiver<T: std::any::Any + Send + Sync>(mut self, receiver: T) -> Self {
        self.receiver = Some(Value::new(receiver));
        self
    }

    /// Append a parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.signature.push(param);
        self
    }

    /// Append several parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        for param in params {
            self.signature.push(param);
        }
        self
    }

    /// Finish with a synchronous body.
    pub fn body<F>(self, body: F) -> Candidate
    where
        F: Fn(Bound) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.finish(Body::Sync(Arc::new(body)))
    }

    /// Finish with a suspending body.
    pub fn async_body<F, Fut>(self, body: F) -> Candidate
    where
        F: Fn(Bound) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        self.finish(Body::Async(Arc::new(
            move |bound| -> BoxFuture<'static, Result<Value, BoxError>> { Box::pin(body(bound)) },
        )))
    }

    fn finish(self, body: Body) -> Candidate {
        let origin = match (self.owner, self.receiver) {
            (None, None) => Origin::Free { scope: self.scope },
            (owner, receiver) => Origin::Member {
                scope: self.scope,
                qualname: match owner {
                    Some(owner) => format!("{owner}::{}", self.name),
                    None => self.name.to_string(),
                },
                receiver,
            },
        };
        Candidate {
            id: OperationId::next(),
            name: self.name,
            origin,
            signature: self.signature,
            body,
        }
    }
}
