//! Wiring entry points to an engine.
//!
//! ```rust,ignore
//! let engine = Arc::new(Engine::builder().catalog(catalog).build());
//!
//! register(&engine, &area_entry);
//! let area = dispatcher(&engine, &area_entry);
//! let value = area.call(args![Circle::new(1.0)])?.ready();
//! ```

use overcast_core::{Args, Candidate, DispatchError, Value};
use overcast_std::{Engine, Outcome, PendingError};
use std::sync::Arc;
use thiserror::Error;

/// Errors from [`Dispatcher::resolve`].
#[derive(Error, Debug)]
pub enum CallError {
    /// Dispatch itself failed, or a synchronous candidate raised.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A suspending candidate raised, panicked or was cancelled.
    #[error(transparent)]
    Pending(#[from] PendingError),
}

/// A stand-in for a registered entry point that does nothing when called.
#[derive(Debug, Clone)]
pub struct Inert {
    operation: String,
}

impl Inert {
    /// Qualified name of the registered entry point.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Ignore `args` and return unit.
    pub fn call(&self, _args: Args) -> Value {
        Value::unit()
    }
}

/// A callable forwarding every call to [`Engine::dispatch`].
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<Engine>,
    entry: Arc<Candidate>,
}

impl Dispatcher {
    /// The entry point calls are dispatched through.
    pub fn entry(&self) -> &Arc<Candidate> {
        &self.entry
    }

    /// The engine calls are dispatched to.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Dispatch a call.
    pub fn call(&self, args: Args) -> Result<Outcome, DispatchError> {
        self.engine.dispatch(&self.entry, args)
    }

    /// Dispatch a call and wait for its value, awaiting a suspending candidate.
    pub async fn resolve(&self, args: Args) -> Result<Value, CallError> {
        Ok(self.call(args)?.resolve().await?)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("engine", &self.engine.name())
            .field("operation", &self.entry.display_name())
            .finish()
    }
}

/// Register `entry` with `engine` and return an inert stand-in for it.
pub fn register(engine: &Engine, entry: &Arc<Candidate>) -> Inert {
    engine.register(entry);
    Inert {
        operation: entry.display_name(),
    }
}

/// A callable dispatching through `entry`.
///
/// Does not register `entry`; calls fail with
/// [`DispatchError::UnregisteredOperation`] until [`register`] is called.
pub fn dispatcher(engine: &Arc<Engine>, entry: &Arc<Candidate>) -> Dispatcher {
    Dispatcher {
        engine: Arc::clone(engine),
        entry: Arc::clone(entry),
    }
}

/// [`register`] against the shared engine.
pub fn register_default(entry: &Arc<Candidate>) -> Inert {
    register(Engine::shared(), entry)
}

/// [`dispatcher`] against the shared engine.
pub fn dispatcher_default(entry: &Arc<Candidate>) -> Dispatcher {
    dispatcher(Engine::shared(), entry)
}
