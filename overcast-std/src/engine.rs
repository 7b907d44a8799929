//! The dispatch engine.
//!
//! [`Engine`] owns the mapping from operation identity to [`OverloadSet`] and
//! is the only entry point for dispatch. Build one with [`Engine::new`] or
//! [`EngineBuilder`], or use the process-wide [`Engine::shared`] instance.
//!
//! # Example
//! ```ignore
//! let engine = Engine::builder().catalog(catalog).build();
//!
//! engine.register(&area);
//! let outcome = engine.dispatch(&area, args![Circle::new(1.0)])?;
//! ```
//!
//! # Selection policy
//!
//! Candidates are tried in registration order, then discovery order. The
//! first candidate that accepts the arguments wins; there is no ranking by
//! specificity. Register the most specific candidates first.

use crate::{
    discovery::{Catalog, Discoverer},
    overload_set::{OverloadSet, Selection},
    pending::{PendingError, PendingResult},
    sync::{read, write},
};
use overcast_core::{
    Args, Candidate, DispatchError, Invocation, NoSiblings, OperationId, SiblingSource, Value,
};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, LazyLock, RwLock},
};
use tokio::runtime::Handle;

/// What a successful dispatch produced.
#[derive(Debug)]
pub enum Outcome {
    /// A synchronous candidate's return value.
    Ready(Value),
    /// A suspending candidate, already scheduled.
    Pending(PendingResult),
}

impl Outcome {
    /// Returns `true` if a suspending candidate was scheduled.
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    /// The ready value, if the selected candidate was synchronous.
    pub fn ready(self) -> Option<Value> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Pending(_) => None,
        }
    }

    /// The pending handle, if the selected candidate was suspending.
    pub fn pending(self) -> Option<PendingResult> {
        match self {
            Outcome::Pending(pending) => Some(pending),
            Outcome::Ready(_) => None,
        }
    }

    /// Wait for the value, whichever kind of candidate was selected.
    pub async fn resolve(self) -> Result<Value, PendingError> {
        match self {
            Outcome::Ready(value) => Ok(value),
            Outcome::Pending(pending) => pending.await,
        }
    }
}

/// The runtime multiple dispatch engine.
///
/// Engines are plain values: several may coexist, each with its own registry
/// and sibling source. Registry entries are never removed.
pub struct Engine {
    name: &'static str,
    registry: RwLock<HashMap<OperationId, Arc<OverloadSet>>>,
    source: Arc<dyn SiblingSource>,
    runtime: Option<Handle>,
}

impl Engine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Start configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The process-wide default engine.
    ///
    /// Created on first use with default configuration.
    pub fn shared() -> &'static Arc<Engine> {
        static SHARED: LazyLock<Arc<Engine>> =
            LazyLock::new(|| Arc::new(EngineBuilder::new().name("shared").build()));
        &SHARED
    }

    /// The engine name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register an operation's initial implementation.
    ///
    /// Idempotent: registering an identity twice is a no-op. Otherwise creates
    /// an undiscovered overload set holding exactly `entry`.
    pub fn register(&self, entry: &Arc<Candidate>) {
        let mut registry = write(&self.registry);
        if let Entry::Vacant(slot) = registry.entry(entry.id()) {
            slot.insert(Arc::new(OverloadSet::new(Arc::clone(entry))));
            emit!(
                debug,
                engine = self.name,
                operation = %entry.display_name(),
                id = %entry.id(),
                "registered operation"
            );
        }
    }

    /// Append a further candidate to a registered operation.
    pub fn append(
        &self,
        entry: &Candidate,
        candidate: impl Into<Arc<Candidate>>,
    ) -> Result<(), DispatchError> {
        let candidate = candidate.into();
        let _id = candidate.id();
        self.set(entry)?.push(candidate);
        emit!(
            debug,
            engine = self.name,
            operation = %entry.display_name(),
            candidate = %_id,
            "appended candidate"
        );
        Ok(())
    }

    /// Register `entry` and return a builder for appending its overloads.
    pub fn operation(&self, entry: &Arc<Candidate>) -> OperationBuilder<'_> {
        self.register(entry);
        OperationBuilder {
            engine: self,
            entry: Arc::clone(entry),
        }
    }

    /// Dispatch a call to the operation registered as `entry`.
    ///
    /// 1. Fails with [`DispatchError::UnregisteredOperation`] if `entry` was
    ///    never registered; discovery does not run.
    /// 2. On the first dispatch, runs discovery once and appends every sibling.
    /// 3. Invokes the first candidate (in order) that accepts `args`. A
    ///    suspending candidate is spawned and returned as
    ///    [`Outcome::Pending`] without waiting.
    /// 4. Fails with [`DispatchError::NoMatchingCandidate`] if none accepts.
    ///
    /// Errors raised by the selected candidate come back unchanged as
    /// [`DispatchError::Candidate`].
    pub fn dispatch(&self, entry: &Candidate, args: Args) -> Result<Outcome, DispatchError> {
        let set = self.set(entry)?;

        match set.discover(entry, self.source.as_ref()) {
            Ok(Some(_found)) => {
                emit!(
                    debug,
                    engine = self.name,
                    operation = %set.operation(),
                    siblings = _found,
                    candidates = set.len(),
                    "discovered siblings"
                );
            }
            Ok(None) => {}
            Err(source) => {
                emit!(
                    warn,
                    engine = self.name,
                    operation = %set.operation(),
                    error = %source,
                    "discovery failed"
                );
                return Err(DispatchError::Discovery {
                    operation: set.operation().to_string(),
                    source,
                });
            }
        }

        let (candidate, bound) = match set.select(&args) {
            Selection::Matched(candidate, bound) => (candidate, bound),
            Selection::Rejected { tried } => {
                emit!(
                    debug,
                    engine = self.name,
                    operation = %set.operation(),
                    received = %args.describe(),
                    tried,
                    "no matching candidate"
                );
                return Err(DispatchError::NoMatchingCandidate {
                    operation: set.operation().to_string(),
                    received: args.describe(),
                    tried,
                });
            }
        };

        emit!(
            debug,
            engine = self.name,
            operation = %set.operation(),
            candidate = %candidate.id(),
            signature = %candidate.signature(),
            "selected candidate"
        );

        match candidate.invoke(bound) {
            Invocation::Ready(result) => result.map(Outcome::Ready).map_err(DispatchError::Candidate),
            Invocation::Suspended(future) => {
                let runtime = self.runtime_handle().ok_or_else(|| DispatchError::NoRuntime {
                    operation: set.operation().to_string(),
                })?;
                Ok(Outcome::Pending(PendingResult::spawn(
                    &runtime,
                    set.operation().to_string(),
                    future,
                )))
            }
        }
    }

    /// Returns `true` if `entry` is registered.
    pub fn contains(&self, entry: &Candidate) -> bool {
        read(&self.registry).contains_key(&entry.id())
    }

    /// A snapshot of the candidates registered under `entry`, in order.
    pub fn candidates(&self, entry: &Candidate) -> Option<Vec<Arc<Candidate>>> {
        self.lookup(entry.id()).map(|set| set.candidates())
    }

    /// Returns `Some(true)` once discovery has run for `entry`.
    pub fn is_discovered(&self, entry: &Candidate) -> Option<bool> {
        self.lookup(entry.id()).map(|set| set.is_discovered())
    }

    /// The overload set registered under `id`.
    pub fn lookup(&self, id: OperationId) -> Option<Arc<OverloadSet>> {
        read(&self.registry).get(&id).cloned()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        read(&self.registry).len()
    }

    /// Check if no operation is registered.
    pub fn is_empty(&self) -> bool {
        read(&self.registry).is_empty()
    }

    fn set(&self, entry: &Candidate) -> Result<Arc<OverloadSet>, DispatchError> {
        self.lookup(entry.id())
            .ok_or_else(|| DispatchError::UnregisteredOperation {
                operation: entry.display_name(),
                id: entry.id(),
            })
    }

    fn runtime_handle(&self) -> Option<Handle> {
        self.runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("operations", &self.len())
            .finish()
    }
}

/// Builder for constructing an [`Engine`].
///
/// # Example
/// ```ignore
/// let engine = EngineBuilder::new()
///     .name("geometry")
///     .catalog(catalog)
///     .runtime(tokio::runtime::Handle::current())
///     .build();
/// ```
pub struct EngineBuilder {
    name: &'static str,
    source: Arc<dyn SiblingSource>,
    runtime: Option<Handle>,
}

impl EngineBuilder {
    /// Create a builder with defaults: no sibling discovery, and suspending
    /// candidates spawned on the runtime current at dispatch time.
    pub fn new() -> Self {
        Self {
            name: "engine",
            source: Arc::new(NoSiblings),
            runtime: None,
        }
    }

    /// Set the name used in logs.
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Use a custom sibling source for discovery.
    pub fn source<S: SiblingSource + 'static>(mut self, source: S) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Discover siblings from a catalog.
    pub fn catalog(self, catalog: impl Into<Arc<Catalog>>) -> Self {
        self.source(Discoverer::new(catalog))
    }

    /// Spawn suspending candidates on this runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the engine.
    pub fn build(self) -> Engine {
        Engine {
            name: self.name,
            registry: RwLock::new(HashMap::new()),
            source: self.source,
            runtime: self.runtime,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends explicit overloads to one registered operation.
///
/// Returned by [`Engine::operation`].
pub struct OperationBuilder<'a> {
    engine: &'a Engine,
    entry: Arc<Candidate>,
}

impl OperationBuilder<'_> {
    /// Append a candidate.
    pub fn overload(self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        if let Some(set) = self.engine.lookup(self.entry.id()) {
            set.push(candidate);
        }
        self
    }

    /// The registered entry point.
    pub fn entry(&self) -> &Arc<Candidate> {
        &self.entry
    }

    /// Finish, returning the entry point to dispatch through.
    pub fn finish(self) -> Arc<Candidate> {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingSource, StaticSource, labelled};
    use overcast_core::{BoxError, Param, TypeDesc, args};
    use std::sync::OnceLock;

    struct Circle;
    struct Square;

    #[test]
    fn test_register_is_idempotent() {
        let engine = Engine::new();
        let entry = Arc::new(labelled("area", "circle", [Param::positional("s").of::<Circle>()]));
        engine.register(&entry);
        engine.register(&entry);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.candidates(&entry).map(|c| c.len()), Some(1));
        assert_eq!(engine.is_discovered(&entry), Some(false));
    }

    #[test]
    fn test_same_name_different_identity() {
        let engine = Engine::new();
        let a = Arc::new(labelled("area", "a", [Param::positional("s")]));
        let b = Arc::new(labelled("area", "b", [Param::positional("s")]));
        engine.register(&a);
        engine.register(&b);
        assert_eq!(engine.len(), 2);

        let out = engine.dispatch(&b, args![1_u8]).unwrap().ready().unwrap();
        assert_eq!(out.downcast_ref::<&str>(), Some(&"b"));
    }

    #[test]
    fn test_unregistered_does_not_discover() {
        let source = CountingSource::new(NoSiblings);
        let calls = source.counter();
        let engine = Engine::builder().source(source).build();
        let entry = labelled("area", "circle", [Param::positional("s")]);

        let err = engine.dispatch(&entry, args![Circle]).unwrap_err();
        assert!(matches!(err, DispatchError::UnregisteredOperation { .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_append_requires_registration() {
        let engine = Engine::new();
        let entry = labelled("area", "circle", [Param::positional("s")]);
        let other = labelled("area", "square", [Param::positional("s")]);
        assert!(matches!(
            engine.append(&entry, other),
            Err(DispatchError::UnregisteredOperation { .. })
        ));
        assert!(!engine.contains(&entry));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_predicate_may_append_to_its_own_operation() {
        let engine = Arc::new(Engine::new());
        let slot: Arc<OnceLock<Arc<Candidate>>> = Arc::new(OnceLock::new());
        let (inner, target) = (Arc::clone(&engine), Arc::clone(&slot));
        let entry = Arc::new(
            Candidate::builder("area")
                .param(Param::positional("s").typed(TypeDesc::predicate("appends", move |_| {
                    if let Some(entry) = target.get() {
                        let square = labelled("area", "square", [Param::positional("s")]);
                        assert!(inner.append(entry, square).is_ok());
                    }
                    false
                })))
                .body(|_| Ok(Value::unit())),
        );
        let _ = slot.set(Arc::clone(&entry));
        engine.register(&entry);

        // The scan in progress does not see the candidate it appended.
        assert!(matches!(
            engine.dispatch(&entry, args![Circle]),
            Err(DispatchError::NoMatchingCandidate { tried: 1, .. })
        ));
        assert_eq!(engine.candidates(&entry).map(|c| c.len()), Some(2));

        let out = engine.dispatch(&entry, args![Circle]).unwrap().ready().unwrap();
        assert_eq!(out.downcast_ref::<&str>(), Some(&"square"));
    }

    #[test]
    fn test_discovered_siblings_follow_explicit_candidates() {
        let square = Arc::new(labelled("area", "square", [Param::positional("s").of::<Square>()]));
        let engine = Engine::builder()
            .source(StaticSource::new([Arc::clone(&square)]))
            .build();
        let circle = engine
            .operation(&Arc::new(labelled(
                "area",
                "circle",
                [Param::positional("s").of::<Circle>()],
            )))
            .overload(labelled("area", "either", [Param::positional("s").typed(
                TypeDesc::of::<Circle>() | TypeDesc::of::<Square>(),
            )]))
            .finish();

        let out = engine.dispatch(&circle, args![Square]).unwrap().ready().unwrap();
        assert_eq!(out.downcast_ref::<&str>(), Some(&"either"));

        let ids: Vec<_> = engine
            .candidates(&circle)
            .unwrap()
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], circle.id());
        assert_eq!(ids[2], square.id());
    }

    #[test]
    fn test_candidate_error_passes_through() {
        let engine = Engine::new();
        let entry = Arc::new(
            Candidate::builder("fail").body(|_| Err("candidate failed".into())),
        );
        engine.register(&entry);
        let err = engine.dispatch(&entry, args![]).unwrap_err();
        assert_eq!(err.to_string(), "candidate failed");
        assert!(err.into_candidate_error().is_some());
    }

    #[test]
    fn test_async_candidate_without_runtime() {
        let engine = Engine::new();
        let entry = Arc::new(
            Candidate::builder("fetch").async_body(|_| async { Ok::<_, BoxError>(Value::unit()) }),
        );
        engine.register(&entry);
        assert!(matches!(
            engine.dispatch(&entry, args![]),
            Err(DispatchError::NoRuntime { .. })
        ));
    }

    #[test]
    fn test_async_candidate_on_configured_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let engine = Engine::builder().runtime(runtime.handle().clone()).build();
        let entry = Arc::new(
            Candidate::builder("fetch").async_body(|_| async { Ok::<_, BoxError>(Value::new(9_u8)) }),
        );
        engine.register(&entry);

        let pending = engine.dispatch(&entry, args![]).unwrap().pending().unwrap();
        let value = runtime.block_on(pending).unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&9));
    }

    #[test]
    fn test_shared_engine_is_a_single_instance() {
        assert!(Arc::ptr_eq(Engine::shared(), Engine::shared()));
        assert_eq!(Engine::shared().name(), "shared");
    }
}
