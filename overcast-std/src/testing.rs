//! Testing utilities for overcast.
//!
//! # Features
//!
//! - [`CountingSource`]: wraps a sibling source and counts discovery calls
//! - [`StaticSource`]: a sibling source returning a fixed list
//! - [`CallLog`] and [`recording`]: candidates that record when they run
//! - [`labelled`]: a candidate returning a fixed `&'static str`

use crate::sync::lock;
use overcast_core::{Candidate, DiscoveryError, Param, SiblingSource, Value};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Counting Source
// ============================================================================

/// A shared call counter.
#[derive(Clone, Debug, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Get the current count.
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    fn bump(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A sibling source that counts how often discovery asks it for siblings.
///
/// # Example
///
/// ```rust,ignore
/// let source = CountingSource::new(StaticSource::new([square]));
/// let calls = source.counter();
///
/// let engine = Engine::builder().source(source).build();
/// engine.register(&circle);
/// engine.dispatch(&circle, args![Circle])?;
/// engine.dispatch(&circle, args![Circle])?;
///
/// assert_eq!(calls.get(), 1);
/// ```
pub struct CountingSource<S> {
    inner: S,
    counter: CallCounter,
}

impl<S: SiblingSource> CountingSource<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counter: CallCounter::default(),
        }
    }

    /// A handle to the call count, usable after the source moved into an engine.
    pub fn counter(&self) -> CallCounter {
        self.counter.clone()
    }
}

impl<S: SiblingSource> SiblingSource for CountingSource<S> {
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        self.counter.bump();
        self.inner.siblings(entry)
    }
}

// ============================================================================
// Static Source
// ============================================================================

/// A sibling source that returns the same candidates for every entry point.
#[derive(Clone, Default)]
pub struct StaticSource {
    siblings: Vec<Arc<Candidate>>,
}

impl StaticSource {
    /// Create a source returning `siblings`, in order.
    pub fn new(siblings: impl IntoIterator<Item = Arc<Candidate>>) -> Self {
        Self {
            siblings: siblings.into_iter().collect(),
        }
    }
}

impl SiblingSource for StaticSource {
    fn siblings(&self, _entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        Ok(self.siblings.clone())
    }
}

// ============================================================================
// Recording candidates
// ============================================================================

/// A shared log of which candidates ran.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The labels recorded so far, in call order.
    pub fn entries(&self) -> Vec<&'static str> {
        lock(&self.entries).clone()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    fn record(&self, label: &'static str) {
        lock(&self.entries).push(label);
    }
}

/// A candidate of operation `name` that appends `label` to `log` and returns it.
pub fn recording(
    name: &'static str,
    label: &'static str,
    log: &CallLog,
    params: impl IntoIterator<Item = Param>,
) -> Candidate {
    let log = log.clone();
    Candidate::builder(name).params(params).body(move |_| {
        log.record(label);
        Ok(Value::new(label))
    })
}

/// A candidate of operation `name` that returns `label`.
pub fn labelled(
    name: &'static str,
    label: &'static str,
    params: impl IntoIterator<Item = Param>,
) -> Candidate {
    Candidate::builder(name)
        .params(params)
        .body(move |_| Ok(Value::new(label)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use overcast_core::{Invocation, NoSiblings, args};

    #[test]
    fn test_counting_source() {
        let source = CountingSource::new(NoSiblings);
        let calls = source.counter();
        let entry = labelled("op", "a", []);

        source.siblings(&entry).unwrap();
        source.siblings(&entry).unwrap();
        assert_eq!(calls.get(), 2);
        calls.reset();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_recording_candidate() {
        let log = CallLog::new();
        let candidate = recording("op", "first", &log, [Param::positional("x")]);
        let bound = candidate.accepts(&args![1]).unwrap();
        assert!(matches!(candidate.invoke(bound), Invocation::Ready(Ok(_))));
        assert_eq!(log.entries(), ["first"]);
        log.clear();
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_static_source() {
        let sibling = Arc::new(labelled("op", "b", []));
        let source = StaticSource::new([Arc::clone(&sibling)]);
        let found = source.siblings(&labelled("op", "a", [])).unwrap();
        assert_eq!(found[0].id(), sibling.id());
    }
}
