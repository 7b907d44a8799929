//! Overload sets.
//!
//! An [`OverloadSet`] is the ordered, append-only list of candidates sharing
//! one operation identity, plus the one-shot "discovered" flag.
//!
//! # State machine
//!
//! `UNDISCOVERED -> DISCOVERED`, one way. The transition runs inside a
//! per-set exclusive section, so concurrent first dispatches run discovery
//! once and append its siblings once.

use crate::sync::{lock, read, write};
use overcast_core::{
    Args, Bound, Candidate, DiscoveryError, OperationId, SiblingSource,
};
use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, Ordering},
};

/// The candidates of one operation.
pub struct OverloadSet {
    owner: OperationId,
    operation: String,
    candidates: RwLock<Vec<Arc<Candidate>>>,
    discovered: AtomicBool,
    discovery: Mutex<()>,
}

/// The outcome of scanning a set for a call.
pub(crate) enum Selection {
    /// The first candidate accepting the call, with its bound arguments.
    Matched(Arc<Candidate>, Bound),
    /// Every candidate rejected the call.
    Rejected {
        /// Number of candidates scanned.
        tried: usize,
    },
}

impl OverloadSet {
    /// Create an undiscovered set holding exactly `entry`.
    pub(crate) fn new(entry: Arc<Candidate>) -> Self {
        Self {
            owner: entry.id(),
            operation: entry.display_name(),
            candidates: RwLock::new(vec![entry]),
            discovered: AtomicBool::new(false),
            discovery: Mutex::new(()),
        }
    }

    /// The identity this set is keyed by.
    pub fn owner(&self) -> OperationId {
        self.owner
    }

    /// Qualified name of the registered entry point.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns `true` once discovery has run.
    pub fn is_discovered(&self) -> bool {
        self.discovered.load(Ordering::Acquire)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        read(&self.candidates).len()
    }

    /// Always `false` for a registered set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        read(&self.candidates).is_empty()
    }

    /// A snapshot of the candidates, in selection order.
    pub fn candidates(&self) -> Vec<Arc<Candidate>> {
        read(&self.candidates).clone()
    }

    /// Append a candidate.
    pub(crate) fn push(&self, candidate: Arc<Candidate>) {
        write(&self.candidates).push(candidate);
    }

    /// Run discovery if it has not run yet.
    ///
    /// Returns the number of siblings appended, or `None` if the set was
    /// already discovered. On error nothing is appended and the set stays
    /// undiscovered.
    pub(crate) fn discover(
        &self,
        entry: &Candidate,
        source: &dyn SiblingSource,
    ) -> Result<Option<usize>, DiscoveryError> {
        if self.is_discovered() {
            return Ok(None);
        }

        let _exclusive = lock(&self.discovery);
        if self.is_discovered() {
            return Ok(None);
        }

        let siblings = source.siblings(entry)?;
        let found = siblings.len();
        write(&self.candidates).extend(siblings);
        self.discovered.store(true, Ordering::Release);
        Ok(Some(found))
    }

    /// Scan candidates in order and return the first that accepts `args`.
    ///
    /// Scans a snapshot, so predicates may call back into the engine.
    pub(crate) fn select(&self, args: &Args) -> Selection {
        let candidates = self.candidates();
        for candidate in &candidates {
            match candidate.accepts(args) {
                Ok(bound) => return Selection::Matched(Arc::clone(candidate), bound),
                Err(_reason) => {
                    emit!(
                        trace,
                        operation = %self.operation,
                        candidate = %candidate.id(),
                        signature = %candidate.signature(),
                        reason = %_reason,
                        "candidate rejected"
                    );
                }
            }
        }
        Selection::Rejected {
            tried: candidates.len(),
        }
    }
}

impl std::fmt::Debug for OverloadSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverloadSet")
            .field("owner", &self.owner)
            .field("operation", &self.operation)
            .field("candidates", &self.len())
            .field("discovered", &self.is_discovered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overcast_core::{NoSiblings, Param, TypeDesc, Value, args};
    use std::sync::OnceLock;

    struct Circle;
    struct Square;

    fn labelled(label: &'static str) -> Arc<Candidate> {
        Arc::new(
            Candidate::builder("area")
                .param(Param::positional("shape").of::<Circle>())
                .body(move |_| Ok(Value::new(label))),
        )
    }

    struct Twice(Arc<Candidate>);

    impl SiblingSource for Twice {
        fn siblings(&self, _entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
            Ok(vec![Arc::clone(&self.0), Arc::clone(&self.0)])
        }
    }

    #[test]
    fn test_new_set_holds_entry_and_is_undiscovered() {
        let entry = labelled("a");
        let set = OverloadSet::new(Arc::clone(&entry));
        assert_eq!(set.owner(), entry.id());
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(!set.is_discovered());
    }

    #[test]
    fn test_discovery_runs_once() {
        let entry = labelled("a");
        let set = OverloadSet::new(Arc::clone(&entry));
        let source = Twice(labelled("b"));

        assert_eq!(set.discover(&entry, &source), Ok(Some(2)));
        assert!(set.is_discovered());
        assert_eq!(set.len(), 3);

        assert_eq!(set.discover(&entry, &source), Ok(None));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_failed_discovery_leaves_set_undiscovered() {
        struct Failing;
        impl SiblingSource for Failing {
            fn siblings(&self, _: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
                Err(DiscoveryError::UnknownScope("nowhere".into()))
            }
        }

        let entry = labelled("a");
        let set = OverloadSet::new(Arc::clone(&entry));
        assert!(set.discover(&entry, &Failing).is_err());
        assert!(!set.is_discovered());
        assert_eq!(set.len(), 1);

        assert_eq!(set.discover(&entry, &NoSiblings), Ok(Some(0)));
        assert!(set.is_discovered());
    }

    #[test]
    fn test_select_first_match_in_order() {
        let first = labelled("first");
        let set = OverloadSet::new(Arc::clone(&first));
        set.push(labelled("second"));

        match set.select(&args![Circle]) {
            Selection::Matched(candidate, _) => assert_eq!(candidate.id(), first.id()),
            Selection::Rejected { .. } => panic!("expected a match"),
        }
        match set.select(&args![Square]) {
            Selection::Rejected { tried } => assert_eq!(tried, 2),
            Selection::Matched(..) => panic!("expected no match"),
        }
    }

    #[test]
    fn test_predicate_may_append_during_select() {
        let set: Arc<OnceLock<Arc<OverloadSet>>> = Arc::new(OnceLock::new());
        let target = Arc::clone(&set);
        let entry = Arc::new(
            Candidate::builder("grow")
                .param(Param::positional("n").typed(TypeDesc::predicate("appends", move |_| {
                    if let Some(set) = target.get() {
                        set.push(labelled("late"));
                    }
                    false
                })))
                .body(|_| Ok(Value::unit())),
        );
        let _ = set.set(Arc::new(OverloadSet::new(entry)));
        let set = set.get().unwrap();

        match set.select(&args![1_u8]) {
            Selection::Rejected { tried } => assert_eq!(tried, 1),
            Selection::Matched(..) => panic!("expected no match"),
        }
        assert_eq!(set.len(), 2);
    }
}
