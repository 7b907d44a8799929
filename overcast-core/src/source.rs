//! Sibling discovery seam.

use crate::{candidate::Candidate, error::DiscoveryError};
use std::sync::Arc;

/// Finds the sibling candidates of a registered entry point.
///
/// This is the collaborator the engine consults once per operation, on its
/// first dispatch. Implementations decide what "sibling" means: the standard
/// one looks the entry point up in a catalog of scopes and types.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot discover sibling candidates",
    label = "missing `SiblingSource` implementation",
    note = "Implement `SiblingSource::siblings` to enumerate candidates for an entry point."
)]
pub trait SiblingSource: Send + Sync {
    /// Return every sibling of `entry`, in the order they should be tried.
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError>;
}

impl<S: SiblingSource + ?Sized> SiblingSource for Arc<S> {
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        (**self).siblings(entry)
    }
}

impl<S: SiblingSource + ?Sized> SiblingSource for Box<S> {
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        (**self).siblings(entry)
    }
}

/// A source that never finds siblings.
///
/// Overload sets then contain only explicitly registered candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSiblings;

impl SiblingSource for NoSiblings {
    fn siblings(&self, _entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        Ok(Vec::new())
    }
}
