//! The catalog-backed sibling source.

use super::catalog::Catalog;
use overcast_core::{Candidate, DiscoveryError, Origin, SiblingSource};
use std::sync::Arc;

/// Finds siblings of an entry point by looking it up in a [`Catalog`].
///
/// - A member's siblings are its owning type's **own** member of the same
///   name: the explicit overload group if one was declared, otherwise the
///   member alone. Inherited members are never considered. When the entry is
///   bound to a receiver, the siblings are bound to the same receiver.
/// - A free operation's siblings come from its defining scope the same way.
///
/// A name missing from its type or scope yields no siblings. An unknown scope,
/// owner or receiver type is an error.
#[derive(Debug, Clone)]
pub struct Discoverer {
    catalog: Arc<Catalog>,
}

impl Discoverer {
    /// Create a discoverer over `catalog`.
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    /// The catalog being queried.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl SiblingSource for Discoverer {
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        match entry.origin() {
            Origin::Free { scope } => {
                let scope = self
                    .catalog
                    .scope(scope)
                    .ok_or_else(|| DiscoveryError::UnknownScope(scope.to_string()))?;
                Ok(scope
                    .function(entry.name())
                    .map(|found| found.group())
                    .unwrap_or_default())
            }
            Origin::Member { receiver, .. } => {
                let owner = self.catalog.owner_of(entry)?;
                let group = owner
                    .member(entry.name())
                    .map(|found| found.group())
                    .unwrap_or_default();

                Ok(match receiver {
                    Some(receiver) => group
                        .into_iter()
                        .map(|sibling| Arc::new(sibling.bound_to(receiver.clone())))
                        .collect(),
                    None => group,
                })
            }
        }
    }
}
