//! Overloads collected across the binary via `inventory`.

use super::catalog::{Catalog, CatalogBuilder};
use overcast_core::{Candidate, DiscoveryError};

/// An overload submitted with `inventory::submit!`.
///
/// `#[overload(collect)]` submits one of these for the annotated function.
pub struct CollectedOverload {
    /// Ordering within an overload group (lower comes first).
    pub order: i32,
    /// Builds the candidate.
    pub build: fn() -> Candidate,
}

impl CollectedOverload {
    /// Create a new collected overload entry.
    pub const fn new(order: i32, build: fn() -> Candidate) -> Self {
        Self { order, build }
    }
}

inventory::collect!(CollectedOverload);

impl CatalogBuilder {
    /// Add every collected overload to its group.
    ///
    /// Overloads are sorted by `order`; ties keep collection order, which is
    /// unspecified across compilation units.
    pub fn collected(self) -> Self {
        let mut entries: Vec<&CollectedOverload> =
            inventory::iter::<CollectedOverload>.into_iter().collect();
        entries.sort_by_key(|entry| entry.order);

        entries
            .into_iter()
            .fold(self, |builder, entry| builder.overload((entry.build)()))
    }
}

impl Catalog {
    /// A catalog holding every collected overload.
    pub fn collected() -> Result<Catalog, DiscoveryError> {
        CatalogBuilder::new().collected().build()
    }
}
