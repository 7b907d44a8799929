//! Ancestor chains and inherited member tables.
//!
//! These are introspection helpers over a [`Catalog`]; dispatch itself only
//! looks at a type's own members.

use super::catalog::{Catalog, TypePath};
use indexmap::IndexMap;
use overcast_core::{Candidate, DiscoveryError};
use std::{collections::HashMap, sync::Arc};

impl Catalog {
    /// The C3 linearization of `ty`: the type itself followed by its ancestors.
    pub fn lineage(&self, ty: &TypePath) -> Result<Vec<TypePath>, DiscoveryError> {
        let mut visiting = Vec::new();
        let mut done = HashMap::new();
        self.linearize(ty, &mut visiting, &mut done)
    }

    /// The ancestors of `ty` in resolution order, excluding `ty` itself.
    pub fn superclasses(&self, ty: &TypePath) -> Result<Vec<TypePath>, DiscoveryError> {
        let mut lineage = self.lineage(ty)?;
        lineage.remove(0);
        Ok(lineage)
    }

    /// Every member visible on `ty`, own and inherited.
    ///
    /// Each name maps to its declarations along the lineage, nearest first.
    pub fn all_members(
        &self,
        ty: &TypePath,
    ) -> Result<IndexMap<String, Vec<Arc<Candidate>>>, DiscoveryError> {
        let mut members: IndexMap<String, Vec<Arc<Candidate>>> = IndexMap::new();
        for path in self.lineage(ty)? {
            for (name, entry) in self.type_entry(&path)?.members() {
                members
                    .entry(name.to_string())
                    .or_default()
                    .extend(entry.declared());
            }
        }
        Ok(members)
    }

    /// The declarations of member `name` along the lineage of `ty`, nearest
    /// first. Types that do not declare `name` themselves are skipped.
    pub fn member_chain(
        &self,
        name: &str,
        ty: &TypePath,
    ) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        let mut chain = Vec::new();
        for path in self.lineage(ty)? {
            if let Some(entry) = self.type_entry(&path)?.member(name) {
                chain.extend(entry.declared());
            }
        }
        Ok(chain)
    }

    /// `done` memoizes finished lineages so shared ancestors are linearized once.
    fn linearize(
        &self,
        ty: &TypePath,
        visiting: &mut Vec<TypePath>,
        done: &mut HashMap<TypePath, Vec<TypePath>>,
    ) -> Result<Vec<TypePath>, DiscoveryError> {
        if let Some(lineage) = done.get(ty) {
            return Ok(lineage.clone());
        }
        if visiting.contains(ty) {
            return Err(DiscoveryError::InconsistentHierarchy(ty.to_string()));
        }
        let entry = self.type_entry(ty)?;

        visiting.push(ty.clone());
        let mut sequences = Vec::with_capacity(entry.parents().len() + 1);
        for parent in entry.parents() {
            sequences.push(self.linearize(parent, visiting, done)?);
        }
        visiting.pop();
        sequences.push(entry.parents().to_vec());

        let mut lineage = vec![ty.clone()];
        lineage.extend(merge(sequences).ok_or_else(|| {
            DiscoveryError::InconsistentHierarchy(ty.to_string())
        })?);
        done.insert(ty.clone(), lineage.clone());
        Ok(lineage)
    }
}

/// The C3 merge step. `None` if no consistent order exists.
fn merge(mut sequences: Vec<Vec<TypePath>>) -> Option<Vec<TypePath>> {
    let mut out = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Some(out);
        }

        let head = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|candidate| !sequences.iter().any(|seq| seq[1..].contains(*candidate)))?
            .clone();

        for seq in &mut sequences {
            if seq[0] == head {
                seq.remove(0);
            }
        }
        out.push(head);
    }
}
